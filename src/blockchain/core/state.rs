use crate::error::ChainError;
use crate::ledger::Ledger;
use crate::transaction::Transaction;

use super::chain::Block;

/// Applies one block's transactions to `ledger` in order: credit the
/// recipient, then (for non-mint senders) consume the nonce and debit.
pub fn apply_block_to_ledger(
    ledger: &mut Ledger,
    block: &Block,
    mint_address: &str,
) -> Result<(), ChainError> {
    let height = block.header.block_height;
    for tx in &block.transactions {
        apply_transaction(ledger, tx, mint_address).map_err(|reason| ChainError::at(height, reason))?;
    }
    Ok(())
}

fn apply_transaction(ledger: &mut Ledger, tx: &Transaction, mint_address: &str) -> Result<(), String> {
    if !tx.is_mint(mint_address) {
        let expected = ledger.get_nonce(tx.sender()) + 1;
        if tx.nonce() != expected {
            return Err(format!(
                "transaction {} has nonce {}, expected {} for {}",
                tx.tx_id(),
                tx.nonce(),
                expected,
                tx.sender()
            ));
        }
    }

    ledger.credit(tx.recipient(), tx.amount());
    if !tx.is_mint(mint_address) {
        ledger.increment_nonce(tx.sender());
        ledger.debit(tx.sender(), tx.amount()).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Rebuilds the ledger from scratch by folding every block in order.
pub fn replay_ledger(blocks: &[Block], mint_address: &str) -> Result<Ledger, ChainError> {
    blocks.iter().try_fold(Ledger::new(), |mut ledger, block| {
        apply_block_to_ledger(&mut ledger, block, mint_address)?;
        Ok(ledger)
    })
}
