/// Validation logic for transactions separated from type definitions
use crate::crypto;
use crate::error::TransactionError;
use crate::transaction::types::Transaction;

impl Transaction {
    /// Checks that every field needed for verification is populated.
    pub fn check_complete(&self) -> Result<(), TransactionError> {
        if self.sender.is_empty() {
            return Err(TransactionError::Incomplete("sender"));
        }
        if self.recipient.is_empty() {
            return Err(TransactionError::Incomplete("recipient"));
        }
        if self.public_key.is_empty() {
            return Err(TransactionError::Incomplete("public_key"));
        }
        match self.signature.as_deref() {
            Some(sig) if !sig.is_empty() => Ok(()),
            _ => Err(TransactionError::Incomplete("signature")),
        }
    }

    /// Verifies the signature against the embedded public key.
    /// Mint transactions are authority-issued and always pass.
    pub fn verify_signature(&self, mint_address: &str) -> Result<(), TransactionError> {
        if self.is_mint(mint_address) {
            return Ok(());
        }

        self.check_complete()?;
        let signature = self
            .signature
            .as_deref()
            .ok_or(TransactionError::Incomplete("signature"))?;

        crypto::verify_encoded(&self.public_key, &self.digest(), signature)?;
        Ok(())
    }

    /// Rejects transactions whose timestamp is further than `max_skew` from
    /// `now` in either direction, then verifies the signature.
    pub fn is_fresh(
        &self,
        now: u64,
        max_skew: u64,
        mint_address: &str,
    ) -> Result<(), TransactionError> {
        if now.abs_diff(self.timestamp) > max_skew {
            return Err(TransactionError::StaleOrFutureTimestamp {
                timestamp: self.timestamp,
                now,
                max_skew,
            });
        }
        self.verify_signature(mint_address)
    }
}
