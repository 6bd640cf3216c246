/// Transaction types for ByteChain
use crate::crypto::{self, KeyPair, Sha256Hash};
use crate::{Address, Amount};
use serde::{Deserialize, Serialize};

/// A value transfer between two accounts.
///
/// Signing fields are crate-private. `tx_id` is always derived from them and
/// is recomputed on deserialization, so a received id is never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TransactionWire")]
pub struct Transaction {
    pub(crate) amount: Amount,
    pub(crate) sender: Address,
    pub(crate) recipient: Address,
    pub(crate) fee: Amount,
    pub(crate) timestamp: u64,
    pub(crate) public_key: String,
    pub(crate) signature: Option<String>,
    pub(crate) nonce: u64,
    pub(crate) tx_id: String,
}

/// Wire form accepted from peers; any `tx_id` it carries is ignored.
#[derive(Deserialize)]
struct TransactionWire {
    amount: Amount,
    sender: Address,
    recipient: Address,
    fee: Amount,
    timestamp: u64,
    public_key: String,
    #[serde(default)]
    signature: Option<String>,
    nonce: u64,
}

impl From<TransactionWire> for Transaction {
    fn from(wire: TransactionWire) -> Self {
        let mut tx = Transaction {
            amount: wire.amount,
            sender: wire.sender,
            recipient: wire.recipient,
            fee: wire.fee,
            timestamp: wire.timestamp,
            public_key: wire.public_key,
            signature: wire.signature,
            nonce: wire.nonce,
            tx_id: String::new(),
        };
        tx.tx_id = hex::encode(tx.digest());
        tx
    }
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        amount: Amount,
        sender: impl Into<Address>,
        recipient: impl Into<Address>,
        fee: Amount,
        timestamp: u64,
        public_key: impl Into<String>,
        nonce: u64,
    ) -> Self {
        TransactionWire {
            amount,
            sender: sender.into(),
            recipient: recipient.into(),
            fee,
            timestamp,
            public_key: public_key.into(),
            signature: None,
            nonce,
        }
        .into()
    }

    /// An authority-issued transfer from the mint address (genesis allocation
    /// or block reward). Mint transactions are never signed.
    pub fn mint(
        amount: Amount,
        mint_address: &str,
        mint_public_key: &str,
        recipient: impl Into<Address>,
        timestamp: u64,
    ) -> Self {
        Self::new(amount, mint_address, recipient, 0, timestamp, mint_public_key, 0)
    }

    /// Canonical signing payload: the decimal/textual concatenation of
    /// `amount, sender, recipient, fee, public_key, nonce, timestamp`.
    pub fn signing_payload(&self) -> Vec<u8> {
        format!(
            "{}{}{}{}{}{}{}",
            self.amount,
            self.sender,
            self.recipient,
            self.fee,
            self.public_key,
            self.nonce,
            self.timestamp
        )
        .into_bytes()
    }

    /// SHA-256 of the signing payload; both the signed message and the id.
    pub fn digest(&self) -> Sha256Hash {
        crypto::digest(&self.signing_payload())
    }

    /// Signs the transaction in place and returns it for chaining.
    pub fn sign(&mut self, keypair: &KeyPair) -> &mut Self {
        let signature = keypair.sign_digest(&self.digest());
        self.signature = Some(crypto::encode_signature(&signature));
        self
    }

    pub fn is_mint(&self, mint_address: &str) -> bool {
        self.sender == mint_address
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }
}
