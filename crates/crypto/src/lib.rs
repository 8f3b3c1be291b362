//! Cryptographic primitives for Voty proofs
//!
//! Hashing, Ethereum address handling and `personal_sign` signing and
//! recovery. Documents are signed by wallets, so everything here speaks the
//! Ethereum conventions.

pub mod address;
pub mod error;
pub mod eth;
pub mod hash;
pub mod signature;

pub use address::{addresses_equal, to_checksum_address};
pub use error::{CryptoError, Result};
pub use eth::{EthPersonalSign, LocalSigner, RecoverSigner, Signer};
pub use hash::{keccak256, sha256, sha256_hex};
pub use signature::SignatureEnvelope;
