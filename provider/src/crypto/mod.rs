//! # Cryptographic Primitives
//!
//! Everything that touches key material or digests:
//!
//! - **Ed25519** account keys and signatures.
//! - **SHA3-256** digests and the salted crypto hash used for signing
//!   messages and transaction ids.
//! - **AES-256-GCM** sealing for the password-protected keystore.
//!
//! All of it wraps audited crates. Nothing here implements a primitive.

pub mod encryption;
pub mod hash;
pub mod keys;

pub use hash::{crypto_hash, salted_message, sha3_256, HashValue};
pub use keys::{AccountKeypair, AccountPublicKey, AccountSignature, KeyError};
