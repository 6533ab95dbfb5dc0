//! Hashing primitives for the cooperative.
//!
//! - **Blake2b-256** for description hashes (the off-chain retrieval identifier
//!   of a proposal is stored, and compared on execute, by its hash)
//! - Multi-part hashing for proposal content keys

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, hash_description};
