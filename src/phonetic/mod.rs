//! Phonetic encoding and consensus lookup.
//!
//! This module groups the encoder wrapper and the frozen index.

pub mod codes;
pub mod index;

pub use codes::{normalize_name, PhoneticCodes, PhoneticEncoder};
pub use index::{PhoneticIndex, PhoneticIndexBuilder, CONSENSUS_VOTES};
