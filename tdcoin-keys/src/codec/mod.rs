//! Text encodings used by addresses and keys

pub mod base58;
pub mod bech32;
