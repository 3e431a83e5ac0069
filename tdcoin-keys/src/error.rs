//! Error types for the tdcoin-keys library

use thiserror::Error;

use tdcoin_network::NetworkError;

/// Result type alias for tdcoin-keys operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while decoding or encoding addresses and keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A character outside the Base58 or Bech32 alphabet, or mixed case in Bech32 text.
    #[error("Invalid character {character:?} at position {index}")]
    InvalidCharacter {
        character: char,
        index: usize,
    },

    #[error("Checksum does not validate")]
    InvalidChecksum,

    /// Decoded data has a length the format does not allow.
    #[error("Invalid data length: {0}")]
    InvalidDataLength(String),

    /// Version byte or human-readable part is not claimed by any known network.
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// The text is valid but belongs to a network other than the expected one.
    #[error("Address belongs to a different network: {0}")]
    WrongNetwork(String),

    #[error("Invalid witness version: {0}")]
    InvalidWitnessVersion(u8),

    /// Leftover bits of a bit regrouping are not all zero.
    #[error("Non-zero padding in bit conversion")]
    NonZeroPadding,

    /// A whole input group was left over after bit regrouping.
    #[error("Excess padding in bit conversion")]
    InvalidPadding,

    /// A value does not fit the declared group width.
    #[error("Invalid data value: {0}")]
    InvalidData(u8),

    /// The BIP38 flag byte is not a valid combination for its mode.
    #[error("Invalid BIP38 flags: {0:#04x}")]
    InvalidFlags(u8),

    /// The BIP38 container is valid but the passphrase does not unlock it.
    #[error("Bad passphrase")]
    BadPassphrase,

    /// The key derivation function or block cipher failed.
    #[error("Key derivation error: {0}")]
    Kdf(String),

    #[error("Secp256k1 error: {0}")]
    Secp256k1(#[from] secp256k1::Error),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected failure of the underlying Base58 decoder.
    #[error("Base58 decoding error: {0}")]
    Base58(String),
}

impl Error {
    /// Whether the error was raised by a passphrase check rather than by malformed input.
    pub fn is_bad_passphrase(&self) -> bool {
        matches!(self, Error::BadPassphrase)
    }
}
