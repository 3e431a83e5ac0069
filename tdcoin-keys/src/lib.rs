//! TDCoin address and key codecs
//!
//! This library converts between the text forms used by TDCoin and their
//! binary content: legacy Base58Check addresses, Bech32 segwit addresses,
//! WIF private keys and BIP38 passphrase-protected private keys. Every
//! decoded value is checked against the network it belongs to.
//!
//! Networks are described by [`NetworkParameters`] and looked up in a
//! [`NetworkRegistry`], either the process-wide one or one passed explicitly.

extern crate alloc;


pub mod address;
#[cfg(feature = "bip38")]
pub mod bip38;
pub mod codec;
pub mod ecc;
pub mod error;
#[cfg(feature = "bip38")]
pub mod kdf;
pub mod key;
#[cfg(feature = "bip38")]
pub mod search;

pub use address::{Address, LegacyAddress, OutputScriptType, SegwitAddress};
#[cfg(feature = "bip38")]
pub use bip38::{Bip38Mode, EncryptedPrivateKey, encrypt_private_key};
pub use error::{Error, Result};
pub use key::PrivateKey;
#[cfg(feature = "bip38")]
pub use search::{PassphraseMatch, find_passphrase};
pub use tdcoin_network::{Network, NetworkParameters, NetworkRegistry};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{
        Address, Error, Network, NetworkParameters, NetworkRegistry, PrivateKey, Result,
    };
}
