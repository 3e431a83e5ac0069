//! Private keys and their Wallet Import Format encoding

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use secp256k1::SecretKey;
use tdcoin_network::{NetworkParameters, NetworkRegistry};

use crate::address::Address;
use crate::codec::base58;
use crate::ecc;
use crate::error::{Error, Result};

const WIF_COMPRESSED_MARKER: u8 = 0x01;

/// A secp256k1 private key together with the public key encoding it is used with.
///
/// The `Debug` output never contains the key material.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretKey,
    compressed: bool,
}

impl PrivateKey {
    pub fn new(secret: SecretKey, compressed: bool) -> Self {
        Self {
            secret,
            compressed,
        }
    }

    /// Creates a key from 32 big-endian bytes.
    pub fn from_slice(bytes: &[u8], compressed: bool) -> Result<Self> {
        Ok(Self::new(SecretKey::from_slice(bytes)?, compressed))
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    /// Whether the public key is serialised in compressed form.
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Serialised public key, compressed or not according to [`PrivateKey::compressed`].
    pub fn public_key_bytes(&self) -> Vec<u8> {
        ecc::private_key_to_public_key(&self.secret, self.compressed)
    }

    /// The pay-to-pubkey-hash address of this key on `network`.
    pub fn p2pkh_address(&self, network: &NetworkParameters) -> Address {
        Address::p2pkh(network, ecc::hash160(&self.public_key_bytes()))
    }

    /// Encodes the key as WIF for `network`.
    pub fn to_wif(&self, network: &NetworkParameters) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(network.wif_version());
        payload.extend_from_slice(&self.secret.secret_bytes());
        if self.compressed {
            payload.push(WIF_COMPRESSED_MARKER);
        }
        base58::encode_check(&payload)
    }

    /// Decodes a WIF key, looking up its network in the process-wide registry
    /// unless `expected` is given.
    pub fn from_wif(
        text: &str,
        expected: Option<&NetworkParameters>,
    ) -> Result<(Self, NetworkParameters)> {
        Self::from_wif_in(NetworkRegistry::global(), text, expected)
    }

    /// Decodes a WIF key, looking up its network in `registry` unless `expected` is given.
    pub fn from_wif_in(
        registry: &NetworkRegistry,
        text: &str,
        expected: Option<&NetworkParameters>,
    ) -> Result<(Self, NetworkParameters)> {
        let payload = base58::decode_check(text)?;
        let compressed = match payload.len() {
            33 => false,
            34 if payload[33] == WIF_COMPRESSED_MARKER => true,
            34 => return Err(Error::InvalidData(payload[33])),
            len => {
                return Err(Error::InvalidDataLength(format!(
                    "WIF payload of {} bytes, expected 33 or 34",
                    len
                )));
            }
        };
        let version = payload[0];
        let network = match expected {
            Some(network) if network.wif_version() == version => network.clone(),
            Some(network) => {
                return Err(Error::WrongNetwork(format!(
                    "WIF version {} is not used by {}",
                    version, network
                )));
            }
            None => registry
                .networks()
                .into_iter()
                .find(|network| network.wif_version() == version)
                .ok_or_else(|| Error::InvalidPrefix(format!("unknown WIF version {}", version)))?,
        };
        Ok((Self::from_slice(&payload[1..33], compressed)?, network))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("secret", &self.secret)
            .field("compressed", &self.compressed)
            .finish()
    }
}
