//! secp256k1 operations needed by the address and BIP38 codecs

use alloc::vec::Vec;

use bitcoin_hashes::{Hash, hash160, sha256d};
use lazy_static::lazy_static;
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};

use crate::error::{Error, Result};

lazy_static! {
    static ref SECP: Secp256k1<All> = Secp256k1::new();
}

/// Shared signing and verification context.
pub fn secp() -> &'static Secp256k1<All> {
    &SECP
}

/// Multiplies the generator by `scalar` and returns the compressed point.
pub fn scalar_multiply(scalar: &[u8; 32]) -> Result<[u8; 33]> {
    let secret = SecretKey::from_slice(scalar)?;
    Ok(PublicKey::from_secret_key(secp(), &secret).serialize())
}

/// Serialised public key of `key`: 33 bytes compressed, 65 bytes otherwise.
pub fn private_key_to_public_key(key: &SecretKey, compressed: bool) -> Vec<u8> {
    let public_key = PublicKey::from_secret_key(secp(), key);
    if compressed {
        public_key.serialize().to_vec()
    } else {
        public_key.serialize_uncompressed().to_vec()
    }
}

/// RIPEMD-160 of SHA-256.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

/// First four bytes of the double SHA-256 of an address string.
pub fn address_hash(address: &str) -> [u8; 4] {
    let hash = sha256d::Hash::hash(address.as_bytes()).to_byte_array();
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Product of two scalars modulo the curve order.
///
/// Fails when `a` is not a valid secret key or `b` is not below the order.
pub fn multiply_scalars(a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32]> {
    let secret = SecretKey::from_slice(a)?;
    let tweak =
        Scalar::from_be_bytes(*b).map_err(|_| Error::Secp256k1(secp256k1::Error::InvalidTweak))?;
    Ok(secret.mul_tweak(&tweak)?.secret_bytes())
}
