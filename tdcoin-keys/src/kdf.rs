//! Key derivation and block cipher primitives used by BIP38
//!
//! All functions are pure. Derived key material is returned to the caller and
//! never retained.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use bitcoin_hashes::{Hash, sha256d};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Cost parameters of one scrypt invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    /// Base two logarithm of the CPU/memory cost `N`.
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
    /// Output length in bytes.
    pub len: usize,
}

impl ScryptParams {
    /// Passphrase to 64 bytes for non-EC-multiply keys (`N = 16384`).
    pub const NON_EC: ScryptParams = ScryptParams {
        log_n: 14,
        r: 8,
        p: 8,
        len: 64,
    };

    /// Passphrase to the 32-byte pass factor of EC-multiply keys.
    pub const PASS_FACTOR: ScryptParams = ScryptParams {
        log_n: 14,
        r: 8,
        p: 8,
        len: 32,
    };

    /// Pass point to 64 bytes for EC-multiply keys (`N = 1024`).
    pub const EC_DERIVED: ScryptParams = ScryptParams {
        log_n: 10,
        r: 1,
        p: 1,
        len: 64,
    };

    /// Memory held by one invocation, `128 * N * r` bytes.
    pub fn memory_cost(&self) -> usize {
        128usize.saturating_mul(1usize << self.log_n).saturating_mul(self.r as usize)
    }
}

/// Runs scrypt over `password` and `salt`.
pub fn scrypt(password: &[u8], salt: &[u8], params: ScryptParams) -> Result<Vec<u8>> {
    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, params.len)
        .map_err(|e| Error::Kdf(format!("invalid scrypt parameters: {}", e)))?;
    let mut output = vec![0u8; params.len];
    scrypt::scrypt(password, salt, &scrypt_params, &mut output)
        .map_err(|e| Error::Kdf(format!("scrypt failed: {}", e)))?;
    Ok(output)
}

fn cipher(key: &[u8]) -> Result<Aes256> {
    Aes256::new_from_slice(key)
        .map_err(|_| Error::Kdf(format!("AES-256 key must be 32 bytes, got {}", key.len())))
}

/// Decrypts one 16-byte block with AES-256 in ECB mode, without padding.
pub fn aes256_decrypt_block(key: &[u8], block: &[u8; BLOCK_LEN]) -> Result<[u8; BLOCK_LEN]> {
    let mut buf = GenericArray::clone_from_slice(block);
    cipher(key)?.decrypt_block(&mut buf);
    let mut out = [0u8; BLOCK_LEN];
    out.copy_from_slice(&buf);
    Ok(out)
}

/// Encrypts one 16-byte block with AES-256 in ECB mode, without padding.
pub fn aes256_encrypt_block(key: &[u8], block: &[u8; BLOCK_LEN]) -> Result<[u8; BLOCK_LEN]> {
    let mut buf = GenericArray::clone_from_slice(block);
    cipher(key)?.encrypt_block(&mut buf);
    let mut out = [0u8; BLOCK_LEN];
    out.copy_from_slice(&buf);
    Ok(out)
}

/// SHA-256 applied twice.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(data).to_byte_array()
}

/// Unicode NFC form of a passphrase. Its UTF-8 bytes are what scrypt consumes.
pub fn normalize_passphrase(passphrase: &str) -> String {
    passphrase.nfc().collect()
}

/// XORs `a` with `b` into a new array.
pub(crate) fn xor<const N: usize>(a: &[u8; N], b: &[u8]) -> [u8; N] {
    let mut out = *a;
    for (byte, mask) in out.iter_mut().zip(b) {
        *byte ^= mask;
    }
    out
}
