//! BIP38 passphrase-protected private keys
//!
//! An encrypted key is 39 bytes before Base58Check encoding:
//!
//! | bytes  | content                                          |
//! |--------|--------------------------------------------------|
//! | 0      | `0x01`                                           |
//! | 1      | `0x42` non-EC-multiply, `0x43` EC-multiply       |
//! | 2      | flags                                            |
//! | 3..7   | address hash of the key's p2pkh address          |
//! | 7..39  | encrypted key (non-EC) or owner entropy and encrypted seed (EC) |
//!
//! Keys in both modes can be decrypted. Only non-EC-multiply keys can be
//! created here; EC-multiply keys come from intermediate codes generated elsewhere.
//!
//! Decryption is a sequence of pure steps (derive, decrypt, recombine,
//! verify). A passphrase is accepted only if the recovered key hashes back to
//! the address hash stored in the container.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use secp256k1::SecretKey;
use tdcoin_network::NetworkParameters;

use crate::codec::base58;
use crate::ecc;
use crate::error::{Error, Result};
use crate::kdf::{self, BLOCK_LEN, ScryptParams, xor};
use crate::key::PrivateKey;

/// Length of a decoded encrypted key.
pub const ENCRYPTED_KEY_LEN: usize = 39;

const PREFIX: u8 = 0x01;
const MODE_NON_EC: u8 = 0x42;
const MODE_EC: u8 = 0x43;

const FLAG_NON_EC: u8 = 0xc0;
const FLAG_COMPRESSED: u8 = 0x20;
const FLAG_LOT_SEQUENCE: u8 = 0x04;

/// BIP38 encryption mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bip38Mode {
    /// The private key itself is encrypted
    NonEcMultiply,
    /// The key is the product of a passphrase factor and an encrypted seed
    EcMultiply,
}

impl Bip38Mode {
    fn mode_byte(self) -> u8 {
        match self {
            Bip38Mode::NonEcMultiply => MODE_NON_EC,
            Bip38Mode::EcMultiply => MODE_EC,
        }
    }
}

/// A BIP38 encrypted private key for one network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedPrivateKey {
    network: NetworkParameters,
    mode: Bip38Mode,
    flags: u8,
    address_hash: [u8; 4],
    content: [u8; 32],
}

impl EncryptedPrivateKey {
    /// Parses a Base58Check encoded key. Structural problems are reported
    /// here, never by [`EncryptedPrivateKey::decrypt`].
    pub fn from_base58(network: &NetworkParameters, text: &str) -> Result<Self> {
        let payload = base58::decode_check(text)?;
        if payload.len() != ENCRYPTED_KEY_LEN {
            return Err(Error::InvalidDataLength(format!(
                "BIP38 payload of {} bytes, expected {}",
                payload.len(),
                ENCRYPTED_KEY_LEN
            )));
        }
        if payload[0] != PREFIX {
            return Err(Error::InvalidPrefix(format!("BIP38 prefix {:#04x}", payload[0])));
        }
        let mode = match payload[1] {
            MODE_NON_EC => Bip38Mode::NonEcMultiply,
            MODE_EC => Bip38Mode::EcMultiply,
            other => return Err(Error::InvalidPrefix(format!("BIP38 mode {:#04x}", other))),
        };
        let flags = payload[2];
        check_flags(mode, flags)?;

        let mut address_hash = [0u8; 4];
        address_hash.copy_from_slice(&payload[3..7]);
        let mut content = [0u8; 32];
        content.copy_from_slice(&payload[7..]);
        Ok(Self {
            network: network.clone(),
            mode,
            flags,
            address_hash,
            content,
        })
    }

    pub fn to_base58(&self) -> String {
        let mut payload = Vec::with_capacity(ENCRYPTED_KEY_LEN);
        payload.push(PREFIX);
        payload.push(self.mode.mode_byte());
        payload.push(self.flags);
        payload.extend_from_slice(&self.address_hash);
        payload.extend_from_slice(&self.content);
        base58::encode_check(&payload)
    }

    pub fn network(&self) -> &NetworkParameters {
        &self.network
    }

    pub fn mode(&self) -> Bip38Mode {
        self.mode
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Whether the key's address uses the compressed public key.
    pub fn compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub fn address_hash(&self) -> &[u8; 4] {
        &self.address_hash
    }

    /// Lot and sequence numbers of an EC-multiply key that carries them.
    pub fn lot_sequence(&self) -> Option<(u32, u32)> {
        if self.mode != Bip38Mode::EcMultiply || self.flags & FLAG_LOT_SEQUENCE == 0 {
            return None;
        }
        let value = u32::from_be_bytes([
            self.content[4],
            self.content[5],
            self.content[6],
            self.content[7],
        ]);
        Some((value / 4096, value % 4096))
    }

    /// Decrypts the key with `passphrase`.
    ///
    /// Fails with [`Error::BadPassphrase`] when the passphrase does not unlock the key.
    pub fn decrypt(&self, passphrase: &str) -> Result<PrivateKey> {
        tracing::trace!("Decrypting BIP38 key in {:?} mode", self.mode);
        let passphrase = kdf::normalize_passphrase(passphrase);
        let key = match self.mode {
            Bip38Mode::NonEcMultiply => self.decrypt_non_ec(&passphrase)?,
            Bip38Mode::EcMultiply => self.decrypt_ec(&passphrase)?,
        };
        verify(&self.network, &key, &self.address_hash)?;
        Ok(key)
    }

    fn decrypt_non_ec(&self, passphrase: &str) -> Result<PrivateKey> {
        let derived = derive_non_ec(passphrase, &self.address_hash)?;
        let secret = decrypt_content(&derived, &self.content)?;
        PrivateKey::from_slice(&secret, self.compressed()).map_err(|_| Error::BadPassphrase)
    }

    fn decrypt_ec(&self, passphrase: &str) -> Result<PrivateKey> {
        let mut owner_entropy = [0u8; 8];
        owner_entropy.copy_from_slice(&self.content[..8]);
        let lot_sequence = self.flags & FLAG_LOT_SEQUENCE != 0;

        let pass_factor = pass_factor(passphrase, &owner_entropy, lot_sequence)?;
        let pass_point = pass_point(&pass_factor)?;
        let derived = derive_ec(&pass_point, &self.address_hash, &owner_entropy)?;
        let seed_b = recover_seed_b(&derived, &self.content)?;
        let factor_b = factor_b(&seed_b);
        let secret =
            ecc::multiply_scalars(&pass_factor, &factor_b).map_err(|_| Error::BadPassphrase)?;
        PrivateKey::from_slice(&secret, self.compressed()).map_err(|_| Error::BadPassphrase)
    }
}

impl fmt::Display for EncryptedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// Encrypts `private_key` in non-EC-multiply mode.
///
/// The address hash is taken from the p2pkh address of the key on `network`,
/// with the public key compressed or not according to `compressed`.
pub fn encrypt_private_key(
    private_key: &SecretKey,
    passphrase: &str,
    compressed: bool,
    network: &NetworkParameters,
) -> Result<EncryptedPrivateKey> {
    let key = PrivateKey::new(*private_key, compressed);
    let address_hash = ecc::address_hash(&key.p2pkh_address(network).to_string());
    let passphrase = kdf::normalize_passphrase(passphrase);
    let derived = derive_non_ec(&passphrase, &address_hash)?;
    let content = encrypt_content(&derived, &key.secret_bytes())?;

    let mut flags = FLAG_NON_EC;
    if compressed {
        flags |= FLAG_COMPRESSED;
    }
    Ok(EncryptedPrivateKey {
        network: network.clone(),
        mode: Bip38Mode::NonEcMultiply,
        flags,
        address_hash,
        content,
    })
}

fn check_flags(mode: Bip38Mode, flags: u8) -> Result<()> {
    let valid = match mode {
        Bip38Mode::NonEcMultiply => {
            flags & FLAG_NON_EC == FLAG_NON_EC && flags & !(FLAG_NON_EC | FLAG_COMPRESSED) == 0
        }
        Bip38Mode::EcMultiply => flags & !(FLAG_COMPRESSED | FLAG_LOT_SEQUENCE) == 0,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidFlags(flags))
    }
}

/// 64 bytes of key material for non-EC-multiply mode: an XOR pad and an AES key.
fn derive_non_ec(passphrase: &str, address_hash: &[u8; 4]) -> Result<Vec<u8>> {
    kdf::scrypt(passphrase.as_bytes(), address_hash, ScryptParams::NON_EC)
}

fn decrypt_content(derived: &[u8], content: &[u8; 32]) -> Result<[u8; 32]> {
    let aes_key = &derived[32..64];
    let mut plain = [0u8; 32];
    for (i, block) in content.chunks_exact(BLOCK_LEN).enumerate() {
        let mut buf = [0u8; BLOCK_LEN];
        buf.copy_from_slice(block);
        let decrypted = kdf::aes256_decrypt_block(aes_key, &buf)?;
        let range = i * BLOCK_LEN..(i + 1) * BLOCK_LEN;
        plain[range.clone()].copy_from_slice(&xor(&decrypted, &derived[range]));
    }
    Ok(plain)
}

fn encrypt_content(derived: &[u8], secret: &[u8; 32]) -> Result<[u8; 32]> {
    let aes_key = &derived[32..64];
    let mut content = [0u8; 32];
    for (i, block) in secret.chunks_exact(BLOCK_LEN).enumerate() {
        let range = i * BLOCK_LEN..(i + 1) * BLOCK_LEN;
        let mut buf = [0u8; BLOCK_LEN];
        buf.copy_from_slice(block);
        let masked = xor(&buf, &derived[range.clone()]);
        content[range].copy_from_slice(&kdf::aes256_encrypt_block(aes_key, &masked)?);
    }
    Ok(content)
}

/// The passphrase scalar of an EC-multiply key.
///
/// With lot and sequence numbers only the first four bytes of the owner
/// entropy salt scrypt, and the result is hashed with the full entropy.
fn pass_factor(
    passphrase: &str,
    owner_entropy: &[u8; 8],
    lot_sequence: bool,
) -> Result<[u8; 32]> {
    let salt = if lot_sequence {
        &owner_entropy[..4]
    } else {
        &owner_entropy[..]
    };
    let pre_factor = kdf::scrypt(passphrase.as_bytes(), salt, ScryptParams::PASS_FACTOR)?;
    if lot_sequence {
        let mut data = Vec::with_capacity(pre_factor.len() + owner_entropy.len());
        data.extend_from_slice(&pre_factor);
        data.extend_from_slice(owner_entropy);
        Ok(kdf::double_sha256(&data))
    } else {
        let mut factor = [0u8; 32];
        factor.copy_from_slice(&pre_factor);
        Ok(factor)
    }
}

fn pass_point(pass_factor: &[u8; 32]) -> Result<[u8; 33]> {
    ecc::scalar_multiply(pass_factor).map_err(|_| Error::BadPassphrase)
}

fn derive_ec(
    pass_point: &[u8; 33],
    address_hash: &[u8; 4],
    owner_entropy: &[u8; 8],
) -> Result<Vec<u8>> {
    let mut salt = [0u8; 12];
    salt[..4].copy_from_slice(address_hash);
    salt[4..].copy_from_slice(owner_entropy);
    kdf::scrypt(pass_point, &salt, ScryptParams::EC_DERIVED)
}

/// Decrypts the two chained blocks of an EC-multiply key into the 24-byte seed.
fn recover_seed_b(derived: &[u8], content: &[u8; 32]) -> Result<[u8; 24]> {
    let aes_key = &derived[32..64];

    let mut encrypted_part2 = [0u8; BLOCK_LEN];
    encrypted_part2.copy_from_slice(&content[16..32]);
    let decrypted2 = xor(&kdf::aes256_decrypt_block(aes_key, &encrypted_part2)?, &derived[16..32]);

    // the first half of part 1 is stored, the second half is inside part 2
    let mut encrypted_part1 = [0u8; BLOCK_LEN];
    encrypted_part1[..8].copy_from_slice(&content[8..16]);
    encrypted_part1[8..].copy_from_slice(&decrypted2[..8]);
    let decrypted1 = xor(&kdf::aes256_decrypt_block(aes_key, &encrypted_part1)?, &derived[..16]);

    let mut seed_b = [0u8; 24];
    seed_b[..16].copy_from_slice(&decrypted1);
    seed_b[16..].copy_from_slice(&decrypted2[8..]);
    Ok(seed_b)
}

fn factor_b(seed_b: &[u8; 24]) -> [u8; 32] {
    kdf::double_sha256(seed_b)
}

fn verify(network: &NetworkParameters, key: &PrivateKey, address_hash: &[u8; 4]) -> Result<()> {
    let address = key.p2pkh_address(network).to_string();
    if &ecc::address_hash(&address) != address_hash {
        return Err(Error::BadPassphrase);
    }
    Ok(())
}
