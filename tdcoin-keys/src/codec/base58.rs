//! Base58 and Base58Check encoding
//!
//! Base58 uses the alphabet `123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz`,
//! leaving out `0`, `O`, `I` and `l`. Each leading zero byte is written as a
//! leading `1`. Base58Check appends the first four bytes of the double SHA-256
//! of the payload before encoding.

use alloc::string::String;
use alloc::vec::Vec;

use bitcoin_hashes::{Hash, sha256d};

use crate::error::{Error, Result};

/// Length of the Base58Check checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Encodes bytes as Base58.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes Base58 text.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter {
            character,
            index,
        } => Error::InvalidCharacter {
            character,
            index,
        },
        bs58::decode::Error::NonAsciiCharacter {
            index,
        } => Error::InvalidCharacter {
            character: s.get(index..).and_then(|rest| rest.chars().next()).unwrap_or('\u{fffd}'),
            index,
        },
        other => Error::Base58(other.to_string()),
    })
}

/// First four bytes of the double SHA-256 of `payload`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = sha256d::Hash::hash(payload).to_byte_array();
    let mut result = [0u8; CHECKSUM_LEN];
    result.copy_from_slice(&hash[..CHECKSUM_LEN]);
    result
}

/// Encodes `payload` followed by its checksum.
pub fn encode_check(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    encode(&data)
}

/// Decodes Base58Check text and returns the payload without its checksum.
pub fn decode_check(s: &str) -> Result<Vec<u8>> {
    let mut data = decode(s)?;
    if data.len() < CHECKSUM_LEN {
        return Err(Error::InvalidDataLength(format!(
            "{} bytes is too short for a checksummed payload",
            data.len()
        )));
    }
    let split = data.len() - CHECKSUM_LEN;
    if checksum(&data[..split]) != data[split..] {
        return Err(Error::InvalidChecksum);
    }
    data.truncate(split);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use hex::FromHex;

    use super::*;

    #[test]
    fn test_base58_encode() {
        assert_eq!(encode(&[0]), "1");
        assert_eq!(encode(&[1]), "2");
        assert_eq!(encode(&[58]), "21");
        assert_eq!(encode(&[13, 36]), "211");
        assert_eq!(encode(&[0, 13, 36]), "1211");
        assert_eq!(encode(&[0, 0, 0, 0, 13, 36]), "1111211");
        assert_eq!(encode(b"Hello World"), "JxF12TrwUP45BMd");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_base58_decode() {
        assert_eq!(decode("1").unwrap(), vec![0]);
        assert_eq!(decode("2").unwrap(), vec![1]);
        assert_eq!(decode("21").unwrap(), vec![58]);
        assert_eq!(decode("211").unwrap(), vec![13, 36]);
        assert_eq!(decode("1211").unwrap(), vec![0, 13, 36]);
        assert_eq!(decode("111211").unwrap(), vec![0, 0, 0, 13, 36]);
        assert_eq!(decode("JxF12TrwUP45BMd").unwrap(), b"Hello World".to_vec());
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_base58_invalid_character() {
        assert_matches!(
            decode("this is not base58"),
            Err(Error::InvalidCharacter {
                character: ' ',
                index: 4,
            })
        );
        assert_matches!(
            decode("0OIl"),
            Err(Error::InvalidCharacter {
                character: '0',
                index: 0,
            })
        );
        assert_matches!(
            decode("21é"),
            Err(Error::InvalidCharacter {
                character: 'é',
                index: 2,
            })
        );
    }

    #[test]
    fn test_base58_check() {
        let payload = Vec::from_hex("6ffda79a24e50ff70ff42f7d89585da5bd19d9e5cc").unwrap();
        let encoded = encode_check(&payload);
        assert_eq!(encoded, "n4eA2nbYqErp7H6jebchxAN59DmNpksexv");
        assert_eq!(decode_check(&encoded).unwrap(), payload);

        // empty payload has a checksum too
        assert_eq!(decode_check(&encode_check(&[])).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_base58_check_too_short() {
        // three bytes after base58 decoding
        let short = encode(&[1, 2, 3]);
        assert_matches!(decode_check(&short), Err(Error::InvalidDataLength(_)));
        assert_matches!(decode_check(""), Err(Error::InvalidDataLength(_)));
    }

    #[test]
    fn test_base58_check_bad_checksum() {
        assert_matches!(
            decode_check("n4eA2nbYqErp7H6jebchxAN59DmNpksexw"),
            Err(Error::InvalidChecksum)
        );
    }

    #[test]
    fn test_base58_check_single_character_mutations() {
        let valid = "n4eA2nbYqErp7H6jebchxAN59DmNpksexv";
        let alphabet: Vec<char> =
            "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz".chars().collect();
        let mut failures = 0;
        let mut attempts = 0;
        for (pos, current) in valid.char_indices() {
            for replacement in alphabet.iter().step_by(7).filter(|c| **c != current) {
                let mut mutated = String::with_capacity(valid.len());
                mutated.push_str(&valid[..pos]);
                mutated.push(*replacement);
                mutated.push_str(&valid[pos + 1..]);
                attempts += 1;
                if decode_check(&mutated).is_err() {
                    failures += 1;
                }
            }
        }
        // a mutation slips through with probability 2^-32
        assert_eq!(failures, attempts);
    }
}
