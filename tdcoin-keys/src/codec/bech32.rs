//! Bech32 encoding and bit-group conversion
//!
//! Only the BIP173 checksum constant is accepted. Strings carrying a
//! Bech32m checksum fail with [`Error::InvalidChecksum`].

use alloc::string::String;
use alloc::vec::Vec;

use ::bech32::{Variant, u5};

use crate::error::{Error, Result};

/// Separator between the human-readable part and the data part.
pub const SEPARATOR: char = '1';
/// Number of checksum symbols at the end of the data part.
pub const CHECKSUM_LEN: usize = 6;
/// Shortest valid Bech32 string: one hrp character, separator, checksum.
pub const MIN_LENGTH: usize = 8;
/// Longest valid Bech32 string.
pub const MAX_LENGTH: usize = 90;

const CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Regroups a stream of `from_bits`-wide values into `to_bits`-wide values, most
/// significant bit first.
///
/// With `pad` set, an incomplete final group is emitted left-justified. Without
/// it, the leftover must be shorter than `from_bits` and all zero.
pub fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Result<Vec<u8>> {
    debug_assert!((1..=8).contains(&from_bits) && (1..=8).contains(&to_bits));
    let max_value: u32 = (1 << to_bits) - 1;
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);
    for &value in data {
        if u32::from(value) >> from_bits != 0 {
            return Err(Error::InvalidData(value));
        }
        acc = (acc << from_bits) | u32::from(value);
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            out.push(((acc >> bits) & max_value) as u8);
        }
        // keep only the bits not yet emitted
        acc &= (1 << bits) - 1;
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits {
        return Err(Error::InvalidPadding);
    } else if (acc << (to_bits - bits)) & max_value != 0 {
        return Err(Error::NonZeroPadding);
    }
    Ok(out)
}

/// Encodes 5-bit `values` under `hrp` with a Bech32 checksum. The output is lower-case.
pub fn encode(hrp: &str, values: &[u8]) -> Result<String> {
    let data = values
        .iter()
        .map(|&value| u5::try_from_u8(value).map_err(|_| Error::InvalidData(value)))
        .collect::<Result<Vec<u5>>>()?;
    ::bech32::encode(hrp, data, Variant::Bech32).map_err(|e| map_error(hrp, e))
}

/// Decodes a Bech32 string into its lower-case hrp and 5-bit values, checksum removed.
pub fn decode(s: &str) -> Result<(String, Vec<u8>)> {
    if s.len() < MIN_LENGTH || s.len() > MAX_LENGTH {
        return Err(Error::InvalidDataLength(format!(
            "bech32 string of {} characters is outside {}..={}",
            s.len(),
            MIN_LENGTH,
            MAX_LENGTH
        )));
    }
    if let Some(index) = mixed_case_index(s) {
        return Err(Error::InvalidCharacter {
            character: s[index..].chars().next().unwrap_or(SEPARATOR),
            index,
        });
    }
    match s.rfind(SEPARATOR) {
        None => return Err(Error::InvalidPrefix("missing separator".into())),
        Some(0) => return Err(Error::InvalidPrefix("missing human-readable part".into())),
        Some(pos) if s.len() - pos - 1 < CHECKSUM_LEN => {
            return Err(Error::InvalidDataLength("data part shorter than the checksum".into()));
        }
        Some(_) => {}
    }

    let (hrp, data, variant) = ::bech32::decode(s).map_err(|e| map_error(s, e))?;
    if variant != Variant::Bech32 {
        return Err(Error::InvalidChecksum);
    }
    Ok((hrp, data.into_iter().map(u5::to_u8).collect()))
}

/// Byte index of the first cased character whose case differs from the first cased character.
fn mixed_case_index(s: &str) -> Option<usize> {
    let mut first_upper = None;
    for (index, c) in s.char_indices() {
        if !c.is_ascii_alphabetic() {
            continue;
        }
        match first_upper {
            None => first_upper = Some(c.is_ascii_uppercase()),
            Some(upper) if upper != c.is_ascii_uppercase() => return Some(index),
            Some(_) => {}
        }
    }
    None
}

/// The first character outside the printable ASCII hrp range or the data charset.
fn invalid_character(s: &str) -> Option<(usize, char)> {
    let separator = s.rfind(SEPARATOR)?;
    s.char_indices().find(|&(index, c)| {
        if index < separator {
            !(33..=126).contains(&u32::from(c))
        } else {
            index > separator && !CHARSET.contains(c.to_ascii_lowercase())
        }
    })
}

fn map_error(input: &str, e: ::bech32::Error) -> Error {
    match e {
        ::bech32::Error::InvalidChar(reported) => {
            let (index, character) = invalid_character(input).unwrap_or((0, reported));
            Error::InvalidCharacter {
                character,
                index,
            }
        }
        ::bech32::Error::MixedCase => Error::InvalidCharacter {
            character: mixed_case_index(input)
                .and_then(|index| input[index..].chars().next())
                .unwrap_or(SEPARATOR),
            index: mixed_case_index(input).unwrap_or(0),
        },
        ::bech32::Error::InvalidChecksum => Error::InvalidChecksum,
        ::bech32::Error::InvalidLength => {
            Error::InvalidDataLength("invalid human-readable part or data length".into())
        }
        ::bech32::Error::MissingSeparator => Error::InvalidPrefix("missing separator".into()),
        ::bech32::Error::InvalidData(value) => Error::InvalidData(value),
        ::bech32::Error::InvalidPadding => Error::InvalidPadding,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_convert_bits_8_to_5() {
        assert_eq!(convert_bits(&[0xff], 8, 5, true).unwrap(), vec![31, 28]);
        assert_eq!(convert_bits(&[0x00, 0x01], 8, 5, true).unwrap(), vec![0, 0, 0, 16]);
        assert_eq!(convert_bits(&[], 8, 5, true).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_convert_bits_5_to_8() {
        assert_eq!(convert_bits(&[31, 28], 5, 8, false).unwrap(), vec![0xff]);
        let program = [0x75, 0x1e, 0x76, 0xe8];
        let five = convert_bits(&program, 8, 5, true).unwrap();
        assert_eq!(convert_bits(&five, 5, 8, false).unwrap(), program.to_vec());
    }

    #[test]
    fn test_convert_bits_non_zero_padding() {
        // 0xff followed by a set bit in the padding
        assert_matches!(convert_bits(&[31, 29], 5, 8, false), Err(Error::NonZeroPadding));
    }

    #[test]
    fn test_convert_bits_excess_padding() {
        // 15 bits give one byte and leave 7, more than a whole 5-bit group
        assert_matches!(convert_bits(&[31, 28, 0], 5, 8, false), Err(Error::InvalidPadding));
    }

    #[test]
    fn test_convert_bits_value_too_wide() {
        assert_matches!(convert_bits(&[32], 5, 8, false), Err(Error::InvalidData(32)));
    }

    #[test]
    fn test_bip173_valid_checksums() {
        let valid = [
            "A12UEL5L",
            "a12uel5l",
            "an83characterlonghumanreadablepartthatcontainsthenumber1andtheexcludedcharactersbio1tt5tgs",
            "abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw",
            "split1checkupstagehandshakeupstreamerranterredcaperred2y9e3w",
            "?1ezyfcl",
        ];
        for s in valid {
            let (hrp, values) = decode(s).unwrap_or_else(|e| panic!("{}: {}", s, e));
            let reencoded = encode(&hrp, &values).unwrap();
            assert_eq!(reencoded, s.to_lowercase());
        }
    }

    #[test]
    fn test_bip173_invalid() {
        assert_matches!(decode("pzry9x0s0muk"), Err(Error::InvalidPrefix(_)));
        assert_matches!(decode("1pzry9x0s0muk"), Err(Error::InvalidPrefix(_)));
        assert_matches!(decode("x1b4n0q5v"), Err(Error::InvalidCharacter { character: 'b', .. }));
        assert_matches!(decode("li1dgmt3"), Err(Error::InvalidDataLength(_)));
        assert_matches!(decode("A1G7SGD8"), Err(Error::InvalidChecksum));
        assert_matches!(decode("10a06t8"), Err(Error::InvalidDataLength(_)));
        assert_matches!(decode("1qzzfhee"), Err(Error::InvalidPrefix(_)));
    }

    #[test]
    fn test_non_ascii_character_position() {
        assert_matches!(
            decode("é1qqqqqqqq"),
            Err(Error::InvalidCharacter {
                character: 'é',
                index: 0,
            })
        );
        assert_matches!(
            decode("tc1qqqqéqqqqqq"),
            Err(Error::InvalidCharacter {
                character: 'é',
                index: 7,
            })
        );
        assert_matches!(
            decode("tc1qqqqqqqqbqq"),
            Err(Error::InvalidCharacter {
                character: 'b',
                index: 11,
            })
        );
    }

    #[test]
    fn test_mixed_case_is_invalid_character() {
        assert_matches!(
            decode("tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sL5k7"),
            Err(Error::InvalidCharacter {
                character: 'L',
                ..
            })
        );
        assert_matches!(decode("A12uEL5L"), Err(Error::InvalidCharacter { .. }));
    }

    #[test]
    fn test_too_long() {
        let long = format!("tc1{}", "q".repeat(88));
        assert_matches!(decode(&long), Err(Error::InvalidDataLength(_)));
    }

    #[test]
    fn test_bech32m_checksum_rejected() {
        // BIP350 test vector with a Bech32m checksum
        assert_matches!(decode("a1lqfn3a"), Err(Error::InvalidChecksum));
    }

    #[test]
    fn test_round_trip() {
        let values: Vec<u8> = (0..32).collect();
        let encoded = encode("tc", &values).unwrap();
        assert_eq!(decode(&encoded).unwrap(), ("tc".to_string(), values));

        let upper = encode("TC", &[0, 1, 2]).unwrap();
        assert!(upper.starts_with("tc1"));
        assert_eq!(decode(&upper.to_uppercase()).unwrap(), ("tc".to_string(), vec![0, 1, 2]));
    }

    #[test]
    fn test_encode_rejects_wide_values() {
        assert_matches!(encode("tc", &[0, 32]), Err(Error::InvalidData(32)));
    }

    #[test]
    fn test_single_character_mutations() {
        let valid = "tc1q76n3w20ex665lfgt42m2ck4nzc5xyws45gdx96";
        let charset: Vec<char> = "qpzry9x8gf2tvdw0s3jn54khce6mua7l".chars().collect();
        let data_start = valid.rfind(SEPARATOR).unwrap() + 1;
        for (pos, current) in valid.char_indices().skip(data_start) {
            for replacement in charset.iter().step_by(5).filter(|c| **c != current) {
                let mut mutated = String::from(&valid[..pos]);
                mutated.push(*replacement);
                mutated.push_str(&valid[pos + 1..]);
                // BCH code detects every single substitution
                assert_matches!(decode(&mutated), Err(Error::InvalidChecksum), "{}", mutated);
            }
        }
    }
}
