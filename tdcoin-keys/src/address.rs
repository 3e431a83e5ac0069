//! Address parsing, encoding and output scripts
//!
//! An [`Address`] is either a legacy Base58Check address (pay-to-pubkey-hash
//! or pay-to-script-hash) or a segregated witness address encoded as Bech32.
//! Both carry the [`NetworkParameters`] they were decoded for.
//!
//! Decoding without an expected network resolves the version byte or hrp in a
//! [`NetworkRegistry`]. Decoding with an expected network only accepts that
//! network's prefixes.
//!
//! ```rust
//! use tdcoin_keys::Address;
//! use tdcoin_network::NetworkParameters;
//!
//! let address: Address = "n4eA2nbYqErp7H6jebchxAN59DmNpksexv".parse().unwrap();
//! assert_eq!(address.network(), &NetworkParameters::testnet());
//! assert_eq!(address.to_string(), "n4eA2nbYqErp7H6jebchxAN59DmNpksexv");
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use secp256k1::PublicKey;
use tdcoin_network::{NetworkParameters, NetworkRegistry};

use crate::codec;
use crate::codec::base58;
use crate::ecc;
use crate::error::{Error, Result};

/// Length of a decoded legacy address: version byte and 20-byte hash.
pub const LEGACY_PAYLOAD_LEN: usize = 21;
/// Highest witness version.
pub const MAX_WITNESS_VERSION: u8 = 16;
/// Shortest witness program.
pub const MIN_PROGRAM_LEN: usize = 2;
/// Longest witness program.
pub const MAX_PROGRAM_LEN: usize = 40;

const MAX_HRP_LEN: usize = 83;

// Script opcodes
const OP_0: u8 = 0x00;
const OP_PUSHNUM_1: u8 = 0x51;
const OP_DUP: u8 = 0x76;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_HASH160: u8 = 0xa9;
const OP_CHECKSIG: u8 = 0xac;

/// Standard output script shapes an address can pay to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputScriptType {
    /// Pay to public key hash
    P2pkh,
    /// Pay to script hash
    P2sh,
    /// Version 0 witness program of 20 bytes
    P2wpkh,
    /// Version 0 witness program of 32 bytes
    P2wsh,
    /// Any other witness program
    WitnessUnknown,
}

/// A Base58Check address: a version byte and a 20-byte hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegacyAddress {
    network: NetworkParameters,
    version: u8,
    hash: [u8; 20],
}

impl LegacyAddress {
    /// Creates an address. `version` must be the p2pkh or p2sh version of `network`.
    pub fn new(network: &NetworkParameters, version: u8, hash: [u8; 20]) -> Result<Self> {
        if !network.claims_legacy_version(version) {
            return Err(Error::WrongNetwork(format!(
                "version {} is not a legacy address version of {}",
                version, network
            )));
        }
        Ok(Self {
            network: network.clone(),
            version,
            hash,
        })
    }

    /// Decodes a Base58Check address.
    ///
    /// With `expected` set the version byte must belong to that network,
    /// otherwise it is resolved in `registry`.
    pub fn from_base58_in(
        registry: &NetworkRegistry,
        text: &str,
        expected: Option<&NetworkParameters>,
    ) -> Result<Self> {
        let payload = base58::decode_check(text)?;
        if payload.len() != LEGACY_PAYLOAD_LEN {
            return Err(Error::InvalidDataLength(format!(
                "legacy address payload of {} bytes, expected {}",
                payload.len(),
                LEGACY_PAYLOAD_LEN
            )));
        }
        let version = payload[0];
        let network = match expected {
            Some(network) => {
                if !network.claims_legacy_version(version) {
                    return Err(Error::WrongNetwork(format!(
                        "version {} does not belong to {}",
                        version, network
                    )));
                }
                network.clone()
            }
            None => registry.resolve_by_legacy_version(version).ok_or_else(|| {
                Error::InvalidPrefix(format!("no known network uses version {}", version))
            })?,
        };
        tracing::trace!("Resolved legacy version {} to {}", version, network);

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(Self {
            network,
            version,
            hash,
        })
    }

    pub fn network(&self) -> &NetworkParameters {
        &self.network
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The hash160 of the public key or script.
    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    pub fn is_p2sh(&self) -> bool {
        self.version != self.network.p2pkh_version() && self.version == self.network.p2sh_version()
    }

    pub fn to_base58(&self) -> String {
        let mut payload = Vec::with_capacity(LEGACY_PAYLOAD_LEN);
        payload.push(self.version);
        payload.extend_from_slice(&self.hash);
        base58::encode_check(&payload)
    }
}

impl fmt::Display for LegacyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// A segregated witness address: witness version and program, encoded as Bech32.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegwitAddress {
    network: NetworkParameters,
    witness_version: u8,
    program: Vec<u8>,
}

impl SegwitAddress {
    /// Creates an address, checking the witness version and program length.
    pub fn new(network: &NetworkParameters, witness_version: u8, program: &[u8]) -> Result<Self> {
        segwit_hrp(network)?;
        check_witness_program(witness_version, program)?;
        Ok(Self {
            network: network.clone(),
            witness_version,
            program: program.to_vec(),
        })
    }

    /// Decodes a Bech32 address.
    ///
    /// With `expected` set the hrp must be that network's, otherwise it is
    /// resolved in `registry`.
    pub fn from_bech32_in(
        registry: &NetworkRegistry,
        text: &str,
        expected: Option<&NetworkParameters>,
    ) -> Result<Self> {
        let (hrp, values) = codec::bech32::decode(text)?;
        let network = match expected {
            Some(network) => {
                if !network.claims_hrp(&hrp) {
                    return Err(Error::WrongNetwork(format!(
                        "hrp {:?} does not belong to {}",
                        hrp, network
                    )));
                }
                network.clone()
            }
            None => registry.resolve_by_hrp(&hrp).ok_or_else(|| {
                Error::InvalidPrefix(format!("no known network uses hrp {:?}", hrp))
            })?,
        };
        tracing::trace!("Resolved hrp {} to {}", hrp, network);

        let (&witness_version, data) = values
            .split_first()
            .ok_or_else(|| Error::InvalidDataLength("missing witness version".into()))?;
        if witness_version > MAX_WITNESS_VERSION {
            return Err(Error::InvalidWitnessVersion(witness_version));
        }
        let program = codec::bech32::convert_bits(data, 5, 8, false)?;
        check_witness_program(witness_version, &program)?;
        Ok(Self {
            network,
            witness_version,
            program,
        })
    }

    pub fn network(&self) -> &NetworkParameters {
        &self.network
    }

    pub fn witness_version(&self) -> u8 {
        self.witness_version
    }

    pub fn program(&self) -> &[u8] {
        &self.program
    }

    /// Lower-case Bech32 text of the address.
    pub fn to_bech32(&self) -> String {
        self.to_string()
    }

    fn encode(&self) -> Result<String> {
        let hrp = segwit_hrp(&self.network)?;
        let mut values = Vec::with_capacity(1 + (self.program.len() * 8).div_ceil(5));
        values.push(self.witness_version);
        values.extend(codec::bech32::convert_bits(&self.program, 8, 5, true)?);
        codec::bech32::encode(hrp, &values)
    }
}

impl fmt::Display for SegwitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode().map_err(|_| fmt::Error)?)
    }
}

fn segwit_hrp(network: &NetworkParameters) -> Result<&str> {
    let hrp = network.segwit_hrp().ok_or_else(|| {
        Error::InvalidPrefix(format!("network {} has no segwit hrp", network))
    })?;
    let mixed_case =
        hrp.bytes().any(|b| b.is_ascii_uppercase()) && hrp.bytes().any(|b| b.is_ascii_lowercase());
    if hrp.is_empty()
        || hrp.len() > MAX_HRP_LEN
        || mixed_case
        || !hrp.bytes().all(|b| (33..=126).contains(&b))
    {
        return Err(Error::InvalidPrefix(format!("invalid segwit hrp {:?}", hrp)));
    }
    Ok(hrp)
}

fn check_witness_program(witness_version: u8, program: &[u8]) -> Result<()> {
    if witness_version > MAX_WITNESS_VERSION {
        return Err(Error::InvalidWitnessVersion(witness_version));
    }
    if program.len() < MIN_PROGRAM_LEN || program.len() > MAX_PROGRAM_LEN {
        return Err(Error::InvalidDataLength(format!(
            "witness program of {} bytes is outside {}..={}",
            program.len(),
            MIN_PROGRAM_LEN,
            MAX_PROGRAM_LEN
        )));
    }
    // version 0 programs are a pubkey hash or a script hash
    if witness_version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(Error::InvalidDataLength(format!(
            "version 0 witness program of {} bytes, expected 20 or 32",
            program.len()
        )));
    }
    Ok(())
}

/// A legacy or segwit address of some network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Legacy(LegacyAddress),
    SegwitWitness(SegwitAddress),
}

impl Address {
    /// Pay-to-pubkey-hash address for `hash`.
    pub fn p2pkh(network: &NetworkParameters, hash: [u8; 20]) -> Self {
        Address::Legacy(LegacyAddress {
            network: network.clone(),
            version: network.p2pkh_version(),
            hash,
        })
    }

    /// Pay-to-script-hash address for `hash`.
    pub fn p2sh(network: &NetworkParameters, hash: [u8; 20]) -> Self {
        Address::Legacy(LegacyAddress {
            network: network.clone(),
            version: network.p2sh_version(),
            hash,
        })
    }

    /// Pay-to-pubkey-hash address of a public key in the given serialisation.
    pub fn p2pkh_from_pubkey(
        network: &NetworkParameters,
        public_key: &PublicKey,
        compressed: bool,
    ) -> Self {
        let hash = if compressed {
            ecc::hash160(&public_key.serialize())
        } else {
            ecc::hash160(&public_key.serialize_uncompressed())
        };
        Self::p2pkh(network, hash)
    }

    /// Version 0 pay-to-witness-pubkey-hash address of a compressed public key.
    pub fn p2wpkh(network: &NetworkParameters, public_key: &PublicKey) -> Result<Self> {
        Self::segwit(network, 0, &ecc::hash160(&public_key.serialize()))
    }

    /// Witness address with an arbitrary version and program.
    pub fn segwit(
        network: &NetworkParameters,
        witness_version: u8,
        program: &[u8],
    ) -> Result<Self> {
        SegwitAddress::new(network, witness_version, program).map(Address::SegwitWitness)
    }

    /// Legacy address with an explicit version byte.
    pub fn legacy(network: &NetworkParameters, version: u8, hash: [u8; 20]) -> Result<Self> {
        LegacyAddress::new(network, version, hash).map(Address::Legacy)
    }

    /// Decodes a legacy address against the process-wide registry.
    pub fn from_base58(text: &str, expected: Option<&NetworkParameters>) -> Result<Self> {
        Self::from_base58_in(NetworkRegistry::global(), text, expected)
    }

    pub fn from_base58_in(
        registry: &NetworkRegistry,
        text: &str,
        expected: Option<&NetworkParameters>,
    ) -> Result<Self> {
        LegacyAddress::from_base58_in(registry, text, expected).map(Address::Legacy)
    }

    /// Decodes a segwit address against the process-wide registry.
    pub fn from_bech32(text: &str, expected: Option<&NetworkParameters>) -> Result<Self> {
        Self::from_bech32_in(NetworkRegistry::global(), text, expected)
    }

    pub fn from_bech32_in(
        registry: &NetworkRegistry,
        text: &str,
        expected: Option<&NetworkParameters>,
    ) -> Result<Self> {
        SegwitAddress::from_bech32_in(registry, text, expected).map(Address::SegwitWitness)
    }

    /// Decodes either kind of address against the process-wide registry.
    pub fn from_string(text: &str, expected: Option<&NetworkParameters>) -> Result<Self> {
        Self::from_string_in(NetworkRegistry::global(), text, expected)
    }

    /// Decodes either kind of address, trying Base58 first.
    ///
    /// When both decodings fail, the Bech32 error is reported if the text
    /// starts with a known hrp, the Base58 error otherwise.
    pub fn from_string_in(
        registry: &NetworkRegistry,
        text: &str,
        expected: Option<&NetworkParameters>,
    ) -> Result<Self> {
        let legacy_error = match Self::from_base58_in(registry, text, expected) {
            Ok(address) => return Ok(address),
            Err(e @ Error::WrongNetwork(_)) => return Err(e),
            Err(e) => e,
        };
        match Self::from_bech32_in(registry, text, expected) {
            Ok(address) => Ok(address),
            Err(e @ Error::WrongNetwork(_)) => Err(e),
            Err(e) if has_known_hrp(registry, text, expected) => Err(e),
            Err(_) => Err(legacy_error),
        }
    }

    /// The network an address string belongs to, looked up in the process-wide registry.
    pub fn network_of(text: &str) -> Result<NetworkParameters> {
        Self::from_string(text, None).map(|address| address.network().clone())
    }

    pub fn network(&self) -> &NetworkParameters {
        match self {
            Address::Legacy(legacy) => legacy.network(),
            Address::SegwitWitness(segwit) => segwit.network(),
        }
    }

    pub fn output_script_type(&self) -> OutputScriptType {
        match self {
            Address::Legacy(legacy) if legacy.is_p2sh() => OutputScriptType::P2sh,
            Address::Legacy(_) => OutputScriptType::P2pkh,
            Address::SegwitWitness(segwit) => match (segwit.witness_version, segwit.program.len()) {
                (0, 20) => OutputScriptType::P2wpkh,
                (0, 32) => OutputScriptType::P2wsh,
                _ => OutputScriptType::WitnessUnknown,
            },
        }
    }

    /// The standard output script paying to this address.
    pub fn script_pubkey(&self) -> Vec<u8> {
        match self {
            Address::Legacy(legacy) if legacy.is_p2sh() => {
                let mut script = Vec::with_capacity(23);
                script.push(OP_HASH160);
                script.push(20);
                script.extend_from_slice(&legacy.hash);
                script.push(OP_EQUAL);
                script
            }
            Address::Legacy(legacy) => {
                let mut script = Vec::with_capacity(25);
                script.push(OP_DUP);
                script.push(OP_HASH160);
                script.push(20);
                script.extend_from_slice(&legacy.hash);
                script.push(OP_EQUALVERIFY);
                script.push(OP_CHECKSIG);
                script
            }
            Address::SegwitWitness(segwit) => {
                let mut script = Vec::with_capacity(2 + segwit.program.len());
                script.push(match segwit.witness_version {
                    0 => OP_0,
                    version => OP_PUSHNUM_1 + version - 1,
                });
                // program length is at most 40, a direct push
                script.push(segwit.program.len() as u8);
                script.extend_from_slice(&segwit.program);
                script
            }
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            Address::Legacy(_) => 0,
            Address::SegwitWitness(_) => 1,
        }
    }
}

fn has_known_hrp(
    registry: &NetworkRegistry,
    text: &str,
    expected: Option<&NetworkParameters>,
) -> bool {
    let Some(hrp) = text.rfind(codec::bech32::SEPARATOR).map(|pos| &text[..pos]) else {
        return false;
    };
    match expected {
        Some(network) => network.claims_hrp(hrp),
        None => registry.resolve_by_hrp(hrp).is_some(),
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    /// Orders by network id, then legacy before segwit, then the raw bytes.
    fn cmp(&self, other: &Self) -> Ordering {
        self.network()
            .cmp(other.network())
            .then_with(|| self.discriminant().cmp(&other.discriminant()))
            .then_with(|| match (self, other) {
                (Address::Legacy(a), Address::Legacy(b)) => a.cmp(b),
                (Address::SegwitWitness(a), Address::SegwitWitness(b)) => a.cmp(b),
                _ => Ordering::Equal,
            })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Legacy(legacy) => fmt::Display::fmt(legacy, f),
            Address::SegwitWitness(segwit) => fmt::Display::fmt(segwit, f),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Address::from_string(s, None)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Deserialises from text, resolving the network in the process-wide registry.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        Address::from_string(&text, None).map_err(serde::de::Error::custom)
    }
}

impl From<LegacyAddress> for Address {
    fn from(address: LegacyAddress) -> Self {
        Address::Legacy(address)
    }
}

impl From<SegwitAddress> for Address {
    fn from(address: SegwitAddress) -> Self {
        Address::SegwitWitness(address)
    }
}
