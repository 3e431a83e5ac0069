//! TDCoin network parameters shared across TDCoin crates
//!
//! A [`NetworkParameters`] value carries everything the address and key codecs
//! need to know about a chain: the Base58Check version bytes for legacy
//! addresses and WIF keys, and the Bech32 human-readable part used by segwit
//! addresses. The [`NetworkRegistry`] maps decoded prefixes back to a network.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

pub mod error;
pub mod registry;

pub use error::NetworkError;
pub use registry::NetworkRegistry;

/// Identifier of the TDCoin production network.
pub const ID_MAINNET: &str = "org.tdcoin.production";
/// Identifier of the TDCoin public test network.
pub const ID_TESTNET: &str = "org.tdcoin.test";
/// Identifier of the local regression test network.
pub const ID_REGTEST: &str = "org.tdcoin.regtest";

/// Version bytes and prefixes of one network.
///
/// Identity is the `id` alone: two parameter sets with the same id compare
/// equal, hash the same and sort together, whatever their other fields.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawNetworkParameters"))]
pub struct NetworkParameters {
    id: String,
    p2pkh_version: u8,
    p2sh_version: u8,
    wif_version: u8,
    segwit_hrp: Option<String>,
}

impl NetworkParameters {
    /// Creates a parameter set. The hrp is stored lower-case.
    pub fn new(
        id: impl Into<String>,
        p2pkh_version: u8,
        p2sh_version: u8,
        wif_version: u8,
        segwit_hrp: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            p2pkh_version,
            p2sh_version,
            wif_version,
            segwit_hrp: segwit_hrp.map(|hrp| hrp.to_ascii_lowercase()),
        }
    }

    /// The TDCoin production network.
    pub fn mainnet() -> Self {
        Self::new(ID_MAINNET, 65, 82, 107, Some("tc"))
    }

    /// The TDCoin public test network.
    pub fn testnet() -> Self {
        Self::new(ID_TESTNET, 111, 196, 239, Some("tt"))
    }

    /// The regression test network. It shares the testnet version bytes and
    /// is only told apart by its hrp, so it is not registered by default.
    pub fn regtest() -> Self {
        Self::new(ID_REGTEST, 111, 196, 239, Some("tdrt"))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Version byte of pay-to-pubkey-hash addresses.
    pub fn p2pkh_version(&self) -> u8 {
        self.p2pkh_version
    }

    /// Version byte of pay-to-script-hash addresses.
    pub fn p2sh_version(&self) -> u8 {
        self.p2sh_version
    }

    /// Version byte of WIF-encoded private keys.
    pub fn wif_version(&self) -> u8 {
        self.wif_version
    }

    /// Bech32 human-readable part, if the network supports segwit addresses.
    pub fn segwit_hrp(&self) -> Option<&str> {
        self.segwit_hrp.as_deref()
    }

    /// Whether `version` is one of this network's legacy address version bytes.
    pub fn claims_legacy_version(&self, version: u8) -> bool {
        version == self.p2pkh_version || version == self.p2sh_version
    }

    /// Whether this network's hrp matches `hrp`, ignoring ASCII case.
    pub fn claims_hrp(&self, hrp: &str) -> bool {
        self.segwit_hrp.as_deref().is_some_and(|own| own.eq_ignore_ascii_case(hrp))
    }

    /// Whether addresses of `self` and `other` could decode to the same string.
    pub(crate) fn collides_with(&self, other: &NetworkParameters) -> bool {
        if self.id == other.id {
            return false;
        }
        let same_hrp = match (&self.segwit_hrp, &other.segwit_hrp) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        let same_legacy = self.p2pkh_version == other.p2pkh_version
            && self.p2sh_version == other.p2sh_version
            && self.segwit_hrp.is_none()
            && other.segwit_hrp.is_none();
        same_hrp || same_legacy
    }
}

/// Field-wise form of [`NetworkParameters`] read from configuration, turned
/// into parameters through [`NetworkParameters::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawNetworkParameters {
    id: String,
    p2pkh_version: u8,
    p2sh_version: u8,
    wif_version: u8,
    #[serde(default)]
    segwit_hrp: Option<String>,
}

#[cfg(feature = "serde")]
impl From<RawNetworkParameters> for NetworkParameters {
    fn from(raw: RawNetworkParameters) -> Self {
        NetworkParameters::new(
            raw.id,
            raw.p2pkh_version,
            raw.p2sh_version,
            raw.wif_version,
            raw.segwit_hrp.as_deref(),
        )
    }
}

impl PartialEq for NetworkParameters {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NetworkParameters {}

impl Hash for NetworkParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for NetworkParameters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NetworkParameters {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for NetworkParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// The well-known TDCoin networks.
#[derive(Copy, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Network {
    /// The TDCoin production chain
    Tdcoin,
    /// TDCoin's testnet network.
    Testnet,
    /// Local regression test network.
    Regtest,
}

impl Network {
    /// Returns the parameter set of this network.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tdcoin_network::Network;
    ///
    /// let params = Network::Tdcoin.params();
    /// assert_eq!(params.p2pkh_version(), 65);
    /// assert_eq!(params.segwit_hrp(), Some("tc"));
    /// ```
    pub fn params(self) -> NetworkParameters {
        match self {
            Network::Tdcoin => NetworkParameters::mainnet(),
            Network::Testnet => NetworkParameters::testnet(),
            Network::Regtest => NetworkParameters::regtest(),
        }
    }

    /// Maps a parameter set id back to the well-known network.
    pub fn from_id(id: &str) -> Option<Network> {
        match id {
            ID_MAINNET => Some(Network::Tdcoin),
            ID_TESTNET => Some(Network::Testnet),
            ID_REGTEST => Some(Network::Regtest),
            _ => None,
        }
    }
}

impl From<Network> for NetworkParameters {
    fn from(network: Network) -> Self {
        network.params()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::Tdcoin => write!(f, "tdcoin"),
            Network::Testnet => write!(f, "testnet"),
            Network::Regtest => write!(f, "regtest"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tdcoin" | "mainnet" => Ok(Network::Tdcoin),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(NetworkError::UnknownNetwork(s.to_string())),
        }
    }
}
