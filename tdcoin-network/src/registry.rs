//! Registry of known networks used to resolve decoded address prefixes.
//!
//! Lookups take a shared lock and hand back owned snapshots, so callers never
//! hold the lock. `register`/`unregister` take the exclusive lock.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;

use crate::{NetworkError, NetworkParameters};

lazy_static! {
    static ref GLOBAL: NetworkRegistry = NetworkRegistry::with_defaults();
}

/// A set of network parameter sets keyed by id.
#[derive(Debug, Default)]
pub struct NetworkRegistry {
    networks: RwLock<BTreeMap<String, NetworkParameters>>,
}

impl NetworkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the TDCoin mainnet and testnet.
    pub fn with_defaults() -> Self {
        let mut networks = BTreeMap::new();
        for params in [NetworkParameters::mainnet(), NetworkParameters::testnet()] {
            networks.insert(params.id().to_string(), params);
        }
        Self {
            networks: RwLock::new(networks),
        }
    }

    /// Creates a registry from an arbitrary list of networks.
    pub fn from_networks(
        networks: impl IntoIterator<Item = NetworkParameters>,
    ) -> Result<Self, NetworkError> {
        let registry = Self::new();
        for params in networks {
            registry.register(params)?;
        }
        Ok(registry)
    }

    /// The process-wide registry, initialised with [`NetworkRegistry::with_defaults`].
    pub fn global() -> &'static NetworkRegistry {
        &GLOBAL
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, NetworkParameters>> {
        self.networks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, NetworkParameters>> {
        self.networks.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a network, replacing any entry with the same id.
    ///
    /// Fails if another network could decode the same address strings.
    pub fn register(&self, params: NetworkParameters) -> Result<(), NetworkError> {
        let mut networks = self.write();
        if let Some(existing) = networks.values().find(|known| known.collides_with(&params)) {
            return Err(NetworkError::Conflict {
                id: params.id().to_string(),
                existing: existing.id().to_string(),
            });
        }
        tracing::debug!("Registering network {}", params.id());
        networks.insert(params.id().to_string(), params);
        Ok(())
    }

    /// Removes a network. Returns the removed entry, if it was registered.
    pub fn unregister(&self, params: &NetworkParameters) -> Option<NetworkParameters> {
        let removed = self.write().remove(params.id());
        if removed.is_some() {
            tracing::debug!("Unregistered network {}", params.id());
        }
        removed
    }

    /// Finds the network whose p2pkh or p2sh version byte is `version`.
    ///
    /// When several networks share version bytes the one with the smallest id wins.
    pub fn resolve_by_legacy_version(&self, version: u8) -> Option<NetworkParameters> {
        self.read().values().find(|params| params.claims_legacy_version(version)).cloned()
    }

    /// Finds the network whose segwit hrp is `hrp`, ignoring ASCII case.
    pub fn resolve_by_hrp(&self, hrp: &str) -> Option<NetworkParameters> {
        self.read().values().find(|params| params.claims_hrp(hrp)).cloned()
    }

    pub fn get(&self, id: &str) -> Option<NetworkParameters> {
        self.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Snapshot of all registered networks, ordered by id.
    pub fn networks(&self) -> Vec<NetworkParameters> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
