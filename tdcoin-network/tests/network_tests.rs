//! Network parameter and registry tests

use std::str::FromStr;

use tdcoin_network::{Network, NetworkError, NetworkParameters, NetworkRegistry};

#[test]
fn test_well_known_networks() {
    let mainnet = NetworkParameters::from(Network::Tdcoin);
    assert_eq!(mainnet.id(), "org.tdcoin.production");
    assert_eq!(mainnet.p2pkh_version(), 65);
    assert_eq!(mainnet.p2sh_version(), 82);
    assert_eq!(mainnet.wif_version(), 107);

    let testnet = NetworkParameters::from(Network::Testnet);
    assert_eq!(testnet.id(), "org.tdcoin.test");
    assert_eq!(testnet.segwit_hrp(), Some("tt"));

    let regtest = Network::Regtest.params();
    assert_eq!(regtest.segwit_hrp(), Some("tdrt"));
    assert_eq!(regtest.p2pkh_version(), testnet.p2pkh_version());
}

#[test]
fn test_network_from_str() {
    assert_eq!(Network::from_str("mainnet").unwrap(), Network::Tdcoin);
    assert_eq!(Network::from_str("TESTNET").unwrap(), Network::Testnet);
    assert_eq!(Network::from_str("regtest").unwrap(), Network::Regtest);
    assert!(matches!(Network::from_str("devnet"), Err(NetworkError::UnknownNetwork(_))));
    assert_eq!(Network::from_id("org.tdcoin.test"), Some(Network::Testnet));
    assert_eq!(Network::from_id("org.bitcoin.production"), None);
}

#[test]
fn test_parameters_compare_by_id() {
    let a = NetworkParameters::new("same.id", 1, 2, 3, None);
    let b = NetworkParameters::new("same.id", 4, 5, 6, Some("xx"));
    assert_eq!(a, b);
    assert!(NetworkParameters::mainnet() < NetworkParameters::testnet());
}

#[test]
fn test_custom_registry() {
    let bitcoin = NetworkParameters::new("org.bitcoin.production", 0, 5, 128, Some("bc"));
    let registry = NetworkRegistry::from_networks([bitcoin.clone()]).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.resolve_by_legacy_version(5), Some(bitcoin.clone()));
    assert_eq!(registry.resolve_by_hrp("BC"), Some(bitcoin.clone()));
    assert_eq!(registry.resolve_by_legacy_version(65), None);

    registry.register(NetworkParameters::mainnet()).unwrap();
    assert_eq!(registry.networks().len(), 2);
    registry.unregister(&bitcoin);
    assert_eq!(registry.networks(), vec![NetworkParameters::mainnet()]);
}

#[test]
fn test_from_networks_rejects_conflicts() {
    let result = NetworkRegistry::from_networks([
        NetworkParameters::testnet(),
        NetworkParameters::new("other.test", 30, 31, 32, Some("tt")),
    ]);
    assert!(matches!(result, Err(NetworkError::Conflict { .. })));
}

#[test]
fn test_empty_registry() {
    let registry = NetworkRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.resolve_by_hrp("tc"), None);
}
