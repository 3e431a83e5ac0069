//! BIP38 tests through the public API

#![cfg(feature = "bip38")]

use assert_matches::assert_matches;
use tdcoin_keys::{
    Bip38Mode, EncryptedPrivateKey, Error, NetworkParameters, PrivateKey, encrypt_private_key,
    find_passphrase,
};

#[test]
fn test_wif_to_bip38_and_back() {
    let (key, network) =
        PrivateKey::from_wif("GqT7ALhsydJhKsNn6V9XiTKXYhMDxw8HVtwbYjC2FuUzdyBNYCsX", None).unwrap();
    let encrypted = encrypt_private_key(key.secret_key(), "Satoshi", key.compressed(), &network)
        .unwrap();
    assert_eq!(encrypted.mode(), Bip38Mode::NonEcMultiply);
    assert_eq!(encrypted.lot_sequence(), None);

    let text = encrypted.to_string();
    assert!(text.starts_with("6PY"));
    let parsed = EncryptedPrivateKey::from_base58(&network, &text).unwrap();
    let decrypted = parsed.decrypt("Satoshi").unwrap();
    assert_eq!(decrypted, key);
    assert_eq!(decrypted.to_wif(&network), "GqT7ALhsydJhKsNn6V9XiTKXYhMDxw8HVtwbYjC2FuUzdyBNYCsX");
}

#[test]
fn test_decrypted_key_matches_address_hash() {
    let mainnet = NetworkParameters::mainnet();
    let key = EncryptedPrivateKey::from_base58(
        &mainnet,
        "6PRQjvj7eQm4g1CGaei8rMMb5ZX8P99zTAiYoxm8Rq154sfTdTPRQWxFbK",
    )
    .unwrap();
    let decrypted = key.decrypt("Satoshi").unwrap();
    assert!(!decrypted.compressed());
    let address = decrypted.p2pkh_address(&mainnet).to_string();
    assert_eq!(&tdcoin_keys::ecc::address_hash(&address), key.address_hash());
}

#[test]
fn test_find_passphrase() {
    let key = EncryptedPrivateKey::from_base58(
        &NetworkParameters::testnet(),
        "6PRPhQhmtw6dQu6jD8E1KS4VphwJxBS9Eh9C8FQELcrwN3vPvskv9NKvuL",
    )
    .unwrap();
    let found = find_passphrase(&key, &["letmein", "password", "hunter2"], 2).unwrap().unwrap();
    assert_eq!(found.passphrase, "password");
    assert_eq!(
        hex::encode(found.key.secret_bytes()),
        "e89015da0b6c28886da45346d57a3d210f787330b57d0ce3704f18d692661871"
    );
}

#[test]
fn test_malformed_input() {
    let mainnet = NetworkParameters::mainnet();
    assert_matches!(
        EncryptedPrivateKey::from_base58(&mainnet, "TVmhGH4A1spQpdRvyBB2xyg5XPPF9PLJYt"),
        Err(Error::InvalidDataLength(_))
    );
    assert_matches!(
        EncryptedPrivateKey::from_base58(
            &mainnet,
            "6PRQjvj7eQm4g1CGaei8rMMb5ZX8P99zTAiYoxm8Rq154sfTdTPRQWxFbL"
        ),
        Err(Error::InvalidChecksum)
    );
}
