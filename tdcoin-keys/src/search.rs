//! Bounded parallel passphrase search
//!
//! Every candidate costs a full scrypt derivation, which holds
//! [`ScryptParams::memory_cost`](crate::kdf::ScryptParams::memory_cost) bytes
//! while it runs. The search runs on its own pool so the number of workers,
//! and with it the peak memory, is fixed by the caller.

use alloc::string::{String, ToString};

use rayon::prelude::*;

use crate::bip38::EncryptedPrivateKey;
use crate::error::{Error, Result};
use crate::key::PrivateKey;

/// A passphrase that unlocked a key, and the key it unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassphraseMatch {
    pub passphrase: String,
    pub key: PrivateKey,
}

/// Tries `candidates` against `key` on exactly `parallelism` worker threads.
///
/// Returns `Ok(None)` when no candidate unlocks the key. When several do, any
/// one of them may be returned. Errors other than a wrong passphrase abort the
/// search.
pub fn find_passphrase<S>(
    key: &EncryptedPrivateKey,
    candidates: &[S],
    parallelism: usize,
) -> Result<Option<PassphraseMatch>>
where
    S: AsRef<str> + Sync,
{
    if parallelism == 0 {
        return Err(Error::Config("passphrase search needs at least one thread".into()));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .thread_name(|i| format!("bip38-search-{}", i))
        .build()
        .map_err(|e| Error::Config(format!("failed to start search threads: {}", e)))?;

    tracing::debug!(
        "Searching {} passphrases for {} on {} threads",
        candidates.len(),
        key.network(),
        parallelism
    );
    let found = pool
        .install(|| {
            candidates.par_iter().find_map_any(|candidate| {
                let passphrase = candidate.as_ref();
                match key.decrypt(passphrase) {
                    Ok(unlocked) => Some(Ok(PassphraseMatch {
                        passphrase: passphrase.to_string(),
                        key: unlocked,
                    })),
                    Err(Error::BadPassphrase) => None,
                    Err(e) => Some(Err(e)),
                }
            })
        })
        .transpose()?;
    tracing::debug!("Passphrase search finished, match found: {}", found.is_some());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use secp256k1::SecretKey;
    use tdcoin_network::NetworkParameters;

    use super::*;
    use crate::bip38::encrypt_private_key;

    fn encrypted(passphrase: &str) -> (EncryptedPrivateKey, SecretKey) {
        let secret = SecretKey::from_slice(&[0x11; 32]).unwrap();
        let key = encrypt_private_key(&secret, passphrase, true, &NetworkParameters::testnet())
            .unwrap();
        (key, secret)
    }

    #[test]
    fn test_finds_matching_passphrase() {
        let (key, secret) = encrypted("hunter2");
        let candidates = ["password", "letmein", "hunter2", "123456"];
        let found = find_passphrase(&key, &candidates, 2).unwrap().unwrap();
        assert_eq!(found.passphrase, "hunter2");
        assert_eq!(found.key.secret_key(), &secret);
        assert!(found.key.compressed());
    }

    #[test]
    fn test_no_match() {
        let (key, _) = encrypted("hunter2");
        let candidates = vec!["password".to_string(), "letmein".to_string()];
        assert_eq!(find_passphrase(&key, &candidates, 1).unwrap(), None);
    }

    #[test]
    fn test_empty_candidates() {
        let (key, _) = encrypted("hunter2");
        let candidates: [&str; 0] = [];
        assert_eq!(find_passphrase(&key, &candidates, 4).unwrap(), None);
    }

    #[test]
    fn test_zero_parallelism_is_config_error() {
        let (key, _) = encrypted("hunter2");
        assert_matches!(find_passphrase(&key, &["hunter2"], 0), Err(Error::Config(_)));
    }
}
