//! Wallet accounts resolved from the `PRIVATE_KEY_MAP` configuration.
//!
//! Format: a comma separated list of `name|key` entries. A bare key (no
//! `|`) is registered as `default`. When an encryption secret is supplied,
//! every key is a Fernet token that decrypts to the hex private key.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::error::ExponentiatorError;

/// Name given to a bare key without a `name|` prefix.
pub const DEFAULT_WALLET_NAME: &str = "default";

/// A named wallet with its signing key. NEVER log the signer.
#[derive(Clone)]
pub struct WalletAccount {
    name: String,
    signer: PrivateKeySigner,
}

impl WalletAccount {
    pub fn new(name: impl Into<String>, signer: PrivateKeySigner) -> Self {
        Self {
            name: name.into(),
            signer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet for building a signing provider for this account.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for WalletAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletAccount")
            .field("name", &self.name)
            .field("address", &self.address())
            .finish()
    }
}

/// Parse the private key map into accounts, preserving configuration order.
pub fn parse_private_key_map(
    raw: &str,
    encryption_secret: Option<&str>,
) -> Result<Vec<WalletAccount>, ExponentiatorError> {
    let fernet = encryption_secret
        .map(|secret| {
            fernet::Fernet::new(secret).ok_or_else(|| {
                ExponentiatorError::Wallet("ENCRYPTION_SECRET is not a valid Fernet key".to_string())
            })
        })
        .transpose()?;

    let mut accounts: Vec<WalletAccount> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, key_material) = match entry.split_once('|') {
            Some((name, key)) => (name.trim(), key.trim()),
            None => (DEFAULT_WALLET_NAME, entry),
        };

        if name.is_empty() {
            return Err(ExponentiatorError::Wallet(
                "wallet entry has an empty name".to_string(),
            ));
        }
        if accounts.iter().any(|a| a.name == name) {
            return Err(ExponentiatorError::Wallet(format!(
                "wallet [{name}] is configured more than once"
            )));
        }

        let key = match &fernet {
            Some(f) => decrypt_key(f, name, key_material)?,
            None => key_material.to_string(),
        };

        let signer: PrivateKeySigner = key.trim().parse().map_err(|_| {
            // Do not echo the key material back.
            ExponentiatorError::Wallet(format!("wallet [{name}] has an invalid private key"))
        })?;

        accounts.push(WalletAccount::new(name, signer));
    }

    if accounts.is_empty() {
        return Err(ExponentiatorError::Wallet(
            "no wallets configured, set PRIVATE_KEY_MAP".to_string(),
        ));
    }

    Ok(accounts)
}

fn decrypt_key(
    fernet: &fernet::Fernet,
    name: &str,
    token: &str,
) -> Result<String, ExponentiatorError> {
    let bytes = fernet.decrypt(token).map_err(|_| {
        ExponentiatorError::Wallet(format!("wallet [{name}] key could not be decrypted"))
    })?;
    String::from_utf8(bytes).map_err(|_| {
        ExponentiatorError::Wallet(format!("wallet [{name}] decrypted key is not UTF-8"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn test_named_entries_keep_order() {
        let raw = format!("main|{KEY_A}, spare|0x{KEY_B}");
        let accounts = parse_private_key_map(&raw, None).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].name(), "main");
        assert_eq!(accounts[1].name(), "spare");
        assert_ne!(accounts[0].address(), accounts[1].address());
    }

    #[test]
    fn test_bare_key_is_default() {
        let accounts = parse_private_key_map(KEY_A, None).unwrap();
        assert_eq!(accounts[0].name(), DEFAULT_WALLET_NAME);
    }

    #[test]
    fn test_empty_map_is_rejected() {
        assert!(matches!(
            parse_private_key_map(" , ", None),
            Err(ExponentiatorError::Wallet(_))
        ));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let raw = format!("main|{KEY_A},main|{KEY_B}");
        assert!(parse_private_key_map(&raw, None).is_err());
    }

    #[test]
    fn test_invalid_key_does_not_leak_material() {
        let err = parse_private_key_map("main|not-a-key-secret", None).unwrap_err();
        assert!(!err.to_string().contains("not-a-key-secret"));
    }

    #[test]
    fn test_encrypted_keys_are_decrypted() {
        let secret = fernet::Fernet::generate_key();
        let f = fernet::Fernet::new(&secret).unwrap();
        let raw = format!("vault|{}", f.encrypt(KEY_A.as_bytes()));

        let accounts = parse_private_key_map(&raw, Some(&secret)).unwrap();
        let plain = parse_private_key_map(KEY_A, None).unwrap();
        assert_eq!(accounts[0].address(), plain[0].address());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let f = fernet::Fernet::new(&fernet::Fernet::generate_key()).unwrap();
        let raw = format!("vault|{}", f.encrypt(KEY_A.as_bytes()));
        let other = fernet::Fernet::generate_key();
        assert!(parse_private_key_map(&raw, Some(&other)).is_err());
    }

    #[test]
    fn test_debug_omits_key() {
        let accounts = parse_private_key_map(KEY_A, None).unwrap();
        let debug = format!("{:?}", accounts[0]);
        assert!(!debug.contains(KEY_A));
        assert!(debug.contains("default"));
    }
}
