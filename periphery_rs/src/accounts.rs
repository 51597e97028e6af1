//! Account resolution: a single private key, or a set of accounts derived from a mnemonic.

use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

use crate::constants::{DEPLOYER_PK, DERIVATION_PATH, MNEMONIC, MNEMONIC_ACCOUNT_COUNT};
use crate::env::Env;
use crate::error::{AccountError, ConfigError};

const REDACTED: &str = "<redacted>";

#[derive(Clone, PartialEq, Eq)]
pub enum AccountStrategy {
    /// One signer from a hex private key.
    SingleKey(String),
    /// `count` accounts at `{path}/{index}`.
    MnemonicDerived {
        phrase: String,
        path: String,
        count: u32,
    },
}

impl AccountStrategy {
    /// Resolves the deployer credentials from the environment.
    ///
    /// `DEPLOYER_PK` wins when both variables are set.
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        match (env.get(DEPLOYER_PK), env.get(MNEMONIC)) {
            (Some(pk), mnemonic) => {
                if mnemonic.is_some() {
                    warn!("Both {} and {} are set, using the private key", DEPLOYER_PK, MNEMONIC);
                }
                Ok(AccountStrategy::SingleKey(pk.to_string()))
            }
            (None, Some(phrase)) => Ok(AccountStrategy::mnemonic(phrase, MNEMONIC_ACCOUNT_COUNT)),
            (None, None) => Err(ConfigError::MissingCredentials),
        }
    }

    pub fn mnemonic(phrase: &str, count: u32) -> Self {
        AccountStrategy::MnemonicDerived {
            phrase: phrase.to_string(),
            path: DERIVATION_PATH.to_string(),
            count,
        }
    }

    pub fn account_count(&self) -> u32 {
        match self {
            AccountStrategy::SingleKey(_) => 1,
            AccountStrategy::MnemonicDerived { count, .. } => *count,
        }
    }

    /// Derivation path of every account, empty for a single key.
    pub fn derivation_paths(&self) -> Vec<String> {
        match self {
            AccountStrategy::SingleKey(_) => Vec::new(),
            AccountStrategy::MnemonicDerived { path, count, .. } => {
                (0..*count).map(|index| format!("{path}/{index}")).collect()
            }
        }
    }

    /// Builds the signers. The first one is the deployer.
    pub fn signers(&self) -> Result<Vec<PrivateKeySigner>, AccountError> {
        let signers = match self {
            AccountStrategy::SingleKey(key) => {
                let signer: PrivateKeySigner = key
                    .parse()
                    .map_err(|e| AccountError::PrivateKey(format!("{e}")))?;
                vec![signer]
            }
            AccountStrategy::MnemonicDerived { phrase, .. } => self
                .derivation_paths()
                .into_iter()
                .enumerate()
                .map(|(index, path)| {
                    let index = index as u32;
                    MnemonicBuilder::<English>::default()
                        .phrase(phrase.as_str())
                        .derivation_path(path.as_str())
                        .and_then(|builder| builder.build())
                        .map_err(|e| AccountError::Mnemonic {
                            index,
                            reason: e.to_string(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        if signers.is_empty() {
            return Err(AccountError::NoSigners);
        }
        Ok(signers)
    }
}

impl fmt::Debug for AccountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStrategy::SingleKey(_) => f.debug_tuple("SingleKey").field(&REDACTED).finish(),
            AccountStrategy::MnemonicDerived { path, count, .. } => f
                .debug_struct("MnemonicDerived")
                .field("phrase", &REDACTED)
                .field("path", path)
                .field("count", count)
                .finish(),
        }
    }
}

/// Serializes in the network-table shape (`["<key>"]` or `{ mnemonic, path, count }`)
/// with secrets replaced.
impl Serialize for AccountStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AccountStrategy::SingleKey(_) => [REDACTED].serialize(serializer),
            AccountStrategy::MnemonicDerived { path, count, .. } => {
                let mut state = serializer.serialize_struct("MnemonicDerived", 3)?;
                state.serialize_field("mnemonic", REDACTED)?;
                state.serialize_field("path", path)?;
                state.serialize_field("count", count)?;
                state.end()
            }
        }
    }
}
