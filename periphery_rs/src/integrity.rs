//! Startup check that every custom explorer has a verification key entry.

use crate::error::IntegrityError;
use crate::explorers::{ExplorerApiKeys, ExplorerRegistry};
use tracing::debug;

/// Fails on the first registry network without a key entry. Empty keys are accepted.
pub fn verify_config_integrity(
    registry: &ExplorerRegistry,
    keys: &ExplorerApiKeys,
) -> Result<(), IntegrityError> {
    for chain in registry.chains() {
        if !keys.contains(chain) {
            return Err(IntegrityError::MissingApiKey { chain });
        }
    }
    debug!("Explorer configuration covers {} networks", registry.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;
    use crate::explorers::ExplorerUrls;
    use periphery_utils::SupportedChainId;

    #[test]
    fn accepts_populated_key_table() {
        let env = Env::default();
        let registry = ExplorerRegistry::from_env(&env);
        let keys = ExplorerApiKeys::from_env(&env);
        assert_eq!(verify_config_integrity(&registry, &keys), Ok(()));
    }

    #[test]
    fn rejects_each_missing_entry() {
        let env = Env::default();
        let registry = ExplorerRegistry::from_env(&env);
        let full = ExplorerApiKeys::from_env(&env);

        for missing in registry.chains() {
            let keys = ExplorerApiKeys::from_entries(
                registry
                    .chains()
                    .filter(|c| *c != missing)
                    .map(|c| (c, full.get(c).unwrap_or_default().to_string())),
            );
            let err = verify_config_integrity(&registry, &keys).unwrap_err();
            assert_eq!(err, IntegrityError::MissingApiKey { chain: missing });
            assert!(err.to_string().contains(missing.name()));
        }
    }

    #[test]
    fn empty_key_counts_as_present() {
        let registry = ExplorerRegistry::from_entries([(
            SupportedChainId::InkSepolia,
            ExplorerUrls::new("https://a/api", "https://a"),
        )]);
        let keys = ExplorerApiKeys::from_entries([(SupportedChainId::InkSepolia, "")]);
        assert!(verify_config_integrity(&registry, &keys).is_ok());
    }
}
