//! Compiled contract artifacts and library linking.
//!
//! Artifacts are the JSON files the Solidity build emits under
//! `artifacts/<source path>/<Contract>.json`. Unlinked bytecode carries 20-byte
//! placeholders whose byte offsets are listed in `linkReferences`.

use alloy::primitives::{Address, Bytes};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::deployment::ContractName;
use crate::error::ArtifactError;

const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkReference {
    pub start: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub abi: serde_json::Value,
    pub bytecode: String,
    /// source file -> library name -> placeholder positions
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>,
}

impl Artifact {
    pub fn from_json(path: &Path, contents: &str) -> Result<Self, ArtifactError> {
        serde_json::from_str(contents).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Library names the bytecode must be linked against.
    pub fn required_libraries(&self) -> Vec<&str> {
        self.link_references
            .values()
            .flat_map(|libs| libs.keys().map(String::as_str))
            .collect()
    }

    /// Creation bytecode with every placeholder replaced by its library address.
    ///
    /// `libraries` is keyed by library name or by `source:name`.
    pub fn linked_bytecode(
        &self,
        libraries: &BTreeMap<String, Address>,
    ) -> Result<Bytes, ArtifactError> {
        let hex_code = self
            .bytecode
            .strip_prefix("0x")
            .unwrap_or(&self.bytecode);
        if !hex_code.is_ascii() {
            return Err(ArtifactError::Bytecode {
                contract: self.contract_name.clone(),
                reason: "bytecode contains non-ASCII characters".to_string(),
            });
        }
        // Hex digits, two per byte. Placeholders are not hex, so linking happens before decoding.
        let mut code = hex_code.as_bytes().to_vec();

        for (source, libs) in &self.link_references {
            for (name, references) in libs {
                let address = libraries
                    .get(name)
                    .or_else(|| libraries.get(&format!("{source}:{name}")))
                    .ok_or_else(|| ArtifactError::UnlinkedLibrary {
                        contract: self.contract_name.clone(),
                        library: name.clone(),
                    })?;
                let replacement = hex::encode(address.as_slice());

                for reference in references {
                    let range = reference.start.checked_mul(2).zip(
                        reference
                            .start
                            .checked_add(ADDRESS_LEN)
                            .and_then(|end| end.checked_mul(2)),
                    );
                    match range {
                        Some((from, to)) if reference.length == ADDRESS_LEN && to <= code.len() => {
                            code[from..to].copy_from_slice(replacement.as_bytes());
                        }
                        _ => {
                            return Err(ArtifactError::LinkOutOfRange {
                                contract: self.contract_name.clone(),
                                library: name.clone(),
                                start: reference.start,
                            })
                        }
                    }
                }
                debug!(
                    "Linked {} into {} at {} positions",
                    name,
                    self.contract_name,
                    references.len()
                );
            }
        }

        let bytes = hex::decode(&code).map_err(|e| ArtifactError::Bytecode {
            contract: self.contract_name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Bytes::from(bytes))
    }

    /// Linked creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn deploy_code(
        &self,
        libraries: &BTreeMap<String, Address>,
        encoded_args: &[u8],
    ) -> Result<Bytes, ArtifactError> {
        let mut code = self.linked_bytecode(libraries)?.to_vec();
        if code.is_empty() {
            return Err(ArtifactError::Bytecode {
                contract: self.contract_name.clone(),
                reason: "empty creation bytecode".to_string(),
            });
        }
        code.extend_from_slice(encoded_args);
        Ok(Bytes::from(code))
    }
}

/// Reads artifacts from a build output directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, contract: ContractName) -> PathBuf {
        self.root
            .join(contract.source_path())
            .join(format!("{}.json", contract.artifact_name()))
    }

    pub fn load(&self, contract: ContractName) -> Result<Artifact, ArtifactError> {
        let path = self.path_for(contract);
        let contents = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        Artifact::from_json(&path, &contents)
    }
}
