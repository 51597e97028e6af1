use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use periphery_rs::deployment::{ContractName, DeployRequest, DeployedContract};
use periphery_rs::{ContractDeployer, DeployError};
use periphery_utils::SupportedChainId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::mpsc::{self, Sender},
    task::JoinHandle,
};
use tracing::{error, info};

pub const JOURNAL_FILE: &str = "journal.log";
pub const ADDRESSES_FILE: &str = "deployed_addresses.json";
/// Subdirectory of a chain directory holding dry-run output.
pub const DRY_RUN_DIR: &str = "dry-run";

#[derive(Debug, Clone)]
pub enum JournalStep {
    Started {
        key: &'static str,
        contract: ContractName,
    },
    Deployed {
        key: &'static str,
        contract: ContractName,
        address: Address,
        tx_hash: Option<TxHash>,
    },
    Failed {
        key: &'static str,
        contract: ContractName,
        error: String,
    },
}

#[derive(Debug)]
struct JournalEvent {
    timestamp: DateTime<Utc>,
    step: JournalStep,
}

/// Append-only record of one network's deployment under `<root>/chain-<id>/`.
///
/// Dry runs write under `<root>/chain-<id>/dry-run/` so predicted addresses never
/// touch the record of real deployments.
pub struct DeploymentJournal {
    chain: SupportedChainId,
    dry_run: bool,
    event_sender: Sender<JournalEvent>,
    writer: JoinHandle<Result<()>>,
    dir: PathBuf,
}

impl DeploymentJournal {
    pub async fn open(root: &Path, chain: SupportedChainId) -> Result<Self> {
        Self::open_in(chain_dir(root, chain), chain, false).await
    }

    pub async fn open_dry_run(root: &Path, chain: SupportedChainId) -> Result<Self> {
        Self::open_in(chain_dir(root, chain).join(DRY_RUN_DIR), chain, true).await
    }

    async fn open_in(dir: PathBuf, chain: SupportedChainId, dry_run: bool) -> Result<Self> {
        fs::create_dir_all(&dir)
            .await
            .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;

        let (event_sender, event_receiver) = mpsc::channel(100);
        let writer = tokio::spawn(Self::log_writer(
            event_receiver,
            dir.join(JOURNAL_FILE),
            chain,
            dry_run,
        ));

        Ok(Self {
            chain,
            dry_run,
            event_sender,
            writer,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn log_step(&self, step: JournalStep) -> Result<()> {
        let event = JournalEvent {
            timestamp: Utc::now(),
            step,
        };

        self.event_sender
            .send(event)
            .await
            .map_err(|e| eyre::eyre!("Failed to send journal event: {}", e))?;

        Ok(())
    }

    /// Merges `addresses` into the chain's `deployed_addresses.json`.
    pub async fn record_addresses(&self, addresses: &BTreeMap<String, Address>) -> Result<PathBuf> {
        let path = self.dir.join(ADDRESSES_FILE);

        let mut merged: BTreeMap<String, Address> = match fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .wrap_err_with(|| format!("Failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e).wrap_err_with(|| format!("Failed to read {}", path.display())),
        };
        merged.extend(addresses.iter().map(|(k, v)| (k.clone(), *v)));

        let json = serde_json::to_string_pretty(&merged)?;
        fs::write(&path, json + "\n").await?;
        info!(
            "Recorded {} addresses for {} in {}",
            addresses.len(),
            self.chain,
            path.display()
        );
        Ok(path)
    }

    /// Stops accepting events and waits until everything queued is on disk.
    pub async fn close(self) -> Result<()> {
        drop(self.event_sender);
        self.writer
            .await
            .map_err(|e| eyre::eyre!("Journal writer task failed: {}", e))?
    }

    async fn log_writer(
        mut receiver: mpsc::Receiver<JournalEvent>,
        file_path: PathBuf,
        chain: SupportedChainId,
        dry_run: bool,
    ) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;

        while let Some(event) = receiver.recv().await {
            let line = format_line(&event, chain, dry_run);
            if let Err(e) = file.write_all(line.as_bytes()).await {
                error!("Failed to write journal entry: {}", e);
                return Err(e.into());
            }
        }

        file.flush().await?;
        Ok(())
    }
}

fn chain_dir(root: &Path, chain: SupportedChainId) -> PathBuf {
    root.join(format!("chain-{}", chain.id()))
}

fn format_line(event: &JournalEvent, chain: SupportedChainId, dry_run: bool) -> String {
    let prefix = format!(
        "{}{}, Chain: {} ({})",
        if dry_run { "[dry-run] " } else { "" },
        event.timestamp.format("%Y-%m-%d %H:%M:%S"),
        chain,
        chain.id()
    );

    match &event.step {
        JournalStep::Started { key, contract } => {
            format!("{prefix}, Step: {key}, Contract: {contract}, Status: Started\n")
        }
        JournalStep::Deployed {
            key,
            contract,
            address,
            tx_hash,
        } => {
            let tx = tx_hash.map_or_else(|| "none".to_string(), |h| h.to_string());
            format!(
                "{prefix}, Step: {key}, Contract: {contract}, Status: Deployed, Address: {address}, Tx: {tx}\n"
            )
        }
        JournalStep::Failed {
            key,
            contract,
            error,
        } => {
            format!("{prefix}, Step: {key}, Contract: {contract}, Status: Failed, Error: {error}\n")
        }
    }
}

/// Wraps a deployer so every step is journaled before and after it runs.
pub struct JournaledDeployer<'a, D> {
    inner: D,
    journal: &'a DeploymentJournal,
}

impl<'a, D> JournaledDeployer<'a, D> {
    pub fn new(inner: D, journal: &'a DeploymentJournal) -> Self {
        Self { inner, journal }
    }

    async fn record(&self, step: JournalStep) {
        if let Err(e) = self.journal.log_step(step).await {
            error!("{}", e);
        }
    }
}

impl<D: ContractDeployer> ContractDeployer for JournaledDeployer<'_, D> {
    async fn deploy(&mut self, request: &DeployRequest) -> Result<DeployedContract, DeployError> {
        self.record(JournalStep::Started {
            key: request.key,
            contract: request.contract,
        })
        .await;

        match self.inner.deploy(request).await {
            Ok(deployed) => {
                self.record(JournalStep::Deployed {
                    key: deployed.key,
                    contract: deployed.contract,
                    address: deployed.address,
                    tx_hash: deployed.tx_hash,
                })
                .await;
                Ok(deployed)
            }
            Err(e) => {
                self.record(JournalStep::Failed {
                    key: request.key,
                    contract: request.contract,
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }
}
