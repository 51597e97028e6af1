// Copyright (c) 2025 Merge Layers Inc.
//
// This source code is licensed under the Business Source License 1.1
// (the "License"); you may not use this file except in compliance with the
// License. You may obtain a copy of the License at
//
//     https://github.com/malda-protocol/malda-zk-coprocessor/blob/main/LICENSE-BSL
//
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Args, Parser, Subcommand};
use deployer::app::{self, DeployOptions};
use eyre::{eyre, Result, WrapErr};
use periphery_rs::artifacts::ArtifactStore;
use periphery_rs::constants::DEFAULT_NETWORK;
use periphery_rs::{AlloyDeployer, DryRunDeployer, Env};
use periphery_utils::SupportedChainId;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Periphery contract deployer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Env file to load instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Base log level; RUST_LOG directives are applied on top
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported networks
    Networks,
    /// Print the resolved configuration with secrets redacted
    Config,
    /// Check that every custom explorer has an API key entry
    Check,
    /// Deploy the periphery contracts
    Deploy(DeployArgs),
}

#[derive(Args)]
struct DeployArgs {
    /// Network name or chain id
    #[arg(long, default_value = DEFAULT_NETWORK)]
    network: SupportedChainId,

    /// Build output directory with the contract artifacts
    #[arg(long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// TOML file with pool factory / wrapped native overrides
    #[arg(long)]
    misc_info: Option<PathBuf>,

    #[arg(long, default_value = "deployments")]
    deployments_dir: PathBuf,

    /// Predict addresses without sending transactions
    #[arg(long)]
    dry_run: bool,
}

impl From<DeployArgs> for DeployOptions {
    fn from(args: DeployArgs) -> Self {
        Self {
            network: args.network,
            artifacts: args.artifacts,
            misc_info: args.misc_info,
            deployments_dir: args.deployments_dir,
            dry_run: args.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(cli.log_level.into())
                .add_directive("deployer=debug".parse()?),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .init();

    let env = app::load_env(cli.env_file.as_deref())?;

    match cli.command {
        Commands::Networks => {
            for row in app::network_rows() {
                println!("{row}");
            }
        }
        Commands::Config => {
            let config = app::load_config(&env)?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
        Commands::Check => {
            let count = app::check(&env)?;
            println!("OK: {count} custom explorers have API key entries");
        }
        Commands::Deploy(args) => deploy(&env, args.into()).await?,
    }

    Ok(())
}

async fn deploy(env: &Env, options: DeployOptions) -> Result<()> {
    let config = app::load_config(env)?;
    let endpoint = config
        .network(options.network)
        .ok_or_else(|| eyre!("Network {} is not configured", options.network))?;
    let misc = app::load_misc_info(options.misc_info.as_deref())?;
    let artifacts = ArtifactStore::new(&options.artifacts);

    let deployment = if options.dry_run {
        let deployer = endpoint
            .accounts
            .signers()?
            .first()
            .map(|signer| signer.address())
            .ok_or_else(|| eyre!("No deployer account for {}", options.network))?;
        info!("Dry run on {} as {}", options.network, deployer);

        let dry_run = DryRunDeployer::new(deployer, 0).with_artifacts(artifacts);
        app::deploy_with(
            &config,
            options.network,
            &misc,
            &options.deployments_dir,
            dry_run,
            true,
        )
        .await?
    } else {
        let deployer = AlloyDeployer::connect(endpoint, artifacts)
            .await
            .wrap_err_with(|| format!("Failed to connect to {}", options.network))?;
        app::deploy_with(
            &config,
            options.network,
            &misc,
            &options.deployments_dir,
            deployer,
            false,
        )
        .await?
    };

    println!("{}", serde_json::to_string_pretty(&deployment)?);
    Ok(())
}
