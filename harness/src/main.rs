#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use alloy::dyn_abi::DynSolValue;
use alloy::hex;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use sale_harness::registry::DEFAULT_REGISTRY_FILE;
use sale_harness::telemetry::init_tracing;
use sale_harness::{load_signer, ChainClient, ContractArtifact, DeploymentConfig, DeploymentRegistry};

#[derive(Debug, Parser)]
#[command(name = "sale-harness", version, about = "Deploy and verify the token sale contract")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log filter directives, overriding RUST_LOG (e.g. info,sale_harness=debug)
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy the contract and record its address
    Deploy(DeployArgs),
    /// Check the recorded deployment and print its constructor arguments
    Verify(VerifyArgs),
    /// Print the ordered constructor arguments without touching the network
    ConstructorArgs(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Deployment TOML file
    #[arg(long, env = "SALE_CONFIG", value_name = "FILE")]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct NetworkArgs {
    #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Directory holding compiled contract artifacts
    #[arg(long, value_name = "DIR", default_value = "artifacts")]
    artifacts: PathBuf,

    #[arg(long, value_name = "FILE", default_value = DEFAULT_REGISTRY_FILE)]
    registry: PathBuf,
}

#[derive(Debug, Args)]
struct DeployArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    network: NetworkArgs,

    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
}

#[derive(Debug, Args)]
struct VerifyArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    network: NetworkArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.json_logs, cli.log_filter.as_deref()) {
        eprintln!("invalid --log-filter: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Deploy(args) => deploy(args).await,
        Command::Verify(args) => verify(args).await,
        Command::ConstructorArgs(args) => constructor_args(args),
    }
}

fn load_inputs(config: &Path, artifacts: &Path) -> Result<(DeploymentConfig, ContractArtifact)> {
    let config = DeploymentConfig::load(config)
        .with_context(|| format!("loading deployment config {}", config.display()))?;
    let artifact_path = ContractArtifact::locate(artifacts, config.profile().contract_name);
    let artifact = ContractArtifact::load(&artifact_path)
        .with_context(|| format!("loading artifact {}", artifact_path.display()))?;
    Ok((config, artifact))
}

async fn deploy(args: DeployArgs) -> Result<()> {
    let signer = load_signer(args.private_key.as_deref()).context("loading deployer key")?;
    let deployer = signer.address();
    let (config, artifact) = load_inputs(&args.config.config, &args.network.artifacts)?;
    let constructor_args = config.constructor_args()?;

    let chain = ChainClient::connect(&args.network.rpc_url, [signer])?;
    let (address, receipt) = chain
        .deploy(deployer, &artifact, &constructor_args)
        .await
        .context("deploying contract")?;

    println!("transaction: {}", receipt.transaction_hash);
    println!("address: {address}");
    DeploymentRegistry::new(&args.network.registry)
        .append(address)
        .context("recording deployment")?;
    Ok(())
}

async fn verify(args: VerifyArgs) -> Result<()> {
    let (config, artifact) = load_inputs(&args.config.config, &args.network.artifacts)?;
    let address = DeploymentRegistry::new(&args.network.registry).current()?;

    let chain = ChainClient::read_only(&args.network.rpc_url)?;
    let code = chain.code_at(address).await?;
    if code.is_empty() {
        bail!("no contract code at {address}");
    }
    let chain_id = chain.chain_id().await?;
    let encoded = artifact.encoded_constructor_args(&config.constructor_args()?)?;
    info!(%address, chain_id, code_len = code.len(), "deployment found");

    println!("address: {address}");
    println!("chain id: {chain_id}");
    println!("constructor arguments: {}", hex::encode(encoded));
    Ok(())
}

fn constructor_args(args: ConfigArgs) -> Result<()> {
    let config = DeploymentConfig::load(&args.config)
        .with_context(|| format!("loading deployment config {}", args.config.display()))?;
    for value in config.constructor_args()? {
        println!("{}", render(&value));
    }
    Ok(())
}

fn render(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::Uint(number, _) => number.to_string(),
        other => format!("{other:?}"),
    }
}
