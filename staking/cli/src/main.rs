use {
    flwr_staking_client::{
        client,
        config::{Idl, StakingConfig},
        reward_mint,
        rpc::{RpcStakingClient, StakingRpc},
    },
    log::{info, warn},
    solana_cli_config::{Config, CONFIG_FILE},
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_sdk::{commitment_config::CommitmentConfig, signature::read_keypair_file},
    std::{env, error::Error, path::PathBuf, str::FromStr},
};

// interface definition of the deployed program, looked up at run time
const IDL_FILE: &str = "staking.json";

fn idl_search_path() -> Vec<PathBuf> {
    let mut dirs = vec![];
    if let Ok(dir) = env::current_dir() {
        dirs.push(dir);
    }
    if let Some(dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
    {
        dirs.push(dir);
    }
    dirs
}

fn load_cli_config() -> Config {
    match CONFIG_FILE.as_ref() {
        Some(path) => Config::load(path).unwrap_or_else(|err| {
            warn!("could not load {path}: {err}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    solana_logger::setup_with_default("solana=info,flwr_staking=info");

    let cli_config = load_cli_config();
    let payer = read_keypair_file(&cli_config.keypair_path)
        .map_err(|err| format!("reading keypair {}: {err}", cli_config.keypair_path))?;
    let commitment = CommitmentConfig::from_str(&cli_config.commitment)?;

    let idl = Idl::from_search_path(IDL_FILE, idl_search_path())?;
    let config = StakingConfig::from_idl(&idl, reward_mint::id())?;
    info!("ProgramId: {}", config.program_id);
    info!("GlobalAuthority: {}", config.global_authority);
    info!("RewardVault: {}", config.reward_vault);

    let rpc = RpcStakingClient::new(
        RpcClient::new_with_commitment(cli_config.json_rpc_url.clone(), commitment),
        payer,
    );

    let signature = client::initialize(&rpc, &config, &rpc.payer()).await?;
    info!("txHash = {signature}");

    match client::get_global_state(&rpc, &config).await? {
        Some(global) => info!(
            "GlobalPool admin {}, {} stakers, {} staked",
            global.admin, global.count, global.staked_amount
        ),
        None => warn!("global pool {} not found", config.global_authority),
    }

    Ok(())
}
