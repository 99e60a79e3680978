//! Chain economics (`ChainParams`) and node operational settings (`NodeConfig`).

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Sub-units per native coin (`1 coin = 10^8 sub-units`).
pub const UNIT: i64 = 100_000_000;
/// Flat per-transaction amount burned back to the unclaimed pool.
pub const BURN_FEE: i64 = 1_000_000;
/// Base58Check version byte for addresses.
pub const ADDRESS_VERSION: u8 = 23;
/// Total sub-units that will ever exist.
pub const SUPPLY_CAP: i64 = 100_000_000_000 * UNIT;
/// Target spacing between blocks, in seconds.
pub const TARGET_BLOCK_SEC: i64 = 30;
/// Horizon over which the unclaimed pool is asymptotically drained.
pub const EMISSION_YEARS: i64 = 8;
/// Magic network identifier carried by gossip handshakes.
pub const NETWORK_ID: u32 = 0xA117E;

/// Lower/upper bound on `difficulty_bits`, enforced by the difficulty controller.
pub const MIN_DIFFICULTY_BITS: u32 = 8;
pub const MAX_DIFFICULTY_BITS: u32 = 31;
/// Difficulty bits a freshly initialised chain starts mining at.
pub const INITIAL_DIFFICULTY_BITS: u32 = 18;

/// The fixed economic constants from the data model, bundled so the ledger
/// and block engine don't each hardcode them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainParams {
    pub network: String,
    pub network_id: u32,
    pub supply_cap: i64,
    pub burn_fee: i64,
    pub target_block_time_sec: i64,
    pub emission_years: i64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            network_id: NETWORK_ID,
            supply_cap: SUPPLY_CAP,
            burn_fee: BURN_FEE,
            target_block_time_sec: TARGET_BLOCK_SEC,
            emission_years: EMISSION_YEARS,
        }
    }
}

/// CLI surface, one subcommand per §6 of the design. `--datadir` is shared by
/// every command; the economic constants in `ChainParams` are not
/// CLI-configurable (they are a network-identity property, not a node knob).
#[derive(Parser, Debug)]
#[command(name = "axle-chain", about = "A small proof-of-work blockchain node")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Create layout, genesis block, and a default key.
    Init {
        #[arg(long)]
        datadir: PathBuf,
    },
    /// Generate and persist a named keypair.
    CreateAddress {
        #[arg(long)]
        datadir: PathBuf,
        #[arg(long)]
        name: String,
    },
    /// Build, sign, mine, and accept a TRANSFER block of one transaction.
    Send {
        #[arg(long)]
        datadir: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
    },
    /// Build, sign, mine, and accept a MINT_NFT block of one transaction.
    MintNft {
        #[arg(long)]
        datadir: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        symbol: String,
        #[arg(long, default_value = "")]
        uri: String,
    },
    /// Mine an empty block to the default address.
    Mine {
        #[arg(long)]
        datadir: PathBuf,
    },
    /// Launch the gossip and status network surfaces.
    Start {
        #[arg(long)]
        datadir: PathBuf,
        #[arg(long)]
        p2p: Option<String>,
        #[arg(long)]
        rpc: Option<String>,
        #[arg(long)]
        bootstrap: Option<String>,
    },
}

/// Operational node settings: everything the CLI front end needs that isn't
/// part of chain consensus. Optionally overlaid from `<datadir>/config.toml`
/// (file read only if present; CLI flags always win).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub datadir: PathBuf,
    pub p2p_addr: String,
    pub rpc_addr: String,
    pub bootstrap: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            datadir: PathBuf::from("./data"),
            p2p_addr: "0.0.0.0:9735".to_string(),
            rpc_addr: "127.0.0.1:9736".to_string(),
            bootstrap: None,
        }
    }
}

impl NodeConfig {
    /// Loads `<datadir>/config.toml` if present and overlays `overrides`
    /// (non-default fields supplied on the CLI) on top of it.
    pub fn load(datadir: &PathBuf, overrides: NodeConfigOverrides) -> Result<Self, ConfigLoadError> {
        let mut cfg = NodeConfig {
            datadir: datadir.clone(),
            ..NodeConfig::default()
        };

        let config_path = datadir.join("config.toml");
        if config_path.exists() {
            let built = config::Config::builder()
                .add_source(config::File::from(config_path).required(false))
                .build()
                .map_err(|e| ConfigLoadError(e.to_string()))?;
            if let Ok(file_cfg) = built.try_deserialize::<NodeConfig>() {
                cfg = NodeConfig { datadir: datadir.clone(), ..file_cfg };
            }
        }

        if let Some(p2p) = overrides.p2p_addr {
            cfg.p2p_addr = p2p;
        }
        if let Some(rpc) = overrides.rpc_addr {
            cfg.rpc_addr = rpc;
        }
        if overrides.bootstrap.is_some() {
            cfg.bootstrap = overrides.bootstrap;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Default)]
pub struct NodeConfigOverrides {
    pub p2p_addr: Option<String>,
    pub rpc_addr: Option<String>,
    pub bootstrap: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to load node config: {0}")]
pub struct ConfigLoadError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_params_defaults_match_data_model() {
        let p = ChainParams::default();
        assert_eq!(p.supply_cap, 100_000_000_000 * UNIT);
        assert_eq!(p.burn_fee, 1_000_000);
        assert_eq!(p.target_block_time_sec, 30);
        assert_eq!(p.emission_years, 8);
        assert_eq!(p.network_id, 0xA117E);
    }

    #[test]
    fn node_config_loads_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = NodeConfig::load(&dir.path().to_path_buf(), NodeConfigOverrides::default()).unwrap();
        assert_eq!(cfg.p2p_addr, "0.0.0.0:9735");
    }

    #[test]
    fn cli_overrides_win_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = NodeConfigOverrides {
            p2p_addr: Some("127.0.0.1:1".to_string()),
            rpc_addr: None,
            bootstrap: Some("127.0.0.1:2".to_string()),
        };
        let cfg = NodeConfig::load(&dir.path().to_path_buf(), overrides).unwrap();
        assert_eq!(cfg.p2p_addr, "127.0.0.1:1");
        assert_eq!(cfg.bootstrap.as_deref(), Some("127.0.0.1:2"));
    }
}
