//! CLI command handlers (§6): key management and the six subcommands.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::blockchain::Chain;
use crate::config::{ChainParams, Cli, Command, NodeConfig, NodeConfigOverrides, UNIT};
use crate::consensus::MiningState;
use crate::crypto::{address_from_pubkey, hex, keygen, unhex};
use crate::database::FileStore;
use crate::error::BlockchainError;
use crate::network::{run_gossip_server, run_status_server};
use crate::tx::{sign_tx, NftMeta, TxType, UnsignedTx};

/// Dispatches a parsed `Cli` to its handler. Returns an error on any
/// operational failure; `main` turns that into a nonzero exit code.
pub fn run(cli: Cli) -> Result<(), BlockchainError> {
    match cli.command {
        Command::Init { datadir } => cmd_init(&datadir),
        Command::CreateAddress { datadir, name } => cmd_create_address(&datadir, &name).map(|_| ()),
        Command::Send { datadir, from, to, amount } => cmd_send(&datadir, &from, &to, amount),
        Command::MintNft { datadir, from, name, symbol, uri } => {
            cmd_mint_nft(&datadir, &from, &name, &symbol, &uri)
        }
        Command::Mine { datadir } => cmd_mine(&datadir),
        Command::Start { datadir, p2p, rpc, bootstrap } => {
            let config = NodeConfig::load(&datadir, NodeConfigOverrides { p2p_addr: p2p, rpc_addr: rpc, bootstrap })
                .map_err(|e| BlockchainError::Config(e.to_string()))?;
            let rt = tokio::runtime::Runtime::new().map_err(BlockchainError::Io)?;
            rt.block_on(cmd_start(config))
        }
    }
}

fn keys_dir(datadir: &Path) -> PathBuf {
    datadir.join("keys")
}

fn write_key(datadir: &Path, name: &str, pubkey: &[u8], privkey: &[u8], address: &str) -> Result<(), BlockchainError> {
    let dir = keys_dir(datadir);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(format!("{name}.priv")), hex(privkey))?;
    fs::write(dir.join(format!("{name}.pub")), hex(pubkey))?;
    fs::write(dir.join(format!("{name}.address")), address)?;
    Ok(())
}

/// Loads the private key and derived address for a named key (`--from`
/// always names a key file, never a raw address — `--to` is the raw
/// address field instead, matching the reference CLI).
fn read_key(datadir: &Path, name: &str) -> Result<(Vec<u8>, String), BlockchainError> {
    let dir = keys_dir(datadir);
    let priv_path = dir.join(format!("{name}.priv"));
    let priv_hex = fs::read_to_string(&priv_path)
        .map_err(|_| BlockchainError::Key(format!("no key named '{name}' in {}", dir.display())))?;
    let address = fs::read_to_string(dir.join(format!("{name}.address")))?;
    let priv_key = unhex(priv_hex.trim()).map_err(|e| BlockchainError::Key(e.to_string()))?;
    Ok((priv_key, address.trim().to_string()))
}

fn cmd_init(datadir: &Path) -> Result<(), BlockchainError> {
    let params = ChainParams::default();
    let store = FileStore::new(datadir);
    let chain = Chain::open(store, params)?;
    let (pubkey, privkey) = keygen();
    let address = address_from_pubkey(&pubkey);
    write_key(datadir, "default", &pubkey, &privkey, &address)?;
    log::info!("initialised chain at {} (tip height {})", datadir.display(), chain.tip_height());
    println!("Initialized datadir at {}", datadir.display());
    println!("default address: {address}");
    Ok(())
}

fn cmd_create_address(datadir: &Path, name: &str) -> Result<String, BlockchainError> {
    let (pubkey, privkey) = keygen();
    let address = address_from_pubkey(&pubkey);
    write_key(datadir, name, &pubkey, &privkey, &address)?;
    log::info!("created key '{name}' with address {address}");
    println!("{address}");
    Ok(address)
}

/// Builds, signs, mines, and accepts a single-transaction block, the shape
/// shared by `send` and `mint-nft`.
fn mine_and_accept_tx(datadir: &Path, miner: &str, tx: crate::tx::SignedTx) -> Result<(), BlockchainError> {
    let store = FileStore::new(datadir);
    let mut chain = Chain::open(store, ChainParams::default())?;

    let mut block = chain.build_block(miner, vec![tx]);
    let mut mining_state = MiningState::new();
    while !chain.mine(&mut block, &mut mining_state, 100_000) {}

    let height = block.header.height;
    let hash = block.hash.clone();
    chain.accept_block(block)?;
    log::info!("accepted block {height} hash={hash}");
    println!("Mined and accepted block {height} hash={hash}");
    Ok(())
}

fn cmd_send(datadir: &Path, from: &str, to: &str, amount: f64) -> Result<(), BlockchainError> {
    let (priv_key, from_addr) = read_key(datadir, from)?;
    let store = FileStore::new(datadir);
    let chain = Chain::open(store, ChainParams::default())?;
    let nonce = chain.state().accounts.get(&from_addr).map(|a| a.nonce).unwrap_or(0);

    let amount_sub_units = (amount * UNIT as f64).round() as i64;
    let tx = sign_tx(
        UnsignedTx {
            tx_type: TxType::Transfer,
            from: from_addr.clone(),
            to: to.to_string(),
            amount: amount_sub_units,
            nonce,
            token_id: 0,
            meta: NftMeta::default(),
        },
        &priv_key,
    )
    .map_err(BlockchainError::Validation)?;

    mine_and_accept_tx(datadir, &from_addr, tx)
}

fn cmd_mint_nft(datadir: &Path, from: &str, name: &str, symbol: &str, uri: &str) -> Result<(), BlockchainError> {
    let (priv_key, from_addr) = read_key(datadir, from)?;
    let store = FileStore::new(datadir);
    let chain = Chain::open(store, ChainParams::default())?;
    let nonce = chain.state().accounts.get(&from_addr).map(|a| a.nonce).unwrap_or(0);

    let tx = sign_tx(
        UnsignedTx {
            tx_type: TxType::MintNft,
            from: from_addr.clone(),
            to: from_addr.clone(),
            amount: 0,
            nonce,
            token_id: 0,
            meta: NftMeta { name: name.to_string(), symbol: symbol.to_string(), uri: uri.to_string() },
        },
        &priv_key,
    )
    .map_err(BlockchainError::Validation)?;

    mine_and_accept_tx(datadir, &from_addr, tx)
}

fn cmd_mine(datadir: &Path) -> Result<(), BlockchainError> {
    let (_priv_key, address) = read_key(datadir, "default")?;
    let store = FileStore::new(datadir);
    let mut chain = Chain::open(store, ChainParams::default())?;

    let mut block = chain.build_block(&address, vec![]);
    let mut mining_state = MiningState::new();
    while !chain.mine(&mut block, &mut mining_state, 100_000) {}

    let height = block.header.height;
    let hash = block.hash.clone();
    chain.accept_block(block)?;
    log::info!("mined empty block {height} hash={hash}");
    println!("Mined and accepted block {height} hash={hash}");
    Ok(())
}

async fn cmd_start(config: NodeConfig) -> Result<(), BlockchainError> {
    let store = FileStore::new(&config.datadir);
    let chain = Chain::open(store, ChainParams::default())?;
    let chain = Arc::new(RwLock::new(chain));

    if let Some(bootstrap) = &config.bootstrap {
        log::info!("bootstrap peer configured: {bootstrap}");
    }

    let gossip_addr = config.p2p_addr.clone();
    let gossip_chain = Arc::clone(&chain);
    let gossip = tokio::spawn(async move {
        if let Err(e) = run_gossip_server(&gossip_addr, gossip_chain).await {
            log::error!("gossip server stopped: {e}");
        }
    });

    let status_addr = config.rpc_addr.clone();
    let status_chain = Arc::clone(&chain);
    let status = tokio::spawn(async move {
        if let Err(e) = run_status_server(&status_addr, status_chain).await {
            log::error!("status server stopped: {e}");
        }
    });

    log::info!("node running. press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await.map_err(BlockchainError::Io)?;
    log::info!("shutdown signal received, exiting");
    gossip.abort();
    status.abort();
    Ok(())
}
