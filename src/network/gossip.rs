//! Block-gossip transport: on inbound connect the peer is greeted with the
//! local tip height; broadcast blocks are relayed as newline-delimited JSON
//! and applied through `Chain::accept_block` as they arrive.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;

use crate::blockchain::{Block, Chain};
use crate::database::Store;
use crate::network::framing::read_bounded_line;

/// Read side imposes a deadline and a maximum line length so one slow or
/// hostile peer cannot pin a connection task open indefinitely (§9's
/// redesign direction for the reference adapters).
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_LINE_BYTES: usize = 1 << 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GossipMessage {
    Hello { height: u64 },
    Block { data: Block },
}

/// Runs the gossip acceptor until the process exits. Each connection gets
/// its own task; `Chain` mutation is serialised behind the shared write
/// lock, matching the single-logical-writer model (§5).
pub async fn run_gossip_server<S>(bind_addr: &str, chain: Arc<RwLock<Chain<S>>>) -> std::io::Result<()>
where
    S: Store + Send + Sync + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;
    log::info!("gossip listening on {bind_addr}");
    loop {
        let (socket, peer) = listener.accept().await?;
        log::info!("gossip peer connected: {peer}");
        let chain = Arc::clone(&chain);
        tokio::spawn(async move {
            if let Err(e) = handle_gossip_connection(socket, chain).await {
                log::warn!("gossip connection with {peer} ended: {e}");
            }
        });
    }
}

async fn handle_gossip_connection<S>(mut socket: TcpStream, chain: Arc<RwLock<Chain<S>>>) -> std::io::Result<()>
where
    S: Store + Send + Sync + 'static,
{
    let height = chain.read().await.tip_height();
    let hello = serde_json::to_string(&GossipMessage::Hello { height }).unwrap_or_default();
    socket.write_all(hello.as_bytes()).await?;
    socket.write_all(b"\n").await?;

    let (mut reader, _writer) = socket.into_split();
    let mut carry = Vec::new();

    loop {
        let line = match tokio::time::timeout(READ_TIMEOUT, read_bounded_line(&mut reader, &mut carry, MAX_LINE_BYTES)).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                log::warn!("gossip read error, dropping connection: {e}");
                break;
            }
            Err(_) => break, // idle timeout: close quietly
        };
        match serde_json::from_str::<GossipMessage>(&line) {
            Ok(GossipMessage::Block { data }) => {
                let height = data.header.height;
                let mut guard = chain.write().await;
                match guard.accept_block(data) {
                    Ok(()) => log::info!("accepted gossiped block at height {height}"),
                    Err(e) => log::warn!("rejected gossiped block at height {height}: {e}"),
                }
            }
            Ok(GossipMessage::Hello { height }) => {
                log::debug!("peer hello at height {height}");
            }
            Err(e) => log::warn!("malformed gossip message: {e}"),
        }
    }
    Ok(())
}

/// Connects to `peer_addr` and sends one `Block` gossip message,
/// newline-terminated. Best-effort: a failed dial is logged, not fatal.
pub async fn send_block(peer_addr: &str, block: &Block) -> std::io::Result<()> {
    let mut socket = TcpStream::connect(peer_addr).await?;
    let msg = GossipMessage::Block { data: block.clone() };
    let line = serde_json::to_string(&msg).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    socket.write_all(line.as_bytes()).await?;
    socket.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_serialises_with_tagged_type_field() {
        let msg = GossipMessage::Hello { height: 3 };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"hello\""));
        assert!(json.contains("\"height\":3"));
    }

    #[test]
    fn block_message_roundtrips() {
        let block = Block::genesis(1_700_000_000, 18);
        let msg = GossipMessage::Block { data: block.clone() };
        let json = serde_json::to_string(&msg).unwrap();
        let back: GossipMessage = serde_json::from_str(&json).unwrap();
        match back {
            GossipMessage::Block { data } => assert_eq!(data.hash, block.hash),
            _ => panic!("expected a block message"),
        }
    }
}
