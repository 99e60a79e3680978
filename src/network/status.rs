//! Status surface: one newline-terminated JSON request per connection,
//! answered with tip metadata or an `unknown method` error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;

use crate::blockchain::Chain;
use crate::database::Store;
use crate::network::framing::read_bounded_line;

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub method: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Tip { height: u64, hash: String },
    Error { error: String },
}

/// Runs the status acceptor until the process exits; one task per
/// connection, read-only against `Chain` (may race with an in-progress
/// acceptance but always observes a whole pre- or post-accept snapshot,
/// since it only ever takes the read lock).
pub async fn run_status_server<S>(bind_addr: &str, chain: Arc<RwLock<Chain<S>>>) -> std::io::Result<()>
where
    S: Store + Send + Sync + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;
    log::info!("status surface listening on {bind_addr}");
    loop {
        let (socket, peer) = listener.accept().await?;
        let chain = Arc::clone(&chain);
        tokio::spawn(async move {
            if let Err(e) = handle_status_connection(socket, chain).await {
                log::debug!("status connection with {peer} ended: {e}");
            }
        });
    }
}

async fn handle_status_connection<S>(mut socket: TcpStream, chain: Arc<RwLock<Chain<S>>>) -> std::io::Result<()>
where
    S: Store + Send + Sync + 'static,
{
    let (mut reader, mut writer) = socket.split();
    let mut carry = Vec::new();

    let read = tokio::time::timeout(READ_TIMEOUT, read_bounded_line(&mut reader, &mut carry, MAX_LINE_BYTES)).await;
    let response = match read {
        Ok(Ok(None)) => return Ok(()), // peer closed without sending anything
        Ok(Ok(Some(line))) => match serde_json::from_str::<StatusRequest>(line.trim()) {
            Ok(req) if req.method == "get_tip" => {
                let guard = chain.read().await;
                StatusResponse::Tip { height: guard.tip_height(), hash: guard.tip_hash().to_string() }
            }
            Ok(_) => StatusResponse::Error { error: "unknown method".into() },
            Err(_) => StatusResponse::Error { error: "bad json".into() },
        },
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
            StatusResponse::Error { error: "request too large".into() }
        }
        Ok(Err(e)) => return Err(e),
        Err(_) => StatusResponse::Error { error: "request timed out".into() },
    };

    let body = serde_json::to_string(&response).unwrap_or_else(|_| "{\"error\":\"internal\"}".to_string());
    writer.write_all(body.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    Ok(())
}
