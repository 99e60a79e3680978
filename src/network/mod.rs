//! Thin network adapters (§4.7): a gossip transport for blocks and a small
//! request/response status surface. Neither performs authentication,
//! back-pressure, or reconnection — each inbound connection gets a bounded
//! read, a deadline, and its own task, while `Chain` acceptance (the
//! writer, §5) stays single-threaded behind a shared lock.

mod framing;
pub mod gossip;
pub mod status;

pub use gossip::{run_gossip_server, send_block, GossipMessage};
pub use status::{run_status_server, StatusRequest, StatusResponse};
