//! A newline-delimited reader that bounds memory use by its own accumulated
//! buffer, not by the length of whatever line eventually arrives.
//!
//! `tokio::io::AsyncBufReadExt::lines`/`read_line` grow their internal
//! buffer until a `\n` shows up (or the caller's timeout fires), so a peer
//! that sends megabytes with no newline is only bounded by the timeout, not
//! by a size limit. This reads in small fixed chunks instead and checks the
//! accumulated length after every chunk, so an oversized line is rejected
//! before it is ever fully buffered.

use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK_SIZE: usize = 4096;

/// Reads one newline-delimited line from `reader`. `carry` holds bytes read
/// past a previous line's newline (or a partial line) across calls, so the
/// same buffer must be threaded through repeated calls on one connection.
/// Returns `Ok(None)` on a clean EOF with nothing pending, and errors once
/// `carry` would exceed `max_len` bytes without having found a newline.
pub(super) async fn read_bounded_line<R: AsyncRead + Unpin>(
    reader: &mut R,
    carry: &mut Vec<u8>,
    max_len: usize,
) -> std::io::Result<Option<String>> {
    loop {
        if let Some(pos) = carry.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = carry.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
        if carry.len() > max_len {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("line exceeds {max_len} bytes without a newline"),
            ));
        }
        let mut chunk = [0u8; CHUNK_SIZE];
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None); // EOF: any partial line left in `carry` is discarded
        }
        carry.extend_from_slice(&chunk[..n]);
    }
}
