use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::connection::ConnectionError;
use super::framer::{RawPayload, ResponseFramer};
use crate::error::PrinterError;
use crate::protocol::Command;

const READ_CHUNK: usize = 1024;

/// Sends the mode-switch command and `query`, then reads until the framer
/// has a complete reply.
///
/// `peer` names the other end in errors. The stream is borrowed: closing it
/// stays with whoever opened it.
pub async fn exchange<S>(stream: &mut S, peer: &str, query: &Command) -> Result<RawPayload, PrinterError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for command in [Command::mode_switch(), query.clone()] {
        tracing::debug!(%peer, "sending {}", command);
        stream
            .write_all(command.to_wire().as_bytes())
            .await
            .map_err(|e| ConnectionError::io(peer, e))?;
    }
    stream.flush().await.map_err(|e| ConnectionError::io(peer, e))?;

    let mut framer = ResponseFramer::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| ConnectionError::io(peer, e))?;
        if n == 0 {
            tracing::debug!(%peer, "peer closed the connection");
            return Ok(framer.close()?);
        }
        tracing::trace!(%peer, "received chunk: {:?}", String::from_utf8_lossy(&chunk[..n]));
        if let Some(payload) = framer.feed(&chunk[..n])? {
            return Ok(payload);
        }
    }
}
