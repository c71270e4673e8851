//! TCP transport: newline-delimited JSON, one task per connection.

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::dispatch::Dispatcher;
use crate::error::ServerResult;
use crate::protocol::{Request, Response};

/// Accept connections until `shutdown` resolves. Connections already being
/// served keep running on their own tasks.
pub async fn serve<F>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    max_line_bytes: usize,
    shutdown: F,
) -> ServerResult<()>
where
    F: Future<Output = ()>,
{
    let local = listener.local_addr()?;
    tracing::info!(address = %local, "listening");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    tracing::info!(%peer, "client connected");
                    if let Err(e) = handle_connection(stream, &dispatcher, max_line_bytes).await {
                        tracing::warn!(%peer, error = %e, "connection error");
                    }
                    tracing::info!(%peer, "client disconnected");
                });
            }
        }
    }
    Ok(())
}

/// Answer requests on one stream in order until the peer closes it or sends
/// a line longer than `max_line_bytes`.
pub async fn handle_connection<S>(
    stream: S,
    dispatcher: &Dispatcher,
    max_line_bytes: usize,
) -> ServerResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    // room for the content plus a CRLF terminator
    let limit = max_line_bytes as u64 + 2;

    loop {
        buf.clear();
        let n = (&mut reader).take(limit).read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        if content_len(&buf) > max_line_bytes {
            tracing::warn!(max_line_bytes, "request line too long, closing connection");
            let response = Response::error(format!(
                "Request line exceeds {max_line_bytes} bytes"
            ));
            write_response(&mut writer, &response).await?;
            return Ok(());
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(e) => {
                write_response(&mut writer, &Response::error(format!("Invalid UTF-8: {e}")))
                    .await?;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => dispatcher.handle(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "malformed request line");
                Response::error(format!("Invalid request: {e}"))
            }
        };
        write_response(&mut writer, &response).await?;
    }
}

/// Length of a line without its `\n` or `\r\n` terminator.
fn content_len(line: &[u8]) -> usize {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line).len()
}

async fn write_response<W>(writer: &mut W, response: &Response) -> ServerResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = response.to_line();
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
