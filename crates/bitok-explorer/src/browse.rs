use std::sync::Arc;

use bitok_core::explorer::{Route, Ticket};
use bitok_core::Explorer;
use eyre::WrapErr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;

use crate::render::{JsonRenderer, TextRenderer};

/// Interactive browsing: one hash route per stdin line.
///
/// Each line starts a navigation without waiting for the previous one. A page
/// whose navigation was overtaken by a later line is dropped, so only the
/// latest request's output is printed.
pub async fn run(explorer: Arc<Explorer>, json: bool) -> eyre::Result<()> {
    browse(
        explorer,
        json,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

async fn browse<R, W>(explorer: Arc<Explorer>, json: bool, input: R, mut output: W) -> eyre::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut inflight: JoinSet<Option<String>> = JoinSet::new();
    let mut reading = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if reading => {
                match line.wrap_err("read stdin")? {
                    Some(line) => {
                        let line = line.trim();
                        if matches!(line, "quit" | "exit") {
                            reading = false;
                        } else if !line.is_empty() {
                            // The ticket is taken here, in input order.
                            let ticket = explorer.begin();
                            let route = Route::parse(line);
                            let explorer = explorer.clone();
                            inflight.spawn(async move {
                                navigate(&explorer, ticket, &route, json).await
                            });
                        }
                    }
                    None => reading = false,
                }
            }
            Some(done) = inflight.join_next(), if !inflight.is_empty() => {
                match done {
                    Ok(Some(page)) => {
                        if let Err(err) = write_page(&mut output, &page).await {
                            tracing::warn!(error = %err, "stdout closed, stopping");
                            return Err(err).wrap_err("write page to stdout");
                        }
                    }
                    Ok(None) => {}
                    Err(err) => tracing::warn!(error = %err, "navigation task failed"),
                }
            }
            else => break,
        }
    }
    Ok(())
}

async fn navigate(explorer: &Explorer, ticket: Ticket, route: &Route, json: bool) -> Option<String> {
    if json {
        explorer
            .navigate_with(ticket, route, &JsonRenderer)
            .await
            .map(|page| page.to_pretty())
    } else {
        explorer
            .navigate_with(ticket, route, &TextRenderer::now())
            .await
    }
}

async fn write_page<W: AsyncWrite + Unpin>(output: &mut W, page: &str) -> std::io::Result<()> {
    output.write_all(page.trim_end().as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::num::NonZeroUsize;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;

    use async_trait::async_trait;
    use bitok_core::rpc::NodeRpc;
    use bitok_core::{CachedHeightIndex, CoreError, LinearScan, NetworkStatus, Resolver, RpcError};
    use serde_json::{json, Value};

    use super::*;

    /// Answers `getrawmempool` slowly and `getinfo` immediately.
    struct SlowMempool;

    #[async_trait]
    impl NodeRpc for SlowMempool {
        async fn call(&self, method: &str, _params: Vec<Value>) -> Result<Value, CoreError> {
            match method {
                "getinfo" => Ok(json!({ "blocks": 3, "difficulty": 1.0 })),
                "getrawmempool" => {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Ok(json!([]))
                }
                _ => Err(CoreError::Rpc(RpcError::Node {
                    code: Some(-32601),
                    message: "Method not found".into(),
                })),
            }
        }
    }

    fn explorer() -> Arc<Explorer> {
        let rpc: Arc<dyn NodeRpc> = Arc::new(SlowMempool);
        let status = Arc::new(NetworkStatus::new(rpc.clone()));
        let heights = Arc::new(CachedHeightIndex::new(
            LinearScan::new(rpc.clone()),
            NonZeroUsize::new(4).unwrap(),
        ));
        let resolver = Arc::new(Resolver::new(rpc, status, heights));
        Arc::new(Explorer::new(resolver, 20))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn only_the_latest_line_is_printed() {
        let input: &[u8] = b"#/mempool\n#/home\n";
        let mut output = Vec::new();
        browse(explorer(), true, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("\"page\": \"home\""), "{printed}");
        assert!(!printed.contains("mempool"), "{printed}");
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let input: &[u8] = b"#/home\nquit\n#/mempool\n";
        let mut output = Vec::new();
        browse(explorer(), false, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with("Bitok Explorer"), "{printed}");
        assert!(!printed.contains("Mempool:"));
    }

    struct ClosedPipe;

    impl AsyncWrite for ClosedPipe {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn closed_stdout_stops_the_loop() {
        let input: &[u8] = b"#/home\n#/home\n#/home\n";
        let err = browse(explorer(), false, input, ClosedPipe)
            .await
            .expect_err("writing must fail");
        assert!(format!("{err:#}").contains("write page to stdout"));
    }
}
