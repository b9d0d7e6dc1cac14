//! Long-running dispatch session: one URL per input line, hot reload
//! between lines.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{broadcast, mpsc};

use crate::config::ConfigUpdate;
use crate::dispatch::Dispatcher;

/// Dispatch URLs read from `input` until it closes or `shutdown` fires.
///
/// Blank lines are skipped. Reload results arriving on `updates` are
/// installed as they come. Returns the number of URLs dispatched.
pub async fn run<R>(
    dispatcher: &Dispatcher,
    input: R,
    mut updates: Option<mpsc::UnboundedReceiver<ConfigUpdate>>,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let url = line.trim();
                    if url.is_empty() {
                        continue;
                    }
                    dispatcher.handle_url(url);
                    handled += 1;
                }
                None => {
                    tracing::info!(handled, "Input closed");
                    break;
                }
            },
            Some(update) = next_update(&mut updates) => {
                // Failures are logged and recorded by the dispatcher.
                let _ = dispatcher.apply(update);
            }
            _ = shutdown.recv() => {
                tracing::info!(handled, "Dispatch session stopping");
                break;
            }
        }
    }

    Ok(handled)
}

async fn next_update(
    updates: &mut Option<mpsc::UnboundedReceiver<ConfigUpdate>>,
) -> Option<ConfigUpdate> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
