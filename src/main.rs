//! Avatar Studio demo driver
//!
//! Reads one command per line from stdin and prints studio events as JSON.

use avatar_studio::runtime::{DirectorySink, DownloadSink, TracingSink};
use avatar_studio::script;
use avatar_studio::{StudioBuilder, StudioConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays a clean event stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "avatar_studio=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = StudioConfig::from_env();
    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(session_id = %session_id, ?config, "Starting avatar studio");

    let sink: Arc<dyn DownloadSink> = match &config.download_dir {
        Some(dir) => Arc::new(DirectorySink::new(dir)),
        None => Arc::new(TracingSink),
    };

    let (handle, runtime_task) = StudioBuilder::new(config.context(session_id), sink)
        .picker(config.picker())
        .spawn();

    let mut events = handle.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::error!(error = %e, "Failed to serialize event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let command = match script::parse_line(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                tracing::warn!(line = line_no, error = %e, "Skipping bad command");
                continue;
            }
        };

        if let Err(e) = script::execute(&handle, command).await {
            tracing::warn!(line = line_no, error = %e, "Command failed");
        }
        // `state` must reflect every earlier command
        handle.settle().await?;
    }

    tracing::info!("Script finished");
    drop(handle);
    runtime_task.await?;
    printer.await?;
    Ok(())
}
