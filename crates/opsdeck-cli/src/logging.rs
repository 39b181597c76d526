//! Tracing setup for the `opsdeck` binary.
//!
//! Logs go to a daily rolling file so they never interleave with the shell's
//! own output. The filter defaults to `opsdeck=info` and is read from
//! `OPSDECK_LOG` when set.

use anyhow::{Context, Result};
use opsdeck_application::{ActivityEvent, ActivityLayer};
use opsdeck_infrastructure::OpsdeckPaths;
use std::fs;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "OPSDECK_LOG";
const DEFAULT_FILTER: &str = "opsdeck=info";
const LOG_FILE_PREFIX: &str = "opsdeck.log";

/// Keeps the file writer flushing until dropped at the end of `main`.
pub struct Logging {
    _file_guard: WorkerGuard,
    /// Events captured by the activity layer. Only present when capture was
    /// requested; nothing else would ever drain the channel.
    pub activity: Option<mpsc::UnboundedReceiver<ActivityEvent>>,
}

/// Builds the activity layer only for commands that read it.
fn activity_capture(
    capture: bool,
) -> (Option<ActivityLayer>, Option<mpsc::UnboundedReceiver<ActivityEvent>>) {
    if capture {
        let (layer, rx) = ActivityLayer::channel();
        (Some(layer), Some(rx))
    } else {
        (None, None)
    }
}

pub fn init(paths: &OpsdeckPaths, capture_activity: bool) -> Result<Logging> {
    let logs_dir = paths.logs_dir()?;
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, file_guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let (activity_layer, activity) = activity_capture(capture_activity);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(activity_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(Logging {
        _file_guard: file_guard,
        activity,
    })
}
