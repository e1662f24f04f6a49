//! Progress reporting

use crate::pagination::ReadProgress;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Format a byte count with a binary unit, e.g. `1.5 MiB`
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Whether a tick is worth reporting.
///
/// Nothing is reported before the first object is read, nor once the known
/// total has been reached.
pub(crate) fn should_report(objects_read: u64, total: u64) -> bool {
    objects_read != 0 && objects_read != total
}

/// Log the progress of a table every `period` until `stop` fires.
///
/// `total` is the expected number of objects, zero when unknown.
pub fn spawn_progress_reporter(
    table: String,
    progress: Arc<ReadProgress>,
    total: u64,
    period: Duration,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = stop.cancelled() => return,
                _ = ticks.tick() => {}
            }

            let records = progress.objects_read();
            if !should_report(records, total) {
                continue;
            }

            let bytes = format_bytes(progress.bytes_read());
            if total > 0 {
                let percent = records as f64 * 100.0 / total as f64;
                info!(%table, records, total, %bytes, "export in progress ({percent:.0}%)");
            } else {
                info!(%table, records, %bytes, "export in progress");
            }
        }
    })
}
