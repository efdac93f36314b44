//! Terminal progress rendering for the CLI

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::fetch::DownloadProgress;
use crate::importer::ImportProgress;

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Progress bar for the archive download
pub fn create_download_progress(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(bar_style(
        "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    ));
    pb.set_message(message.to_string());
    pb
}

/// Feed a download progress event into `pb`
pub fn update_download(pb: &ProgressBar, progress: DownloadProgress) {
    if let Some(total) = progress.total {
        if pb.length() != Some(total) {
            pb.set_length(total);
        }
    }
    pb.set_position(progress.downloaded);
}

/// One bar per entity, created on the entity's first event
pub struct ImportProgressBars {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ImportProgressBars {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    pub fn update(&self, progress: &ImportProgress) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };

        let pb = bars.entry(progress.entity_id.clone()).or_insert_with(|| {
            let pb = self
                .multi
                .add(ProgressBar::new(progress.records_total_estimate));
            pb.set_style(bar_style(
                "{prefix:>20.bold} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            ));
            pb.set_prefix(progress.entity_id.clone());
            pb
        });

        // The total is an estimate; never let the position run past it.
        if progress.records_imported > pb.length().unwrap_or(0) {
            pb.set_length(progress.records_imported);
        }
        pb.set_position(progress.records_imported);
    }

    /// Mark every bar finished at its current position
    pub fn finish(&self) {
        if let Ok(bars) = self.bars.lock() {
            for pb in bars.values() {
                pb.finish();
            }
        }
    }
}

impl Default for ImportProgressBars {
    fn default() -> Self {
        Self::new()
    }
}

/// Format bytes into a human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(31 * 1024 * 1024), "31.00 MB");
    }

    #[test]
    fn test_bars_follow_events() {
        let bars = ImportProgressBars::new();
        for imported in [1000, 2000, 2500] {
            bars.update(&ImportProgress {
                entity_id: "Food".to_string(),
                records_imported: imported,
                records_total_estimate: 2400,
            });
        }

        let guard = bars.bars.lock().unwrap();
        let pb = guard.get("Food").unwrap();
        assert_eq!(pb.position(), 2500);
        assert_eq!(pb.length(), Some(2500));
    }

    #[test]
    fn test_download_length_learned_from_event() {
        let pb = create_download_progress("sr24upd.zip");
        update_download(&pb, DownloadProgress { downloaded: 10, total: Some(100) });
        assert_eq!(pb.length(), Some(100));
        assert_eq!(pb.position(), 10);
    }
}
