//! End-of-run summary lines.

use tilegen::coord::TileCoord;
use tilegen::traversal::{CategoryReport, ReconcileStatus, TraversalStats};

/// Formats the per-category results, plus an overall line when `overall`.
pub fn summary_lines(reports: &[CategoryReport], overall: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut totals = TraversalStats::default();

    for report in reports {
        lines.push(format!(
            "{} tiles - Processed: {}, Skipped: {}",
            report.category, report.stats.processed, report.stats.skipped
        ));
        if let ReconcileStatus::Exhausted { attempts, tiles } = &report.reconcile {
            let keys: Vec<String> = tiles.iter().map(TileCoord::key).collect();
            lines.push(format!(
                "{} tiles - {} still failing after {} attempts: {}",
                report.category,
                tiles.len(),
                attempts,
                keys.join(", ")
            ));
        }
        totals += report.stats;
    }

    if overall {
        lines.push(format!(
            "Overall - Total tiles: {}, Processed: {}, Skipped: {}",
            totals.total(),
            totals.processed,
            totals.skipped
        ));
        if totals.total() > 0 {
            let percent = totals.skipped as f64 / totals.total() as f64 * 100.0;
            lines.push(format!(
                "Efficiency - {:.1}% of tiles were skipped (already existed)",
                percent
            ));
        }
    }

    lines
}
