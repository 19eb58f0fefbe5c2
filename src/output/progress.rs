//! Progress bar utilities for a monitoring pass.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar over the rows of one pass.
///
/// Draws on stderr so the event stream on stdout stays clean.
pub fn create_row_progress(total_rows: usize, pass: u32, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total_rows == 0 {
        return None;
    }

    let pb = ProgressBar::new(total_rows as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} rows - pass {pass} ({{eta}})"
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    Some(pb)
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Increment a progress bar.
pub fn inc_progress(pb: Option<&ProgressBar>) {
    if let Some(pb) = pb {
        pb.inc(1);
    }
}
