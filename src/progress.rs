//! Console progress bars for the pipeline stages.
//!
//! Purely cosmetic: the bar wraps a stage's work list and ticks as items are
//! consumed. Nothing downstream depends on it.

use indicatif::{ProgressBar, ProgressStyle};

/// Build the percentage bar used by every stage.
///
/// `suffix` is the stage's past-tense verb ("Unpacked", "Decrypted", ...),
/// shown after the percentage like the classic
/// `Progress: |████----| 50.0% Unpacked` line.
pub fn stage_bar(total: u64, suffix: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} |{bar:40}| {percent}% {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("██-"),
    );
    bar.set_prefix("Progress:");
    bar.set_message(suffix.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_bar_counts() {
        let bar = stage_bar(3, "Unpacked");
        assert_eq!(bar.length(), Some(3));
        assert_eq!(bar.position(), 0);

        bar.inc(1);
        assert_eq!(bar.position(), 1);

        bar.finish();
        assert!(bar.is_finished());
    }

    #[test]
    fn test_stage_bar_empty_stage() {
        let bar = stage_bar(0, "Split");
        bar.finish();
        assert!(bar.is_finished());
    }
}
