use colored::Colorize;
use finsite_core::CardState;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn card_spinner(ticker: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {prefix:.bold} {msg}")
            .unwrap(),
    );
    pb.set_prefix(ticker.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// One line describing the card: the latest price, and the last error if the most
/// recent poll failed.
pub fn card_line(state: &CardState) -> String {
    let price = match state.snapshot() {
        Some(s) => format!("{} @ {}", s.price.to_string().green().bold(), s.ts),
        None => "Loading…".dimmed().to_string(),
    };
    match state.error() {
        Some(e) => format!("{price} {}", format!("(error: {e})").red()),
        None => price,
    }
}
