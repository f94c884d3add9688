//! Duration parsing utilities.

use anyhow::Context;
use std::time::Duration;

/// Parse a duration string like "1h", "30m", "300s", "300".
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let secs = if let Some(num_str) = s.strip_suffix('h') {
        let hours: u64 = num_str
            .parse()
            .with_context(|| format!("Invalid hours value: {num_str}"))?;
        hours
            .checked_mul(3600)
            .with_context(|| format!("Duration too large: {s}"))?
    } else if let Some(num_str) = s.strip_suffix('m') {
        let minutes: u64 = num_str
            .parse()
            .with_context(|| format!("Invalid minutes value: {num_str}"))?;
        minutes
            .checked_mul(60)
            .with_context(|| format!("Duration too large: {s}"))?
    } else if let Some(num_str) = s.strip_suffix('s') {
        num_str
            .parse()
            .with_context(|| format!("Invalid seconds value: {num_str}"))?
    } else {
        s.parse::<u64>()
            .with_context(|| format!("Invalid duration value: {s}"))?
    };

    if secs == 0 {
        anyhow::bail!("Duration must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
