//! Timeout parsing for the command line.

use std::time::Duration;

use anyhow::Context;

/// Parse a timeout such as `300`, `300s`, `30m` or `1h` into seconds.
/// A bare number is seconds.
pub fn parse_duration_to_secs(s: &str) -> anyhow::Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let (digits, unit_secs) = match s.as_bytes()[s.len() - 1] {
        b'h' => (&s[..s.len() - 1], 3600),
        b'm' => (&s[..s.len() - 1], 60),
        b's' => (&s[..s.len() - 1], 1),
        _ => (s, 1),
    };

    let count: u64 = digits
        .parse()
        .with_context(|| format!("Invalid duration value: {s}"))?;
    count
        .checked_mul(unit_secs)
        .with_context(|| format!("Duration too large: {s}"))
}

/// clap value parser for timeouts; zero is rejected.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    match parse_duration_to_secs(s) {
        Ok(0) => Err("Duration must be greater than zero".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(format!("{e:#}")),
    }
}
