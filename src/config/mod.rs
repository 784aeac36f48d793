//! Command-line value parsers.

pub mod duration;

pub use duration::parse_duration;

/// Parse an IANA time zone name such as `UTC` or `America/Los_Angeles`.
pub fn parse_timezone(s: &str) -> Result<chrono_tz::Tz, String> {
    s.trim()
        .parse::<chrono_tz::Tz>()
        .map_err(|_| format!("Unknown time zone: {s}"))
}
