use anyhow::{Context, bail};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Parses an interval string such as "90s", "30m", "1h", "24h" or "1h30m".
/// The result must be a positive duration.
pub fn parse_interval(s: &str) -> anyhow::Result<Duration> {
    let mut total = Duration::ZERO;
    let mut rest = s.trim();
    if rest.is_empty() {
        bail!("empty interval");
    }

    while !rest.is_empty() {
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let (value, tail) = rest.split_at(digits);
        let value: u64 = value
            .parse()
            .with_context(|| format!("invalid interval {s:?}"))?;

        let unit = tail.len() - tail.trim_start_matches(|c: char| c.is_ascii_alphabetic()).len();
        let (unit, tail) = tail.split_at(unit);
        total = match unit {
            "ms" => Some(Duration::from_millis(value)),
            "s" => Some(Duration::from_secs(value)),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            "h" => value.checked_mul(60 * 60).map(Duration::from_secs),
            _ => bail!("invalid interval {s:?}: unknown unit {unit:?}"),
        }
        .and_then(|d| total.checked_add(d))
        .with_context(|| format!("interval {s:?} is too large"))?;
        rest = tail;
    }

    if total.is_zero() {
        bail!("interval {s:?} must be positive");
    }
    Ok(total)
}

/// Time until the next multiple of `interval`, measured from the Unix epoch.
/// Recomputed before every sleep so posts stay aligned to clock boundaries
/// instead of drifting from process start.
pub fn until_next_boundary(interval: Duration) -> Duration {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    delay_from(now, interval)
}

/// Truncates `now` to the lower multiple of `interval` and measures to the
/// multiple after it. Always in `(0, interval]`.
fn delay_from(now: Duration, interval: Duration) -> Duration {
    let rem = now.as_nanos() % interval.as_nanos();
    Duration::from_nanos((interval.as_nanos() - rem) as u64)
}
