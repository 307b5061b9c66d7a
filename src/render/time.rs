use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::*;
use std::fmt::Write;

pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d - %H:%M:%S %Z";

/// Turns a timestamp into display text for summary lines and profiles.
///
pub trait TimeFormatter: Send + Sync {
    fn format_time(&self, stamp: &DateTime<Utc>) -> String;
}

/// Formats timestamps with a strftime pattern in a fixed UTC offset.
///
#[derive(Clone, Debug)]
pub struct StrftimeFormatter {
    format: String,
    offset: FixedOffset,
}

impl StrftimeFormatter {
    pub fn new(format: &str, utc_offset_minutes: i32) -> Self {
        let offset = match utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
        {
            Some(offset) => offset,
            None => {
                warn!(
                    "UTC offset of {} minutes is out of range; using UTC",
                    utc_offset_minutes
                );
                Utc.fix()
            }
        };
        StrftimeFormatter {
            format: format.to_owned(),
            offset,
        }
    }
}

impl Default for StrftimeFormatter {
    fn default() -> Self {
        StrftimeFormatter::new(DEFAULT_TIME_FORMAT, 0)
    }
}

impl TimeFormatter for StrftimeFormatter {
    fn format_time(&self, stamp: &DateTime<Utc>) -> String {
        let local = stamp.with_timezone(&self.offset);
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.format)).is_err() {
            warn!("Invalid time format {:?}; falling back to RFC 3339", self.format);
            return local.to_rfc3339();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap()
    }

    #[test]
    fn test_default_format() {
        let formatter = StrftimeFormatter::default();
        assert_eq!(formatter.format_time(&stamp()), "2018-10-10 - 20:19:24 +00:00");
    }

    #[test]
    fn test_offset_applied() {
        let formatter = StrftimeFormatter::new("%Y-%m-%d %H:%M", -300);
        assert_eq!(formatter.format_time(&stamp()), "2018-10-10 15:19");
    }

    #[test]
    fn test_out_of_range_offset_uses_utc() {
        let formatter = StrftimeFormatter::new("%H:%M", 100_000);
        assert_eq!(formatter.format_time(&stamp()), "20:19");
    }

    #[test]
    fn test_invalid_format_does_not_panic() {
        let formatter = StrftimeFormatter::new("%Y %", 0);
        assert_eq!(formatter.format_time(&stamp()), "2018-10-10T20:19:24+00:00");
    }
}
