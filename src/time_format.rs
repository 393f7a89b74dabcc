//! Localised display of UTC timestamps

use chrono::NaiveDateTime;
use chrono_tz::Tz;

use crate::models::NOT_AVAILABLE;

/// The only accepted input layout
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// 12-hour clock, date, zone abbreviation, e.g. `05:43 AM 2024-06-02 IST`
const OUTPUT_FORMAT: &str = "%I:%M %p %Y-%m-%d %Z";

/// Render a `YYYY-MM-DDTHH:MM:SSZ` timestamp in `tz`.
///
/// `None` and the "N/A" sentinel come back as "N/A". Anything that does not
/// parse is returned unchanged.
#[must_use]
pub fn format_utc_timestamp(input: Option<&str>, tz: Tz) -> String {
    let Some(raw) = input else {
        return NOT_AVAILABLE.to_string();
    };
    if raw == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_string();
    }

    match NaiveDateTime::parse_from_str(raw, INPUT_FORMAT) {
        Ok(naive) => naive
            .and_utc()
            .with_timezone(&tz)
            .format(OUTPUT_FORMAT)
            .to_string(),
        Err(e) => {
            tracing::debug!("Leaving timestamp '{}' as-is: {}", raw, e);
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;
    use rstest::rstest;

    #[rstest]
    #[case("2024-06-02T00:13:00Z", "05:43 AM 2024-06-02 IST")]
    #[case("2024-06-02T13:05:00Z", "06:35 PM 2024-06-02 IST")]
    #[case("2024-12-31T20:00:00Z", "01:30 AM 2025-01-01 IST")]
    fn test_formats_in_kolkata(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_utc_timestamp(Some(input), Kolkata), expected);
    }

    #[rstest]
    #[case("")]
    #[case("garbage")]
    #[case("2024-06-02 00:13:00")]
    #[case("2024-06-02T00:13:00+05:30")]
    #[case("2024-06-02T00:13:00.000Z")]
    #[case("2024-13-45T99:99:99Z")]
    fn test_unparseable_input_passes_through(#[case] input: &str) {
        assert_eq!(format_utc_timestamp(Some(input), Kolkata), input);
    }

    #[test]
    fn test_sentinel_and_missing() {
        assert_eq!(format_utc_timestamp(None, Kolkata), "N/A");
        assert_eq!(format_utc_timestamp(Some("N/A"), Kolkata), "N/A");
    }

    #[test]
    fn test_other_timezone() {
        let formatted = format_utc_timestamp(Some("2024-01-15T12:00:00Z"), chrono_tz::UTC);
        assert_eq!(formatted, "12:00 PM 2024-01-15 UTC");
    }
}
