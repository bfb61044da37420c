//! HTTP-date parsing and formatting (RFC 7231 §7.1.1.1).
//!
//! Recipients must accept all three historical formats; senders only emit
//! IMF-fixdate.

use chrono::{DateTime, NaiveDateTime, Utc};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Parses an HTTP-date in IMF-fixdate, RFC 850, or asctime format.
///
/// ```
/// use httpcache::http::date::{format_http_date, parse_http_date};
///
/// let t = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
/// assert_eq!(t.timestamp(), 784111777);
/// assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(t));
/// assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(t));
/// assert_eq!(format_http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Formats an instant as an IMF-fixdate.
pub fn format_http_date(instant: DateTime<Utc>) -> String {
    instant.format(IMF_FIXDATE).to_string()
}

/// Interprets an `Expires` value.
///
/// Invalid values, notably `0` and `-1`, mean "already expired" (RFC 7234
/// §5.3) and map to the Unix epoch rather than to an error.
pub fn parse_expires(value: &str) -> DateTime<Utc> {
    parse_http_date(value).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage() {
        assert!(parse_http_date("yesterday").is_none());
        assert!(parse_http_date("").is_none());
    }

    #[test]
    fn expires_zero_is_in_the_past() {
        assert_eq!(parse_expires("0"), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(parse_expires("-1"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn format_round_trips() {
        let t = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(parse_http_date(&format_http_date(t)), Some(t));
    }
}
