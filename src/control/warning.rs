use std::fmt;

use chrono::{DateTime, Utc};

use crate::http::date::format_http_date;

/// An HTTP `Warning` code (RFC 7234 §5.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Warning {
    /// The response served is stale.
    ResponseIsStale = 110,
    /// A stale response is served because revalidation failed.
    RevalidationFailed = 111,
    /// The cache is intentionally disconnected from the network.
    DisconnectedOperation = 112,
    /// The freshness lifetime was chosen heuristically.
    HeuristicExpiration = 113,
    MiscellaneousWarning = 199,
    TransformationApplied = 214,
    MiscellaneousPersistentWarning = 299,
}

impl Warning {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::ResponseIsStale => "Response is Stale",
            Self::RevalidationFailed => "Revalidation Failed",
            Self::DisconnectedOperation => "Disconnected Operation",
            Self::HeuristicExpiration => "Heuristic Expiration",
            Self::MiscellaneousWarning => "Miscellaneous Warning",
            Self::TransformationApplied => "Transformation Applied",
            Self::MiscellaneousPersistentWarning => "Miscellaneous Persistent Warning",
        }
    }

    /// Renders a `Warning` header value: `code agent "text" date`.
    ///
    /// An empty `agent` is written as `-`; quotes and backslashes in the
    /// agent are escaped.
    ///
    /// ```
    /// use chrono::DateTime;
    /// use httpcache::control::Warning;
    ///
    /// let date = DateTime::from_timestamp(784111777, 0).unwrap();
    /// assert_eq!(
    ///     Warning::HeuristicExpiration.header_value("", date),
    ///     r#"113 - "Heuristic Expiration" Sun, 06 Nov 1994 08:49:37 GMT"#
    /// );
    /// ```
    pub fn header_value(self, agent: &str, date: DateTime<Utc>) -> String {
        let agent = if agent.is_empty() {
            "-".to_owned()
        } else {
            let escaped = agent.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        };
        format!(
            "{} {agent} \"{}\" {}",
            self.code(),
            self.text(),
            format_http_date(date)
        )
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
