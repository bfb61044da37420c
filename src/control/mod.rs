//! `Cache-Control` directive parsing (RFC 7234 §5.2).
//!
//! [`RequestDirectives::parse`] and [`ResponseDirectives::parse`] turn a raw
//! header value into a typed, immutable directive set. Both grammars share
//! one scanner:
//!
//! - leading whitespace and commas are skipped;
//! - a directive name is a run of token characters, lower-cased;
//! - `name=value` takes either a quoted-string or a bare value that ends at
//!   whitespace (or at a comma, for directives that do not take a
//!   field-name list), with one trailing comma stripped.
//!
//! A parse is all-or-nothing: a recognized directive with a malformed value
//! fails the whole header. Unrecognized directives never fail and are kept,
//! in order, as extensions.

use thiserror::Error;

mod cursor;
mod delta;
mod fields;
mod request;
mod response;
mod warning;

use cursor::Cursor;

pub use delta::DeltaSeconds;
pub use fields::FieldNames;
pub use request::RequestDirectives;
pub use response::ResponseDirectives;
pub use warning::Warning;

pub const NO_CACHE: &str = "no-cache";
pub const NO_STORE: &str = "no-store";
pub const NO_TRANSFORM: &str = "no-transform";
pub const ONLY_IF_CACHED: &str = "only-if-cached";
pub const MAX_AGE: &str = "max-age";
pub const MAX_STALE: &str = "max-stale";
pub const MIN_FRESH: &str = "min-fresh";
pub const MUST_REVALIDATE: &str = "must-revalidate";
pub const PUBLIC: &str = "public";
pub const PRIVATE: &str = "private";
pub const PROXY_REVALIDATE: &str = "proxy-revalidate";
pub const S_MAXAGE: &str = "s-maxage";
pub const IMMUTABLE: &str = "immutable";
pub const STALE_IF_ERROR: &str = "stale-if-error";
pub const STALE_WHILE_REVALIDATE: &str = "stale-while-revalidate";

/// Errors produced while parsing a `Cache-Control` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("missing closing quote")]
    QuoteMismatch,

    #[error("failed to parse delta-seconds in `{directive}`")]
    DeltaSeconds { directive: &'static str },

    #[error("unexpected argument to `{directive}`")]
    NoArgs { directive: &'static str },

    #[error("invalid delta-seconds {value:?}")]
    InvalidDeltaSeconds { value: String },
}

/// Receives the `(token, value?)` pairs found by the scanner.
pub(crate) trait DirectiveSink {
    fn add_token(&mut self, token: &str) -> Result<(), DirectiveError>;
    fn add_pair(&mut self, token: &str, value: &str) -> Result<(), DirectiveError>;
}

/// Returns `true` for `tchar` (RFC 7230 §3.2.6).
pub fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

fn is_token_char(c: char) -> bool {
    c.is_ascii() && is_token_byte(c as u8)
}

fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

// Directives whose value is a comma-separated list of header names.
fn accepts_field_names(token: &str) -> bool {
    token == NO_CACHE || token == PRIVATE
}

pub(crate) fn parse_into<S: DirectiveSink>(value: &str, sink: &mut S) -> Result<(), DirectiveError> {
    let mut cursor = Cursor::new(value);

    loop {
        cursor.skip_while(|c| is_whitespace(c) || c == ',');

        // The first character is always taken, token or not, so the scan
        // makes progress on any input.
        let Some(first) = cursor.bump() else {
            break;
        };
        let mut token = String::from(first);
        token.push_str(cursor.take_while(is_token_char));
        let token = token.to_ascii_lowercase();

        if cursor.peek() == Some('=') && cursor.peek_second().is_some() {
            cursor.bump();
            let value = if cursor.peek() == Some('"') {
                cursor.quoted_string()?
            } else {
                let lists = accepts_field_names(&token);
                let raw = cursor.take_while(|c| !is_whitespace(c) && (lists || c != ','));
                raw.strip_suffix(',').unwrap_or(raw).to_owned()
            };
            sink.add_pair(&token, &value)?;
        } else {
            // A dangling `=` at the end of input carries no value.
            cursor.eat('=');
            sink.add_token(&token)?;
        }
    }

    Ok(())
}

/// Renders an extension so that it parses back to the same string.
pub(crate) fn write_extension(f: &mut std::fmt::Formatter<'_>, extension: &str) -> std::fmt::Result {
    // The scanner always takes the first character into the name, so only a
    // later `=` separates name from value.
    let first_len = extension.chars().next().map_or(0, char::len_utf8);
    let split = extension
        .get(first_len..)
        .and_then(|rest| rest.find('='))
        .map(|i| extension.split_at(first_len + i));

    match split {
        Some((name, value)) => {
            let value = value.strip_prefix('=').unwrap_or(value);
            if value.is_empty() || !value.chars().all(is_token_char) {
                write!(f, "{name}=")?;
                write_quoted(f, value)
            } else {
                f.write_str(extension)
            }
        }
        None => f.write_str(extension),
    }
}

pub(crate) fn write_quoted(f: &mut std::fmt::Formatter<'_>, value: &str) -> std::fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

// Joins rendered directives with ", ".
pub(crate) struct DirectiveWriter<'a, 'b> {
    f: &'a mut std::fmt::Formatter<'b>,
    first: bool,
}

impl<'a, 'b> DirectiveWriter<'a, 'b> {
    pub(crate) fn new(f: &'a mut std::fmt::Formatter<'b>) -> Self {
        Self { f, first: true }
    }

    fn separator(&mut self) -> std::fmt::Result {
        if !self.first {
            self.f.write_str(", ")?;
        }
        self.first = false;
        Ok(())
    }

    pub(crate) fn flag(&mut self, enabled: bool, name: &str) -> std::fmt::Result {
        if enabled {
            self.separator()?;
            self.f.write_str(name)?;
        }
        Ok(())
    }

    pub(crate) fn delta(&mut self, value: DeltaSeconds, name: &str) -> std::fmt::Result {
        if let Some(secs) = value.get() {
            self.separator()?;
            write!(self.f, "{name}={secs}")?;
        }
        Ok(())
    }

    pub(crate) fn fields(&mut self, value: Option<&FieldNames>, name: &str) -> std::fmt::Result {
        if let Some(names) = value {
            self.separator()?;
            self.f.write_str(name)?;
            if !names.is_empty() {
                self.f.write_str("=")?;
                let joined = names.iter().collect::<Vec<_>>().join(",");
                write_quoted(self.f, &joined)?;
            }
        }
        Ok(())
    }

    pub(crate) fn extensions(&mut self, extensions: &[String]) -> std::fmt::Result {
        for extension in extensions {
            self.separator()?;
            write_extension(self.f, extension)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(String, Option<String>)>);

    impl DirectiveSink for Recorder {
        fn add_token(&mut self, token: &str) -> Result<(), DirectiveError> {
            self.0.push((token.to_owned(), None));
            Ok(())
        }

        fn add_pair(&mut self, token: &str, value: &str) -> Result<(), DirectiveError> {
            self.0.push((token.to_owned(), Some(value.to_owned())));
            Ok(())
        }
    }

    fn scan(input: &str) -> Vec<(String, Option<String>)> {
        let mut rec = Recorder::default();
        parse_into(input, &mut rec).unwrap();
        rec.0
    }

    #[test]
    fn tokens_are_lowercased() {
        assert_eq!(scan("No-Store"), vec![("no-store".into(), None)]);
    }

    #[test]
    fn commas_and_whitespace_separate() {
        let got = scan(" ,public,\tmax-age=5 , x");
        assert_eq!(
            got,
            vec![
                ("public".into(), None),
                ("max-age".into(), Some("5".into())),
                ("x".into(), None),
            ]
        );
    }

    #[test]
    fn field_list_values_keep_commas() {
        let got = scan("private=a,b, public");
        assert_eq!(got[0], ("private".into(), Some("a,b".into())));
        assert_eq!(got[1], ("public".into(), None));
    }

    #[test]
    fn dangling_equals_is_a_bare_token() {
        assert_eq!(scan("max-age="), vec![("max-age".into(), None)]);
    }

    #[test]
    fn non_token_start_makes_progress() {
        let got = scan("=;é");
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn token_bytes() {
        assert!(is_token_byte(b'a'));
        assert!(is_token_byte(b'~'));
        assert!(!is_token_byte(b'='));
        assert!(!is_token_byte(b','));
        assert!(!is_token_byte(b'"'));
    }
}
