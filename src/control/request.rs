use std::fmt;

use super::{
    DeltaSeconds, DirectiveError, DirectiveSink, DirectiveWriter, MAX_AGE, MAX_STALE, MIN_FRESH,
    NO_CACHE, NO_STORE, NO_TRANSFORM, ONLY_IF_CACHED, PRIVATE, parse_into,
};

/// Directives a client may send in a request `Cache-Control` header
/// (RFC 7234 §5.2.1).
///
/// # Examples
///
/// ```
/// use httpcache::control::RequestDirectives;
///
/// let cd = RequestDirectives::parse("no-cache, max-age=30, foo=bar").unwrap();
/// assert!(cd.no_cache());
/// assert_eq!(cd.max_age().get(), Some(30));
/// assert!(!cd.max_stale().is_set());
/// assert_eq!(cd.extensions(), ["foo=bar"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDirectives {
    max_age: DeltaSeconds,
    max_stale: DeltaSeconds,
    min_fresh: DeltaSeconds,
    no_cache: bool,
    no_store: bool,
    no_transform: bool,
    only_if_cached: bool,
    extensions: Vec<String>,
}

impl RequestDirectives {
    /// Parses a request `Cache-Control` value. An empty value yields the
    /// default set (everything unset).
    ///
    /// # Errors
    ///
    /// Fails on a quote mismatch, a numeric directive without a valid value,
    /// or a value on a boolean directive (including `no-cache`).
    pub fn parse(value: &str) -> Result<Self, DirectiveError> {
        let mut cd = Self::default();
        parse_into(value, &mut cd)?;
        Ok(cd)
    }

    /// The client will not accept a response older than this.
    pub fn max_age(&self) -> DeltaSeconds {
        self.max_age
    }

    /// The client will accept a stale response up to this many seconds past expiry.
    pub fn max_stale(&self) -> DeltaSeconds {
        self.max_stale
    }

    /// The client wants a response that stays fresh at least this long.
    pub fn min_fresh(&self) -> DeltaSeconds {
        self.min_fresh
    }

    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    pub fn no_store(&self) -> bool {
        self.no_store
    }

    pub fn no_transform(&self) -> bool {
        self.no_transform
    }

    pub fn only_if_cached(&self) -> bool {
        self.only_if_cached
    }

    /// Unrecognized directives, as `token` or `token=value`, in header order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns `true` when the request asks for a credential-scoped entry
    /// with the `private` extension.
    pub fn is_private(&self) -> bool {
        self.extensions
            .iter()
            .any(|e| e == PRIVATE || e.starts_with("private="))
    }

    /// Returns `true` when a stored response must not be used for this request.
    pub fn forbids_cached_response(&self) -> bool {
        self.no_cache || self.no_store
    }
}

impl DirectiveSink for RequestDirectives {
    fn add_token(&mut self, token: &str) -> Result<(), DirectiveError> {
        match token {
            MAX_AGE => return Err(DirectiveError::DeltaSeconds { directive: MAX_AGE }),
            MAX_STALE => {
                return Err(DirectiveError::DeltaSeconds {
                    directive: MAX_STALE,
                });
            }
            MIN_FRESH => {
                return Err(DirectiveError::DeltaSeconds {
                    directive: MIN_FRESH,
                });
            }
            NO_CACHE => self.no_cache = true,
            NO_STORE => self.no_store = true,
            NO_TRANSFORM => self.no_transform = true,
            ONLY_IF_CACHED => self.only_if_cached = true,
            other => self.extensions.push(other.to_owned()),
        }
        Ok(())
    }

    fn add_pair(&mut self, token: &str, value: &str) -> Result<(), DirectiveError> {
        let slot = match token {
            MAX_AGE => (&mut self.max_age, MAX_AGE),
            MAX_STALE => (&mut self.max_stale, MAX_STALE),
            MIN_FRESH => (&mut self.min_fresh, MIN_FRESH),
            NO_CACHE | NO_STORE | NO_TRANSFORM | ONLY_IF_CACHED => {
                return Err(DirectiveError::NoArgs {
                    directive: no_args_name(token),
                });
            }
            other => {
                self.extensions.push(format!("{other}={value}"));
                return Ok(());
            }
        };

        let (field, directive) = slot;
        *field = DeltaSeconds::parse(value).map_err(|_| DirectiveError::DeltaSeconds { directive })?;
        Ok(())
    }
}

fn no_args_name(token: &str) -> &'static str {
    match token {
        NO_CACHE => NO_CACHE,
        NO_STORE => NO_STORE,
        NO_TRANSFORM => NO_TRANSFORM,
        _ => ONLY_IF_CACHED,
    }
}

/// Canonical form: known directives in a fixed order, then extensions.
impl fmt::Display for RequestDirectives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = DirectiveWriter::new(f);
        w.delta(self.max_age, MAX_AGE)?;
        w.delta(self.max_stale, MAX_STALE)?;
        w.delta(self.min_fresh, MIN_FRESH)?;
        w.flag(self.no_cache, NO_CACHE)?;
        w.flag(self.no_store, NO_STORE)?;
        w.flag(self.no_transform, NO_TRANSFORM)?;
        w.flag(self.only_if_cached, ONLY_IF_CACHED)?;
        w.extensions(&self.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_default() {
        let cd = RequestDirectives::parse("").unwrap();
        assert_eq!(cd, RequestDirectives::default());
        assert_eq!(cd.max_age(), DeltaSeconds::UNSET);
        assert_eq!(cd.max_stale(), DeltaSeconds::UNSET);
        assert_eq!(cd.min_fresh(), DeltaSeconds::UNSET);
    }

    #[test]
    fn no_cache_takes_no_args() {
        assert_eq!(
            RequestDirectives::parse("no-cache=234"),
            Err(DirectiveError::NoArgs { directive: NO_CACHE })
        );
    }

    #[test]
    fn no_store_takes_no_args() {
        assert_eq!(
            RequestDirectives::parse("no-store=,,x"),
            Err(DirectiveError::NoArgs { directive: NO_STORE })
        );
    }

    #[test]
    fn no_transform_takes_no_args() {
        assert_eq!(
            RequestDirectives::parse("no-transform=akx"),
            Err(DirectiveError::NoArgs {
                directive: NO_TRANSFORM
            })
        );
    }

    #[test]
    fn only_if_cached_takes_no_args() {
        assert_eq!(
            RequestDirectives::parse("only-if-cached=no-store"),
            Err(DirectiveError::NoArgs {
                directive: ONLY_IF_CACHED
            })
        );
    }

    #[test]
    fn max_age() {
        let cd = RequestDirectives::parse("max-age=99999").unwrap();
        assert_eq!(cd.max_age(), DeltaSeconds::from_secs(99999));
        assert_eq!(cd.max_stale(), DeltaSeconds::UNSET);
    }

    #[test]
    fn max_stale() {
        let cd = RequestDirectives::parse("max-stale=99999").unwrap();
        assert_eq!(cd.max_stale(), DeltaSeconds::from_secs(99999));
        assert_eq!(cd.max_age(), DeltaSeconds::UNSET);
        assert_eq!(cd.min_fresh(), DeltaSeconds::UNSET);
    }

    #[test]
    fn numeric_directives_require_values() {
        for (input, directive) in [
            ("max-age", MAX_AGE),
            ("max-stale", MAX_STALE),
            ("min-fresh", MIN_FRESH),
        ] {
            assert_eq!(
                RequestDirectives::parse(input),
                Err(DirectiveError::DeltaSeconds { directive })
            );
        }
    }

    #[test]
    fn min_fresh_bad_values() {
        for input in ["min-fresh=a99a", "min-fresh=-1"] {
            assert_eq!(
                RequestDirectives::parse(input),
                Err(DirectiveError::DeltaSeconds {
                    directive: MIN_FRESH
                })
            );
        }
    }

    #[test]
    fn min_fresh_quoted() {
        let cd = RequestDirectives::parse(r#"min-fresh="99999""#).unwrap();
        assert_eq!(cd.min_fresh(), DeltaSeconds::from_secs(99999));
    }

    #[test]
    fn extensions_kept_in_order() {
        let cd = RequestDirectives::parse("min-fresh=99999 foobar=1 cats").unwrap();
        assert_eq!(cd.min_fresh(), DeltaSeconds::from_secs(99999));
        assert_eq!(cd.extensions(), ["foobar=1", "cats"]);
    }

    #[test]
    fn multiple_flags() {
        let cd = RequestDirectives::parse("no-store no-transform").unwrap();
        assert!(cd.no_store());
        assert!(cd.no_transform());
        assert!(!cd.only_if_cached());
        assert!(cd.extensions().is_empty());

        let cd = RequestDirectives::parse(",no-cache,only-if-cached").unwrap();
        assert!(cd.no_cache());
        assert!(cd.only_if_cached());
        assert!(!cd.no_store());
        assert!(cd.forbids_cached_response());
    }

    #[test]
    fn private_extension() {
        assert!(RequestDirectives::parse("private").unwrap().is_private());
        assert!(!RequestDirectives::parse("privately").unwrap().is_private());
    }

    #[test]
    fn canonical_round_trip() {
        let inputs = [
            "",
            "max-age=5, no-cache",
            r#"only-if-cached x y="a b" z="" max-stale=1 min-fresh=2"#,
            "no-store,no-transform,private,zz=1",
        ];
        for input in inputs {
            let cd = RequestDirectives::parse(input).unwrap();
            let again = RequestDirectives::parse(&cd.to_string()).unwrap();
            assert_eq!(cd, again, "round trip of {input:?} via {cd}");
        }
    }

    #[test]
    fn extensions_led_by_equals_round_trip() {
        for input in ["==x", r#"a="=x""#, "=", "=a=b", r#"=="a b""#] {
            let cd = RequestDirectives::parse(input).unwrap();
            let rendered = cd.to_string();
            let again = RequestDirectives::parse(&rendered).unwrap();
            assert_eq!(cd.extensions(), again.extensions(), "{input:?} rendered as {rendered:?}");
        }

        let cd = RequestDirectives::parse("==x").unwrap();
        assert_eq!(cd.extensions(), ["==x"]);
        assert_eq!(cd.to_string(), "==x");
    }
}
