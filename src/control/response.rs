use std::fmt;

use super::{
    DeltaSeconds, DirectiveError, DirectiveSink, DirectiveWriter, FieldNames, IMMUTABLE, MAX_AGE,
    MUST_REVALIDATE, NO_CACHE, NO_STORE, NO_TRANSFORM, PRIVATE, PROXY_REVALIDATE, PUBLIC,
    S_MAXAGE, STALE_IF_ERROR, STALE_WHILE_REVALIDATE, parse_into,
};

/// Directives an origin may send in a response `Cache-Control` header
/// (RFC 7234 §5.2.2), plus `immutable`, `stale-if-error` and
/// `stale-while-revalidate` (RFC 8246, RFC 5861).
///
/// `no-cache` and `private` are present-or-absent; when present they carry a
/// possibly empty set of header names.
///
/// # Examples
///
/// ```
/// use httpcache::control::ResponseDirectives;
///
/// let cd = ResponseDirectives::parse(r#"private="Set-Cookie,Request-Id" public"#).unwrap();
/// assert!(cd.public());
/// assert!(cd.private_present());
/// assert_eq!(cd.private_fields().unwrap().len(), 2);
/// assert!(cd.extensions().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDirectives {
    must_revalidate: bool,
    no_cache: Option<FieldNames>,
    no_store: bool,
    no_transform: bool,
    public: bool,
    private: Option<FieldNames>,
    proxy_revalidate: bool,
    max_age: DeltaSeconds,
    s_maxage: DeltaSeconds,
    immutable: bool,
    stale_if_error: DeltaSeconds,
    stale_while_revalidate: DeltaSeconds,
    extensions: Vec<String>,
}

impl ResponseDirectives {
    /// Parses a response `Cache-Control` value.
    ///
    /// # Errors
    ///
    /// Fails on a quote mismatch, a numeric directive without a valid value,
    /// or a value on a boolean directive.
    pub fn parse(value: &str) -> Result<Self, DirectiveError> {
        let mut cd = Self::default();
        parse_into(value, &mut cd)?;
        Ok(cd)
    }

    pub fn must_revalidate(&self) -> bool {
        self.must_revalidate
    }

    pub fn no_cache_present(&self) -> bool {
        self.no_cache.is_some()
    }

    /// Header names listed on `no-cache`, or `None` when absent.
    pub fn no_cache_fields(&self) -> Option<&FieldNames> {
        self.no_cache.as_ref()
    }

    pub fn no_store(&self) -> bool {
        self.no_store
    }

    pub fn no_transform(&self) -> bool {
        self.no_transform
    }

    pub fn public(&self) -> bool {
        self.public
    }

    pub fn private_present(&self) -> bool {
        self.private.is_some()
    }

    /// Header names listed on `private`, or `None` when absent.
    pub fn private_fields(&self) -> Option<&FieldNames> {
        self.private.as_ref()
    }

    pub fn proxy_revalidate(&self) -> bool {
        self.proxy_revalidate
    }

    pub fn max_age(&self) -> DeltaSeconds {
        self.max_age
    }

    pub fn s_maxage(&self) -> DeltaSeconds {
        self.s_maxage
    }

    pub fn immutable(&self) -> bool {
        self.immutable
    }

    pub fn stale_if_error(&self) -> DeltaSeconds {
        self.stale_if_error
    }

    pub fn stale_while_revalidate(&self) -> DeltaSeconds {
        self.stale_while_revalidate
    }

    /// Unrecognized directives, as `token` or `token=value`, in header order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn delta_slot(&mut self, token: &str) -> Option<(&mut DeltaSeconds, &'static str)> {
        match token {
            MAX_AGE => Some((&mut self.max_age, MAX_AGE)),
            S_MAXAGE => Some((&mut self.s_maxage, S_MAXAGE)),
            STALE_IF_ERROR => Some((&mut self.stale_if_error, STALE_IF_ERROR)),
            STALE_WHILE_REVALIDATE => Some((
                &mut self.stale_while_revalidate,
                STALE_WHILE_REVALIDATE,
            )),
            _ => None,
        }
    }
}

impl DirectiveSink for ResponseDirectives {
    fn add_token(&mut self, token: &str) -> Result<(), DirectiveError> {
        if let Some((_, directive)) = self.delta_slot(token) {
            return Err(DirectiveError::DeltaSeconds { directive });
        }

        match token {
            MUST_REVALIDATE => self.must_revalidate = true,
            NO_CACHE => {
                self.no_cache.get_or_insert_with(FieldNames::new);
            }
            NO_STORE => self.no_store = true,
            NO_TRANSFORM => self.no_transform = true,
            PUBLIC => self.public = true,
            PRIVATE => {
                self.private.get_or_insert_with(FieldNames::new);
            }
            PROXY_REVALIDATE => self.proxy_revalidate = true,
            IMMUTABLE => self.immutable = true,
            other => self.extensions.push(other.to_owned()),
        }
        Ok(())
    }

    fn add_pair(&mut self, token: &str, value: &str) -> Result<(), DirectiveError> {
        if let Some((field, directive)) = self.delta_slot(token) {
            *field = DeltaSeconds::parse(value)
                .map_err(|_| DirectiveError::DeltaSeconds { directive })?;
            return Ok(());
        }

        let directive = match token {
            NO_CACHE => {
                self.no_cache
                    .get_or_insert_with(FieldNames::new)
                    .extend_from_list(value);
                return Ok(());
            }
            PRIVATE => {
                self.private
                    .get_or_insert_with(FieldNames::new)
                    .extend_from_list(value);
                return Ok(());
            }
            MUST_REVALIDATE => MUST_REVALIDATE,
            NO_STORE => NO_STORE,
            NO_TRANSFORM => NO_TRANSFORM,
            PUBLIC => PUBLIC,
            PROXY_REVALIDATE => PROXY_REVALIDATE,
            IMMUTABLE => IMMUTABLE,
            other => {
                self.extensions.push(format!("{other}={value}"));
                return Ok(());
            }
        };

        Err(DirectiveError::NoArgs { directive })
    }
}

/// Canonical form: known directives in a fixed order, then extensions.
impl fmt::Display for ResponseDirectives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = DirectiveWriter::new(f);
        w.flag(self.must_revalidate, MUST_REVALIDATE)?;
        w.fields(self.no_cache.as_ref(), NO_CACHE)?;
        w.flag(self.no_store, NO_STORE)?;
        w.flag(self.no_transform, NO_TRANSFORM)?;
        w.flag(self.public, PUBLIC)?;
        w.fields(self.private.as_ref(), PRIVATE)?;
        w.flag(self.proxy_revalidate, PROXY_REVALIDATE)?;
        w.delta(self.max_age, MAX_AGE)?;
        w.delta(self.s_maxage, S_MAXAGE)?;
        w.flag(self.immutable, IMMUTABLE)?;
        w.delta(self.stale_if_error, STALE_IF_ERROR)?;
        w.delta(self.stale_while_revalidate, STALE_WHILE_REVALIDATE)?;
        w.extensions(&self.extensions)
    }
}
