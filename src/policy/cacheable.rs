use super::{CacheabilityContext, EvaluationResult, Reason};
use crate::http::StatusCode;

/// Status codes a cache may store without explicit freshness.
const CACHEABLE_BY_DEFAULT: [u16; 11] = [200, 203, 204, 206, 300, 301, 404, 405, 410, 414, 501];

pub fn cacheable_by_default(status: StatusCode) -> bool {
    CACHEABLE_BY_DEFAULT.contains(&status.as_u16())
}

/// Appends every reason the response may not be cached, in rule order.
///
/// Rules are not short-circuited, so a POST with `no-store` reports both
/// the method and the `no-store`. A directive parse failure is carried
/// over as the result's hard error.
pub fn cacheable(ctx: &CacheabilityContext, result: &mut EvaluationResult) {
    let explicit = ctx.has_explicit_freshness();
    let req = ctx.request_directives();
    let resp = ctx.response_directives();
    let shared = !ctx.cache_is_private();

    let method = ctx.request_method();
    if !explicit && !method.is_cacheable_by_default() {
        result
            .reasons
            .push(Reason::for_method(method).unwrap_or(Reason::RequestMethodUnknown));
    }

    if req.no_store() {
        result.reasons.push(Reason::RequestNoStore);
    }
    if resp.no_store() {
        result.reasons.push(Reason::ResponseNoStore);
    }

    if shared && resp.private_present() {
        result.reasons.push(Reason::ResponsePrivate);
    }

    if shared && !ctx.authorized_cacheable() && ctx.request_headers().contains("authorization") {
        let public_and_fresh =
            resp.public() && (resp.max_age().is_set() || resp.s_maxage().is_set());
        if !public_and_fresh {
            result.reasons.push(Reason::RequestAuthorizationHeader);
        }
    }

    if !explicit && !cacheable_by_default(ctx.status()) {
        result.reasons.push(Reason::ResponseUncacheableByDefault);
    }

    if result.error.is_none() {
        result.error = ctx.parse_error().cloned();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::http::Method;
    use crate::http::date::format_http_date;
    use crate::policy::tests::{context, fill, now};

    fn reasons(ctx: &CacheabilityContext) -> Vec<Reason> {
        let mut rv = EvaluationResult::default();
        cacheable(ctx, &mut rv);
        assert!(rv.error.is_none());
        rv.reasons
    }

    #[test]
    fn default_status_codes() {
        for code in [200, 203, 204, 206, 300, 301, 404, 405, 410, 414, 501] {
            assert!(cacheable_by_default(StatusCode::from_u16(code).unwrap()));
        }
        for code in [201, 302, 304, 400, 500, 503] {
            assert!(!cacheable_by_default(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn plain_get_is_cacheable() {
        assert!(reasons(&context(fill())).is_empty());
    }

    #[test]
    fn private_response_in_shared_cache() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "private");
        let ctx = context((m, req, s, resp));
        assert_eq!(reasons(&ctx), [Reason::ResponsePrivate]);
        assert!(reasons(&ctx.private_cache(true)).is_empty());
    }

    #[test]
    fn uncacheable_methods() {
        let cases = [
            (Method::Post, Reason::RequestMethodPost),
            (Method::Put, Reason::RequestMethodPut),
            (Method::Delete, Reason::RequestMethodDelete),
            (Method::Connect, Reason::RequestMethodConnect),
            (Method::Options, Reason::RequestMethodOptions),
            (Method::Trace, Reason::RequestMethodTrace),
            (Method::Patch, Reason::RequestMethodPatch),
            (Method::Custom("PURGE".into()), Reason::RequestMethodUnknown),
        ];
        for (method, reason) in cases {
            let (_, req, s, resp) = fill();
            assert_eq!(reasons(&context((method, req, s, resp))), [reason]);
        }
    }

    #[test]
    fn head_is_cacheable() {
        let (_, req, s, mut resp) = fill();
        resp.insert(
            "Last-Modified",
            format_http_date(now() - TimeDelta::hours(1)),
        );
        let ctx = context((Method::Head, req, s, resp));
        let rv = ctx.evaluate();
        assert!(rv.is_cacheable());
        assert!(rv.expiration.is_some());
    }

    #[test]
    fn post_with_explicit_freshness() {
        let (_, req, s, mut resp) = fill();
        resp.insert("Expires", format_http_date(now() + TimeDelta::hours(1)));
        assert!(reasons(&context((Method::Post, req, s, resp))).is_empty());

        let (_, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "s-maxage=900");
        assert!(reasons(&context((Method::Post, req, s, resp))).is_empty());

        let (_, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "max-age=9000");
        assert!(reasons(&context((Method::Post, req, s, resp))).is_empty());
    }

    #[test]
    fn private_cache_ignores_s_maxage_for_post() {
        let (_, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "s-maxage=900");
        let ctx = context((Method::Post, req, s, resp)).private_cache(true);
        assert_eq!(reasons(&ctx), [Reason::RequestMethodPost]);
    }

    #[test]
    fn put_waived_by_expires() {
        let (_, req, s, resp) = fill();
        assert_eq!(
            reasons(&context((Method::Put, req, s, resp))),
            [Reason::RequestMethodPut]
        );

        let (_, req, s, mut resp) = fill();
        resp.insert("Expires", format_http_date(now() + TimeDelta::hours(1)));
        assert!(reasons(&context((Method::Put, req, s, resp))).is_empty());
    }

    #[test]
    fn authorization_in_shared_cache() {
        let (m, mut req, s, resp) = fill();
        req.insert("Authorization", "bearer xyz");
        let ctx = context((m, req, s, resp));
        assert_eq!(reasons(&ctx), [Reason::RequestAuthorizationHeader]);
        assert!(reasons(&ctx.private_cache(true)).is_empty());
    }

    #[test]
    fn authorization_waived_for_public_fresh() {
        let (m, mut req, s, mut resp) = fill();
        req.insert("Authorization", "bearer xyz");
        resp.insert("Cache-Control", "public, max-age=300");
        assert!(reasons(&context((m, req, s, resp))).is_empty());

        let (m, mut req, s, mut resp) = fill();
        req.insert("Authorization", "bearer xyz");
        resp.insert("Cache-Control", "public");
        assert_eq!(
            reasons(&context((m, req, s, resp))),
            [Reason::RequestAuthorizationHeader]
        );
    }

    #[test]
    fn authorization_allowed_when_enabled() {
        let (m, mut req, s, mut resp) = fill();
        req.insert("Authorization", "bearer xyz");
        resp.insert("Cache-Control", "max-age=3600");
        let ctx = context((m, req, s, resp));
        assert_eq!(reasons(&ctx), [Reason::RequestAuthorizationHeader]);

        let ctx = ctx.authorized_requests_cacheable(true);
        assert!(reasons(&ctx).is_empty());
        assert!(ctx.evaluate().is_cacheable());
    }

    #[test]
    fn no_store_either_side() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "no-store, max-age=60");
        assert_eq!(reasons(&context((m, req, s, resp))), [Reason::ResponseNoStore]);

        let (m, mut req, s, resp) = fill();
        req.insert("Cache-Control", "no-store");
        assert_eq!(reasons(&context((m, req, s, resp))), [Reason::RequestNoStore]);
    }

    #[test]
    fn post_no_store_collects_every_reason() {
        let (_, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "no-store");
        assert_eq!(
            reasons(&context((Method::Post, req, s, resp))),
            [Reason::RequestMethodPost, Reason::ResponseNoStore]
        );
    }

    #[test]
    fn server_error_is_uncacheable() {
        let (m, req, _, resp) = fill();
        let ctx = context((m, req, StatusCode::INTERNAL_SERVER_ERROR, resp));
        assert_eq!(reasons(&ctx), [Reason::ResponseUncacheableByDefault]);

        let (m, req, _, mut resp) = fill();
        resp.insert("Cache-Control", "max-age=60");
        let ctx = context((m, req, StatusCode::INTERNAL_SERVER_ERROR, resp));
        assert!(reasons(&ctx).is_empty());
    }
}
