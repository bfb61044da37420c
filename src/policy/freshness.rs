use chrono::{DateTime, TimeDelta, Utc};

use super::{CacheabilityContext, EvaluationResult};
use crate::control::Warning;

/// Upper bound on a heuristic freshness lifetime, in hours.
const HEURISTIC_CAP_HOURS: i64 = 24;

/// Sets the result's expiration instant.
///
/// In order: `s-maxage` (shared caches only), `max-age`, `Expires`, then a
/// heuristic of 10% of the time since `Last-Modified`, capped at 24 hours.
/// Directive lifetimes are counted from the response `Date`, or from now
/// when there is none. Without any of these the response is already
/// expired and `expiration` stays `None`.
pub fn expiration(ctx: &CacheabilityContext, result: &mut EvaluationResult) {
    let now = ctx.now();
    let base = ctx.response_date().unwrap_or(now);
    let directives = ctx.response_directives();

    if let Some(lifetime) = ctx.effective_s_maxage() {
        result.expiration = base.checked_add_signed(lifetime);
    } else if let Some(lifetime) = directives.max_age().to_time_delta() {
        result.expiration = base.checked_add_signed(lifetime);
    } else if let Some(expires) = ctx.response_expires() {
        result.expiration = Some(expires);
    } else if let Some(last_modified) = ctx.response_last_modified() {
        let lifetime = ((now - last_modified) / 10)
            .max(TimeDelta::zero())
            .min(TimeDelta::hours(HEURISTIC_CAP_HOURS));
        result.expiration = now.checked_add_signed(lifetime);
        result.warnings.push(Warning::HeuristicExpiration);
    } else {
        result.expiration = None;
    }
}

/// Checks a stored response against the request's own freshness limits.
///
/// `max-age` rejects a response older than it, `min-fresh` rejects one that
/// would expire sooner than it. `max-stale` never extends freshness.
pub fn satisfies_request(ctx: &CacheabilityContext, result: &EvaluationResult) -> bool {
    let directives = ctx.request_directives();

    if let Some(max_age) = directives.max_age().to_time_delta() {
        if ctx.age() > max_age {
            return false;
        }
    }

    if let Some(min_fresh) = directives.min_fresh().to_time_delta() {
        let remaining = remaining(ctx.now(), result.expiration);
        if remaining < min_fresh {
            return false;
        }
    }

    true
}

fn remaining(now: DateTime<Utc>, expiration: Option<DateTime<Utc>>) -> TimeDelta {
    expiration.map_or(TimeDelta::zero(), |expires| expires - now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::date::format_http_date;
    use crate::http::{Headers, Method, StatusCode};
    use crate::policy::tests::{context, fill, now};

    fn expires_in(ctx: &CacheabilityContext) -> Option<TimeDelta> {
        let rv = ctx.evaluate();
        rv.expiration.map(|e| e - now())
    }

    #[test]
    fn s_maxage_shared() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "s-maxage=60");
        assert_eq!(expires_in(&context((m, req, s, resp))), Some(TimeDelta::seconds(60)));
    }

    #[test]
    fn s_maxage_ignored_by_private_cache() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "s-maxage=60");
        let ctx = context((m, req, s, resp)).private_cache(true);
        assert_eq!(expires_in(&ctx), None);
    }

    #[test]
    fn max_age() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "max-age=60");
        assert_eq!(expires_in(&context((m, req, s, resp))), Some(TimeDelta::seconds(60)));
    }

    #[test]
    fn s_maxage_beats_max_age() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Cache-Control", "max-age=60, s-maxage=900");
        let ctx = context((m, req, s, resp));
        assert_eq!(expires_in(&ctx), Some(TimeDelta::seconds(900)));
        assert_eq!(
            expires_in(&ctx.private_cache(true)),
            Some(TimeDelta::seconds(60))
        );
    }

    #[test]
    fn max_age_counts_from_date() {
        let (m, req, s, mut resp) = fill();
        resp.set("Date", format_http_date(now() - TimeDelta::seconds(50)));
        resp.insert("Cache-Control", "max-age=60");
        assert_eq!(expires_in(&context((m, req, s, resp))), Some(TimeDelta::seconds(10)));
    }

    #[test]
    fn expires_header() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Expires", format_http_date(now() + TimeDelta::seconds(1500)));
        assert_eq!(
            expires_in(&context((m, req, s, resp))),
            Some(TimeDelta::seconds(1500))
        );
    }

    #[test]
    fn expires_without_server_date() {
        let mut resp = Headers::new();
        resp.insert("Expires", format_http_date(now() + TimeDelta::seconds(1500)));
        let ctx = context((Method::Get, Headers::new(), StatusCode::OK, resp));
        assert_eq!(expires_in(&ctx), Some(TimeDelta::seconds(1500)));
    }

    #[test]
    fn heuristic_from_last_modified() {
        let (m, req, s, mut resp) = fill();
        resp.insert("Last-Modified", format_http_date(now() - TimeDelta::hours(10)));
        let rv = context((m, req, s, resp)).evaluate();
        assert_eq!(rv.expiration, Some(now() + TimeDelta::hours(1)));
        assert_eq!(rv.warnings, [Warning::HeuristicExpiration]);
    }

    #[test]
    fn heuristic_is_capped() {
        let (m, req, s, mut resp) = fill();
        resp.insert(
            "Last-Modified",
            format_http_date(now() - TimeDelta::hours(70_000)),
        );
        let rv = context((m, req, s, resp)).evaluate();
        assert_eq!(rv.expiration, Some(now() + TimeDelta::hours(24)));
    }

    #[test]
    fn nothing_means_expired() {
        let rv = context(fill()).evaluate();
        assert_eq!(rv.expiration, None);
        assert!(rv.warnings.is_empty());
        assert!(rv.is_expired_at(now()));
    }

    #[test]
    fn request_max_age_rejects_old_entries() {
        let (m, mut req, s, mut resp) = fill();
        req.insert("Cache-Control", "max-age=30");
        resp.set("Date", format_http_date(now() - TimeDelta::seconds(40)));
        resp.insert("Cache-Control", "max-age=600");
        let ctx = context((m, req, s, resp));
        let rv = ctx.evaluate();
        assert!(!rv.is_expired_at(now()));
        assert!(!satisfies_request(&ctx, &rv));
    }

    #[test]
    fn request_min_fresh() {
        let (m, mut req, s, mut resp) = fill();
        req.insert("Cache-Control", "min-fresh=120");
        resp.insert("Cache-Control", "max-age=60");
        let ctx = context((m, req, s, resp));
        assert!(!satisfies_request(&ctx, &ctx.evaluate()));

        let (m, mut req, s, mut resp) = fill();
        req.insert("Cache-Control", "min-fresh=30");
        resp.insert("Cache-Control", "max-age=60");
        let ctx = context((m, req, s, resp));
        assert!(satisfies_request(&ctx, &ctx.evaluate()));
    }

    #[test]
    fn max_stale_does_not_loosen() {
        let (m, mut req, s, mut resp) = fill();
        req.insert("Cache-Control", "max-stale=3600");
        resp.set("Date", format_http_date(now() - TimeDelta::seconds(120)));
        resp.insert("Cache-Control", "max-age=60");
        let ctx = context((m, req, s, resp));
        let rv = ctx.evaluate();
        assert!(rv.is_expired_at(now()));
        assert!(satisfies_request(&ctx, &rv));
    }
}
