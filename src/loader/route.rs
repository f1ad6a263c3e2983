//! Page route classification.

use once_cell::sync::Lazy;
use regex::Regex;

static API_ROUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api(?:/|$)").expect("regex must compile"));

static DYNAMIC_ROUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\[[^/]+?\](?:/|$)").expect("regex must compile"));

/// The kind of wrapper a page gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RouteKind {
    /// An API route, handling requests with a single function.
    Api,
    /// A page, rendered to HTML.
    Page,
}

impl RouteKind {
    pub fn of(page: &str) -> Self {
        if API_ROUTE.is_match(page) {
            Self::Api
        } else {
            Self::Page
        }
    }
}

/// Whether the route has segments which get resolved at request time, like `/post/[id]`.
pub fn is_dynamic_route(page: &str) -> bool {
    DYNAMIC_ROUTE.is_match(page)
}

/// Escape the build id, so that it can be used inside a regular expression.
pub fn escape_build_id(build_id: &str) -> String {
    regex::escape(build_id)
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api", RouteKind::Api)]
    #[case("/api/users", RouteKind::Api)]
    #[case("/api/[id]", RouteKind::Api)]
    #[case("/apis", RouteKind::Page)]
    #[case("/api-docs", RouteKind::Page)]
    #[case("/", RouteKind::Page)]
    #[case("/docs/api", RouteKind::Page)]
    fn test_route_kind(#[case] page: &str, #[case] expected: RouteKind) {
        assert_eq!(RouteKind::of(page), expected);
    }

    #[rstest]
    #[case("/post/[id]", true)]
    #[case("/post/[id]/comments", true)]
    #[case("/[...slug]", true)]
    #[case("/[[...slug]]", true)]
    #[case("/post", false)]
    #[case("/post/[id", false)]
    #[case("/post/id]", false)]
    fn test_dynamic_route(#[case] page: &str, #[case] expected: bool) {
        assert_eq!(is_dynamic_route(page), expected);
    }

    #[test]
    fn test_escape_build_id() {
        assert_eq!(escape_build_id("abc123"), "abc123");
        assert_eq!(escape_build_id("v1.2+x"), r"v1\.2\+x");
    }
}
