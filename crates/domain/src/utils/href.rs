//! Resource locator helpers
//!
//! The services identify resources by `href`/`Location` values such as
//! `/v1/queues/orders/claims/51db7067821e727dc24df754`. The resource identity
//! is the last path segment.

use url::Url;

/// Extract the identity (last non-empty path segment) from a resource
/// locator. Query strings and fragments are ignored.
///
/// Accepts absolute URLs and bare paths.
pub fn id_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Read a single query parameter from a resource locator, e.g. the `marker`
/// of a paging link.
pub fn query_param_from_href(href: &str, name: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_relative_href() {
        assert_eq!(
            id_from_href("/v1/queues/orders/claims/51db7067821e727dc24df754").as_deref(),
            Some("51db7067821e727dc24df754")
        );
    }

    #[test]
    fn test_id_ignores_query_and_trailing_slash() {
        assert_eq!(
            id_from_href("/v1/queues/orders/messages/abc123?claim_id=def456").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            id_from_href("https://dns.example.com/v1.0/1234/status/job-1/").as_deref(),
            Some("job-1")
        );
    }

    #[test]
    fn test_id_absent_for_empty_locator() {
        assert_eq!(id_from_href(""), None);
        assert_eq!(id_from_href("/"), None);
    }

    #[test]
    fn test_query_param_from_paging_link() {
        let href = "/v1/queues?marker=kitkat&limit=10&detailed=true";
        assert_eq!(query_param_from_href(href, "marker").as_deref(), Some("kitkat"));
        assert_eq!(query_param_from_href(href, "limit").as_deref(), Some("10"));
        assert_eq!(query_param_from_href(href, "missing"), None);
    }
}
