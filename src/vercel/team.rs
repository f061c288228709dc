//! Team scope resolution
//!
//! A call may name a team explicitly; otherwise the client's configured
//! default applies. The resolved value is used for both the `teamId` query
//! parameter and the team stamp on returned records.

/// Resolve the team scope for one call: explicit override, else default, else empty
pub fn resolve_team_id<'a>(explicit: &'a str, default: &'a str) -> &'a str {
    if !explicit.is_empty() {
        explicit
    } else {
        default
    }
}

/// Append `teamId=<team_id>` to `url`, unless `team_id` is empty
pub fn scope_url(url: String, team_id: &str) -> String {
    if team_id.is_empty() {
        return url;
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}teamId={}", url, separator, urlencoding::encode(team_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        assert_eq!(resolve_team_id("team_a", "team_b"), "team_a");
    }

    #[test]
    fn test_default_when_no_explicit() {
        assert_eq!(resolve_team_id("", "team_b"), "team_b");
        assert_eq!(resolve_team_id("", ""), "");
    }

    #[test]
    fn test_scope_url_separators() {
        assert_eq!(
            scope_url("https://api/v8/projects".to_string(), "team_1"),
            "https://api/v8/projects?teamId=team_1"
        );
        assert_eq!(
            scope_url("https://api/v4/domains/x/records?limit=100".to_string(), "team_1"),
            "https://api/v4/domains/x/records?limit=100&teamId=team_1"
        );
    }

    #[test]
    fn test_scope_url_omitted_when_empty() {
        assert_eq!(
            scope_url("https://api/v8/projects".to_string(), ""),
            "https://api/v8/projects"
        );
    }

    #[test]
    fn test_scope_url_encodes_team() {
        assert_eq!(
            scope_url("https://api/v8/projects".to_string(), "a b&c"),
            "https://api/v8/projects?teamId=a%20b%26c"
        );
    }
}
