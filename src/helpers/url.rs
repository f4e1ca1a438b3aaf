//! URL helper functions

use percent_encoding::percent_decode_str;

use crate::config::SiteConfig;

/// Directory holding one page per post
pub const POST_DIR: &str = "post";

/// Directory holding the listing pages fetched by "load more"
pub const PAGE_DATA_DIR: &str = "page-data";

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Site-relative path of a post page (`post/<uid>/`)
pub fn post_path(uid: &str) -> String {
    format!("{}/{}/", POST_DIR, uid)
}

/// Site-relative path of the n-th "load more" page (`page-data/<n>.json`)
pub fn page_data_path(page: usize) -> String {
    format!("{}/{}.json", PAGE_DATA_DIR, page)
}

/// Extract the percent-decoded uid from a request path like `/post/<uid>/`
pub fn uid_from_post_path(path: &str) -> Option<String> {
    let rest = path.trim_matches('/').strip_prefix(POST_DIR)?;
    let segment = rest.strip_prefix('/')?.trim_end_matches("/index.html");
    let uid = percent_decode_str(segment).decode_utf8().ok()?;
    if uid.is_empty() || uid.contains('/') || uid.starts_with('.') {
        None
    } else {
        Some(uid.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "post/hello/"), "/blog/post/hello/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, &post_path("hello")),
            "https://example.com/blog/post/hello/"
        );
    }

    #[test]
    fn test_page_data_path() {
        assert_eq!(page_data_path(2), "page-data/2.json");
    }

    #[test]
    fn test_uid_from_post_path() {
        assert_eq!(
            uid_from_post_path("/post/como-utilizar-hooks").as_deref(),
            Some("como-utilizar-hooks")
        );
        assert_eq!(uid_from_post_path("/post/hooks/").as_deref(), Some("hooks"));
        assert_eq!(
            uid_from_post_path("/post/hooks/index.html").as_deref(),
            Some("hooks")
        );
        assert_eq!(uid_from_post_path("/post/"), None);
        assert_eq!(uid_from_post_path("/post/a/b"), None);
        assert_eq!(uid_from_post_path("/posts/a"), None);
        assert_eq!(uid_from_post_path("/css/style.css"), None);
    }

    #[test]
    fn test_uid_from_post_path_is_decoded() {
        assert_eq!(uid_from_post_path("/post/caf%C3%A9/").as_deref(), Some("café"));
        assert_eq!(uid_from_post_path("/post/a%2Fb"), None);
        assert_eq!(uid_from_post_path("/post/%2E%2E"), None);
        assert_eq!(uid_from_post_path("/post/%FF"), None);
    }
}
