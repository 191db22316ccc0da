use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// URL candidates supplied by a UI trigger (context-menu click or popup
/// submission). Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct TriggerContext {
    pub link_url: Option<String>,
    pub src_url: Option<String>,
    pub tab_url: Option<String>,
}

const BLOB_SCHEME: &str = "blob:";

// Watch/shorts/channel/playlist pages, where link and media URLs are
// usually internal player resources and the tab URL is the canonical
// content URL.
static VIDEO_PLATFORM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"youtube\.com/watch|youtube\.com/shorts|youtu\.be/|youtube\.com/channel/|youtube\.com/c/|youtube\.com/user/|youtube\.com/playlist",
    )
    .expect("video platform pattern is valid")
});

/// Picks the single URL to submit: explicit link, then media source, then
/// the tab the trigger occurred in. Returns an empty string when no usable
/// URL can be determined.
pub fn extract_target_url(trigger: &TriggerContext) -> String {
    let link = non_empty(&trigger.link_url);
    let src = non_empty(&trigger.src_url);
    let tab = non_empty(&trigger.tab_url);

    let mut target = match link.or(src).or(tab) {
        Some(candidate) => candidate,
        None => return String::new(),
    };

    // blob: references are transient in-memory objects the NAS cannot fetch.
    if target.starts_with(BLOB_SCHEME) {
        match tab {
            Some(tab_url) => target = tab_url,
            None => return String::new(),
        }
    }

    if let Some(tab_url) = tab {
        if is_video_platform_url(tab_url) {
            target = tab_url;
        }
    }

    target.to_string()
}

pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}

pub fn is_video_platform_url(url: &str) -> bool {
    VIDEO_PLATFORM_PATTERN.is_match(url)
}

/// Treats an empty string as absent, yielding the borrowed contents only
/// when the candidate is present and non-empty.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|candidate| !candidate.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(link: &str, src: &str, tab: &str) -> TriggerContext {
        TriggerContext {
            link_url: Some(link.to_string()),
            src_url: Some(src.to_string()),
            tab_url: Some(tab.to_string()),
        }
    }

    #[test]
    fn test_priority_link_over_src_over_tab() {
        let t = trigger("https://a.com/x", "https://b.com/y", "https://c.com/z");
        assert_eq!(extract_target_url(&t), "https://a.com/x");

        let t = trigger("", "https://b.com/y", "https://c.com/z");
        assert_eq!(extract_target_url(&t), "https://b.com/y");

        let t = trigger("", "", "https://c.com/z");
        assert_eq!(extract_target_url(&t), "https://c.com/z");
    }

    #[test]
    fn test_no_candidates_yields_empty() {
        assert_eq!(extract_target_url(&trigger("", "", "")), "");
        assert_eq!(extract_target_url(&TriggerContext::default()), "");
    }

    #[test]
    fn test_blob_url_replaced_by_tab_url() {
        let t = trigger("blob:abc", "", "https://site/x");
        assert_eq!(extract_target_url(&t), "https://site/x");
    }

    #[test]
    fn test_blob_url_without_tab_fails() {
        let t = trigger("blob:abc", "", "");
        assert_eq!(extract_target_url(&t), "");
    }

    #[test]
    fn test_video_platform_tab_overrides_link() {
        let t = trigger(
            "https://youtube.com/player_ajax",
            "",
            "https://youtube.com/watch?v=1",
        );
        assert_eq!(extract_target_url(&t), "https://youtube.com/watch?v=1");
    }

    #[test]
    fn test_plain_tab_does_not_override_link() {
        let t = trigger("https://a.com/file.mp4", "", "https://c.com/page");
        assert_eq!(extract_target_url(&t), "https://a.com/file.mp4");
    }

    #[test]
    fn test_video_platform_patterns() {
        assert!(is_video_platform_url("https://youtube.com/watch?v=1"));
        assert!(is_video_platform_url("https://www.youtube.com/shorts/abc"));
        assert!(is_video_platform_url("https://youtu.be/abc"));
        assert!(is_video_platform_url("https://youtube.com/playlist?list=1"));
        assert!(!is_video_platform_url("https://example.com/watch"));
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://x.com"));
        assert!(is_valid_url("http://192.168.0.2:8080/path"));
        assert!(!is_valid_url("ftp://x"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url(""));
    }
}
