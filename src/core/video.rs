//! Video URL normalization
//!
//! Free-form video URLs pasted into the admin (watch pages, share links,
//! shorts) are rewritten to the canonical embeddable form so the frontend
//! can drop them into an iframe. YouTube is tried before Vimeo; anything
//! that matches neither passes through unchanged.

use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:watch\?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{6,})",
    )
    .expect("youtube pattern is valid")
});

static VIMEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("vimeo pattern is valid")
});

/// Rewrite a video URL into its embeddable form
///
/// Pure pass-through on no match; there is no error path.
pub fn normalize_video_url(url: &str) -> String {
    if let Some(caps) = YOUTUBE.captures(url) {
        return format!("https://www.youtube.com/embed/{}", &caps[1]);
    }
    if let Some(caps) = VIMEO.captures(url) {
        return format!("https://player.vimeo.com/video/{}", &caps[1]);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_short_link() {
        assert_eq!(
            normalize_video_url("https://youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_youtube_watch_link() {
        assert_eq!(
            normalize_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_youtube_watch_link_with_extra_query() {
        assert_eq!(
            normalize_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_youtube_embed_link_is_canonicalized() {
        assert_eq!(
            normalize_video_url("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_youtube_shorts_link() {
        assert_eq!(
            normalize_video_url("https://youtube.com/shorts/dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_vimeo_link() {
        assert_eq!(
            normalize_video_url("https://vimeo.com/12345"),
            "https://player.vimeo.com/video/12345"
        );
    }

    #[test]
    fn test_vimeo_video_path() {
        assert_eq!(
            normalize_video_url("https://vimeo.com/video/98765"),
            "https://player.vimeo.com/video/98765"
        );
    }

    #[test]
    fn test_unknown_url_passes_through() {
        assert_eq!(
            normalize_video_url("https://example.com/video.mp4"),
            "https://example.com/video.mp4"
        );
    }

    #[test]
    fn test_non_url_passes_through() {
        assert_eq!(normalize_video_url("not a url"), "not a url");
    }

    #[test]
    fn test_youtube_takes_priority_over_vimeo() {
        // Both patterns present in one string; platform order is fixed.
        let url = "https://youtu.be/dQw4w9WgXcQ?ref=vimeo.com/12345";
        assert_eq!(
            normalize_video_url(url),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }
}
