//! Input validation utilities

use regex::Regex;
use std::sync::LazyLock;

/// ASCII word characters and hyphens, which covers UUIDs and platform video ids
static VIDEO_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("video id pattern is valid"));

/// Maximum accepted length of a video identifier
pub const MAX_VIDEO_ID_LENGTH: usize = 100;

/// Check a video identifier taken from a connection path
pub fn is_valid_video_id(video_id: &str) -> bool {
    video_id.len() <= MAX_VIDEO_ID_LENGTH && VIDEO_ID_PATTERN.is_match(video_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dQw4w9WgXcQ")]
    #[case("5f0c7a1e-2b7d-4c4e-9a55-0e4d8f1b9c21")]
    #[case("video_01")]
    fn test_accepts_valid_ids(#[case] video_id: &str) {
        assert!(is_valid_video_id(video_id));
    }

    #[rstest]
    #[case("")]
    #[case("has space")]
    #[case("../etc")]
    #[case("a/b")]
    #[case("vidéo")]
    fn test_rejects_invalid_ids(#[case] video_id: &str) {
        assert!(!is_valid_video_id(video_id));
    }

    #[test]
    fn test_rejects_overlong_id() {
        let video_id = "a".repeat(MAX_VIDEO_ID_LENGTH + 1);
        assert!(!is_valid_video_id(&video_id));
    }
}
