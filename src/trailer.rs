use crate::models::Video;
use serde_json::Value;

const VIDEO_HOST: &str = "YouTube";
const TRAILER: &str = "Trailer";

/// Picks the playable key for a movie: an official trailer, then any trailer, then any
/// other video, all restricted to YouTube and in provider order.
pub fn select_trailer(videos: &[Video]) -> Option<&str> {
    let hosted: Vec<&Video> = videos
        .iter()
        .filter(|v| v.site == VIDEO_HOST && !v.key.is_empty())
        .collect();

    hosted
        .iter()
        .find(|v| v.video_type == TRAILER && v.official)
        .or_else(|| hosted.iter().find(|v| v.video_type == TRAILER))
        .or_else(|| hosted.first())
        .copied()
        .map(|v| v.key.as_str())
}

/// Reads the provider's video list, skipping entries that do not look like videos.
pub fn videos_from(payload: &Value) -> Vec<Video> {
    payload
        .get("results")
        .and_then(|r| r.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
