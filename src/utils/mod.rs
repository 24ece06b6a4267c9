use url::Url;

/// Extract the video identifier from a YouTube URL; anything else is returned unchanged
pub fn extract_video_id(input: &str) -> String {
    parse_video_url(input.trim()).unwrap_or_else(|| input.to_string())
}

fn parse_video_url(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_prefix("m.").unwrap_or(host);

    let id = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => {
            if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
                Some(v.into_owned())
            } else {
                let mut segments = url.path_segments()?;
                match segments.next() {
                    Some("embed" | "shorts" | "v" | "live") => segments.next().map(str::to_string),
                    _ => None,
                }
            }
        }
        _ => None,
    }?;

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42"), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_bare_ids_pass_through() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("  dQw4w9WgXcQ "), "  dQw4w9WgXcQ ");
        assert_eq!(extract_video_id(" https://youtu.be/dQw4w9WgXcQ\n"), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("not a url"), "not a url");
    }

    #[test]
    fn test_other_sites_pass_through() {
        assert_eq!(extract_video_id("https://example.com/watch?v=abc"), "https://example.com/watch?v=abc");
        assert_eq!(extract_video_id("https://www.youtube.com/feed/trending"), "https://www.youtube.com/feed/trending");
    }
}
