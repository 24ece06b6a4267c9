//! Decoding of YouTube "timedtext" caption documents.
//!
//! The document is a flat list of `<text start=".." dur="..">..</text>`
//! elements inside a `<transcript>` root. Bodies are entity-escaped once by
//! the XML layer and frequently a second time by YouTube itself.

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ProviderError, RawSegment};

static TEXT_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)"#).unwrap());

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([\w:-]+)\s*=\s*"([^"]*)""#).unwrap());

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<[^>]*>").unwrap());

/// Parse a timedtext XML body into caption records, in document order
pub fn parse(video_id: &str, body: &str) -> Result<Vec<RawSegment>, ProviderError> {
    let mut segments = Vec::new();

    for element in TEXT_ELEMENT.captures_iter(body) {
        let raw_text = element.get(2).map(|m| m.as_str()).unwrap_or("");
        let decoded = decode_html_entities(&decode_html_entities(raw_text)).into_owned();
        let text = MARKUP.replace_all(&decoded, "").into_owned();
        if text.is_empty() {
            continue;
        }

        let mut start = None;
        let mut duration = 0.0;
        let mut extra = Vec::new();

        for attr in ATTRIBUTE.captures_iter(&element[1]) {
            let (name, value) = (&attr[1], &attr[2]);
            match name {
                "start" => start = Some(parse_seconds(video_id, name, value)?),
                "dur" => duration = parse_seconds(video_id, name, value)?,
                _ => extra.push((name.to_string(), value.to_string())),
            }
        }

        let start = start.ok_or_else(|| ProviderError::YouTubeDataUnparsable {
            video_id: video_id.to_string(),
            detail: "caption element without a start attribute".to_string(),
        })?;

        segments.push(RawSegment {
            text,
            start,
            duration,
            extra,
        });
    }

    tracing::debug!("Decoded {} caption records for {}", segments.len(), video_id);
    Ok(segments)
}

fn parse_seconds(video_id: &str, name: &str, value: &str) -> Result<f64, ProviderError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ProviderError::YouTubeDataUnparsable {
            video_id: video_id.to_string(),
            detail: format!("invalid {} attribute: {:?}", name, value),
        })
}
