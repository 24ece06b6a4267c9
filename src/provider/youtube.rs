use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{timedtext, ProviderError, RawSegment, TranscriptHandle, TranscriptKind, TranscriptList, TranscriptProvider};
use crate::config::ProviderConfig;

static API_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap());

static CONSENT_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"name="v" value="(.*?)""#).unwrap());

const CONSENT_FORM: &str = r#"action="https://consent.youtube.com/s""#;
const RECAPTCHA: &str = r#"class="g-recaptcha""#;

/// Innertube player response, reduced to what transcript listing needs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl CaptionTrack {
    fn into_handle(self, video_id: &str) -> TranscriptHandle {
        let kind = match self.kind.as_deref() {
            Some("asr") => TranscriptKind::Generated,
            _ => TranscriptKind::Manual,
        };

        let language = self
            .name
            .and_then(|name| name.runs.into_iter().next().map(|run| run.text).or(name.simple_text))
            .unwrap_or_else(|| self.language_code.clone());

        TranscriptHandle {
            video_id: video_id.to_string(),
            language,
            language_code: self.language_code,
            kind,
            url: self.base_url.replace("&fmt=srv3", ""),
        }
    }
}

/// Transcript provider backed by YouTube's watch page and innertube player API
pub struct YoutubeProvider {
    client: Client,
    base_url: String,
    accept_language: String,
    client_version: String,
}

impl YoutubeProvider {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());

        if let Some(proxy) = &config.proxy {
            tracing::debug!("Routing provider requests through proxy {}", proxy);
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .with_context(|| format!("Invalid proxy URL: {}", proxy))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            accept_language: config.accept_language.clone(),
            client_version: config.client_version.clone(),
        })
    }

    async fn send(&self, video_id: &str, request: RequestBuilder) -> Result<String, ProviderError> {
        let response = request
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::TooManyRequests(video_id.to_string()));
        }

        Ok(response.error_for_status()?.text().await?)
    }

    /// Fetch the watch page, accepting the cookie consent form once if it is served
    async fn fetch_watch_html(&self, video_id: &str) -> Result<String, ProviderError> {
        let url = format!("{}/watch", self.base_url);
        let html = self
            .send(video_id, self.client.get(&url).query(&[("v", video_id)]))
            .await?;

        if !html.contains(CONSENT_FORM) {
            return Ok(html);
        }

        tracing::debug!("Consent page served for {}, retrying with consent cookie", video_id);
        let consent = CONSENT_VALUE
            .captures(&html)
            .map(|c| c[1].to_string())
            .ok_or_else(|| ProviderError::FailedToCreateConsentCookie(video_id.to_string()))?;

        let html = self
            .send(
                video_id,
                self.client
                    .get(&url)
                    .query(&[("v", video_id)])
                    .header(COOKIE, format!("CONSENT=YES+{}", consent)),
            )
            .await?;

        if html.contains(CONSENT_FORM) {
            return Err(ProviderError::FailedToCreateConsentCookie(video_id.to_string()));
        }

        Ok(html)
    }

    fn extract_api_key(video_id: &str, html: &str) -> Result<String, ProviderError> {
        if let Some(captures) = API_KEY.captures(html) {
            return Ok(captures[1].to_string());
        }

        if html.contains(RECAPTCHA) {
            return Err(ProviderError::IpBlocked(video_id.to_string()));
        }

        Err(ProviderError::YouTubeDataUnparsable {
            video_id: video_id.to_string(),
            detail: "innertube API key not found in watch page".to_string(),
        })
    }

    async fn fetch_player(&self, video_id: &str, api_key: &str) -> Result<PlayerResponse, ProviderError> {
        let url = format!("{}/youtubei/v1/player", self.base_url);
        let body = json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": self.client_version,
                }
            },
            "videoId": video_id,
        });

        let text = self
            .send(video_id, self.client.post(&url).query(&[("key", api_key)]).json(&body))
            .await?;

        serde_json::from_str(&text).map_err(|e| ProviderError::YouTubeDataUnparsable {
            video_id: video_id.to_string(),
            detail: format!("player response: {}", e),
        })
    }

    fn check_playability(video_id: &str, status: Option<PlayabilityStatus>) -> Result<(), ProviderError> {
        let Some(status) = status else {
            return Ok(());
        };

        let reason = status.reason.unwrap_or_default();
        match status.status.as_deref() {
            None | Some("OK") => Ok(()),
            Some("LOGIN_REQUIRED") if reason.contains("not a bot") => {
                Err(ProviderError::RequestBlocked(video_id.to_string()))
            }
            Some("LOGIN_REQUIRED") if reason.contains("inappropriate") => {
                Err(ProviderError::AgeRestricted(video_id.to_string()))
            }
            Some("ERROR") if reason.contains("unavailable") => {
                Err(ProviderError::VideoUnavailable(video_id.to_string()))
            }
            Some(other) => Err(ProviderError::VideoUnplayable {
                video_id: video_id.to_string(),
                reason: if reason.is_empty() { other.to_string() } else { reason },
            }),
        }
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeProvider {
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList, ProviderError> {
        tracing::debug!("Listing transcripts for {}", video_id);

        let html = self.fetch_watch_html(video_id).await?;
        let api_key = Self::extract_api_key(video_id, &html)?;
        let player = self.fetch_player(video_id, &api_key).await?;

        Self::check_playability(video_id, player.playability_status)?;

        let tracks = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(ProviderError::TranscriptsDisabled(video_id.to_string()));
        }

        let handles = tracks
            .into_iter()
            .map(|track| track.into_handle(video_id))
            .collect::<Vec<_>>();

        tracing::debug!("Found {} transcripts for {}", handles.len(), video_id);
        Ok(TranscriptList::new(video_id, handles))
    }

    async fn fetch(&self, handle: &TranscriptHandle) -> Result<Vec<RawSegment>, ProviderError> {
        tracing::debug!(
            "Fetching {} transcript '{}' for {}",
            handle.kind,
            handle.language_code,
            handle.video_id
        );

        let body = self.send(&handle.video_id, self.client.get(&handle.url)).await?;
        timedtext::parse(&handle.video_id, &body)
    }
}
