use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod timedtext;
pub mod youtube;

pub use youtube::YoutubeProvider;

/// Whether a transcript was authored by a person or produced by speech recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptKind {
    Manual,
    Generated,
}

impl TranscriptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptKind::Manual => "manual",
            TranscriptKind::Generated => "generated",
        }
    }
}

impl std::fmt::Display for TranscriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transcript advertised by the provider for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptHandle {
    /// Video the transcript belongs to
    pub video_id: String,

    /// Human readable language name (e.g. "English (auto-generated)")
    pub language: String,

    /// Language code as reported by the provider (e.g. "en", "pt-BR")
    pub language_code: String,

    /// Manual or auto-generated
    pub kind: TranscriptKind,

    /// Where the caption body can be fetched from
    pub url: String,
}

/// One caption record as delivered by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,

    /// Any further attributes present on the caption element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
}

/// All transcripts available for a video
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptList {
    pub video_id: String,
    handles: Vec<TranscriptHandle>,
}

impl TranscriptList {
    pub fn new(video_id: impl Into<String>, handles: Vec<TranscriptHandle>) -> Self {
        Self {
            video_id: video_id.into(),
            handles,
        }
    }

    pub fn handles(&self) -> &[TranscriptHandle] {
        &self.handles
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Find a manually created transcript in the first matching language code
    pub fn find_manual(&self, language_codes: &[&str]) -> Result<&TranscriptHandle, ProviderError> {
        self.find(language_codes, TranscriptKind::Manual)
    }

    /// Find an auto-generated transcript in the first matching language code
    pub fn find_generated(&self, language_codes: &[&str]) -> Result<&TranscriptHandle, ProviderError> {
        self.find(language_codes, TranscriptKind::Generated)
    }

    fn find(&self, language_codes: &[&str], kind: TranscriptKind) -> Result<&TranscriptHandle, ProviderError> {
        language_codes
            .iter()
            .find_map(|code| {
                self.handles
                    .iter()
                    .find(|handle| handle.kind == kind && handle.language_code == *code)
            })
            .ok_or_else(|| ProviderError::NoTranscriptFound {
                video_id: self.video_id.clone(),
                requested: language_codes.iter().map(|c| c.to_string()).collect(),
                available: self.available_codes(),
            })
    }

    /// Language codes of every listed transcript, tagged with their kind
    pub fn available_codes(&self) -> Vec<String> {
        self.handles
            .iter()
            .map(|h| format!("{} ({})", h.language_code, h.kind))
            .collect()
    }
}

/// Failures raised by a transcript provider
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Subtitles are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error(
        "No transcript found for video {video_id} in any of the requested languages {requested:?}; available: {available:?}"
    )]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("The video {0} is no longer available")]
    VideoUnavailable(String),

    #[error("The video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("The video {0} is age restricted and requires authentication")]
    AgeRestricted(String),

    #[error("YouTube is blocking requests for video {0} (bot check)")]
    RequestBlocked(String),

    #[error("YouTube is blocking requests from this IP (captcha served for video {0})")]
    IpBlocked(String),

    #[error("Too many requests were sent while fetching video {0}")]
    TooManyRequests(String),

    #[error("Failed to automatically give consent to saving cookies for video {0}")]
    FailedToCreateConsentCookie(String),

    #[error("The data required to fetch the transcript for video {video_id} is not parsable: {detail}")]
    YouTubeDataUnparsable { video_id: String, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    /// Stable short name of the failure, used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::TranscriptsDisabled(_) => "transcripts_disabled",
            ProviderError::NoTranscriptFound { .. } => "no_transcript_found",
            ProviderError::VideoUnavailable(_) => "video_unavailable",
            ProviderError::VideoUnplayable { .. } => "video_unplayable",
            ProviderError::AgeRestricted(_) => "age_restricted",
            ProviderError::RequestBlocked(_) => "request_blocked",
            ProviderError::IpBlocked(_) => "ip_blocked",
            ProviderError::TooManyRequests(_) => "too_many_requests",
            ProviderError::FailedToCreateConsentCookie(_) => "consent_cookie",
            ProviderError::YouTubeDataUnparsable { .. } => "data_unparsable",
            ProviderError::Http(_) => "http",
        }
    }
}

/// Source of transcripts for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List every transcript available for the video
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList, ProviderError>;

    /// Fetch the caption records of one transcript
    async fn fetch(&self, handle: &TranscriptHandle) -> Result<Vec<RawSegment>, ProviderError>;
}
