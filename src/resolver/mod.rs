use serde::{Deserialize, Serialize};

use crate::provider::{ProviderError, RawSegment, TranscriptHandle, TranscriptList, TranscriptProvider};

/// Message reported when transcripts are turned off for a video
pub const DISABLED_MESSAGE: &str = "Transcripts are disabled for this video";

/// Message reported when no fallback tier produced a transcript
pub const NOT_FOUND_MESSAGE: &str = "No transcript found";

/// Language used when none is requested, and the default fallback language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl From<RawSegment> for TranscriptSegment {
    fn from(raw: RawSegment) -> Self {
        Self {
            text: raw.text,
            start: raw.start,
            duration: raw.duration,
        }
    }
}

/// Outcome of a resolution, one variant per way it can end
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found {
        language: String,
        segments: Vec<TranscriptSegment>,
    },
    Disabled,
    NotFound {
        requested: String,
        available: Vec<String>,
    },
    Failed {
        kind: &'static str,
        message: String,
    },
}

/// Serialized result printed by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolutionResult {
    Success {
        language: String,
        segments: Vec<TranscriptSegment>,
    },
    Failure {
        error: String,
        segments: Vec<TranscriptSegment>,
    },
}

impl ResolutionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        ResolutionResult::Failure {
            error: error.into(),
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        match self {
            ResolutionResult::Success { segments, .. } | ResolutionResult::Failure { segments, .. } => segments,
        }
    }
}

impl From<Resolution> for ResolutionResult {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Found { language, segments } => ResolutionResult::Success { language, segments },
            Resolution::Disabled => ResolutionResult::failure(DISABLED_MESSAGE),
            Resolution::NotFound { .. } => ResolutionResult::failure(NOT_FOUND_MESSAGE),
            Resolution::Failed { message, .. } => ResolutionResult::failure(message),
        }
    }
}

impl From<ProviderError> for Resolution {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::TranscriptsDisabled(_) => Resolution::Disabled,
            other => Resolution::Failed {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

/// Picks a transcript for a video, preferring manual over generated and the
/// requested language over the fallback language
pub struct TranscriptResolver<P> {
    provider: P,
    fallback_language: String,
}

impl<P: TranscriptProvider> TranscriptResolver<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            fallback_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_fallback_language(mut self, language: impl Into<String>) -> Self {
        self.fallback_language = language.into();
        self
    }

    /// Resolve a transcript into its printable result; never fails
    pub async fn resolve(&self, video_id: &str, lang: &str) -> ResolutionResult {
        self.resolve_outcome(video_id, lang).await.into()
    }

    /// Resolve a transcript, keeping the precise outcome
    pub async fn resolve_outcome(&self, video_id: &str, lang: &str) -> Resolution {
        tracing::info!("Resolving transcript for {} (language: {})", video_id, lang);

        let list = match self.provider.list_transcripts(video_id).await {
            Ok(list) => list,
            Err(e) => return self.report(video_id, e),
        };

        let handle = match self.select(&list, lang) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                tracing::warn!(
                    "No transcript for {} in '{}' or '{}'; available: {:?}",
                    video_id,
                    lang,
                    self.fallback_language,
                    list.available_codes()
                );
                return Resolution::NotFound {
                    requested: lang.to_string(),
                    available: list.available_codes(),
                };
            }
            Err(e) => return self.report(video_id, e),
        };

        tracing::info!(
            "Selected {} transcript '{}' for {}",
            handle.kind,
            handle.language_code,
            video_id
        );

        match self.provider.fetch(handle).await {
            Ok(raw) => Resolution::Found {
                language: handle.language_code.clone(),
                segments: raw.into_iter().map(TranscriptSegment::from).collect(),
            },
            Err(e) => self.report(video_id, e),
        }
    }

    /// Walk the fallback tiers; a tier only moves on when nothing matched
    fn select<'a>(&self, list: &'a TranscriptList, lang: &str) -> Result<Option<&'a TranscriptHandle>, ProviderError> {
        let mut tiers: Vec<(&str, bool)> = vec![(lang, false), (lang, true)];
        if lang != self.fallback_language {
            tiers.push((self.fallback_language.as_str(), false));
            tiers.push((self.fallback_language.as_str(), true));
        }

        for (code, generated) in tiers {
            let found = if generated {
                list.find_generated(&[code])
            } else {
                list.find_manual(&[code])
            };

            match found {
                Ok(handle) => return Ok(Some(handle)),
                Err(ProviderError::NoTranscriptFound { .. }) => {
                    tracing::debug!(
                        "No {} transcript in '{}'",
                        if generated { "generated" } else { "manual" },
                        code
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    fn report(&self, video_id: &str, error: ProviderError) -> Resolution {
        tracing::warn!(kind = error.kind(), "Transcript lookup failed for {}: {}", video_id, error);
        error.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockTranscriptProvider, TranscriptKind};

    fn handle(code: &str, kind: TranscriptKind) -> TranscriptHandle {
        TranscriptHandle {
            video_id: "vid".to_string(),
            language: code.to_string(),
            language_code: code.to_string(),
            kind,
            url: format!("https://example.com/{}/{}", code, kind),
        }
    }

    fn raw(text: &str, start: f64, duration: f64) -> RawSegment {
        RawSegment {
            text: text.to_string(),
            start,
            duration,
            extra: vec![("p".to_string(), "1".to_string())],
        }
    }

    /// Provider listing the given handles and returning one segment naming the fetched handle
    fn provider_with(handles: Vec<TranscriptHandle>) -> MockTranscriptProvider {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .withf(|id| id == "vid")
            .times(1)
            .returning(move |id| Ok(TranscriptList::new(id, handles.clone())));
        provider
            .expect_fetch()
            .returning(|h| Ok(vec![raw(&format!("{} {}", h.language_code, h.kind), 0.5, 1.25)]));
        provider
    }

    async fn resolve(handles: Vec<TranscriptHandle>, lang: &str) -> ResolutionResult {
        TranscriptResolver::new(provider_with(handles)).resolve("vid", lang).await
    }

    fn expect_success(result: ResolutionResult, language: &str, text: &str) {
        match result {
            ResolutionResult::Success { language: l, segments } => {
                assert_eq!(l, language);
                assert_eq!(segments.len(), 1);
                assert_eq!(segments[0].text, text);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_manual_in_requested_language_wins() {
        let result = resolve(
            vec![
                handle("de", TranscriptKind::Generated),
                handle("de", TranscriptKind::Manual),
                handle("en", TranscriptKind::Manual),
            ],
            "de",
        )
        .await;
        expect_success(result, "de", "de manual");
    }

    #[tokio::test]
    async fn test_generated_in_requested_language_before_fallback() {
        let result = resolve(
            vec![handle("en", TranscriptKind::Manual), handle("fr", TranscriptKind::Generated)],
            "fr",
        )
        .await;
        expect_success(result, "fr", "fr generated");
    }

    #[tokio::test]
    async fn test_falls_back_to_english_manual() {
        let result = resolve(
            vec![handle("en", TranscriptKind::Generated), handle("en", TranscriptKind::Manual)],
            "ja",
        )
        .await;
        expect_success(result, "en", "en manual");
    }

    #[tokio::test]
    async fn test_falls_back_to_english_generated() {
        let result = resolve(
            vec![handle("es", TranscriptKind::Manual), handle("en", TranscriptKind::Generated)],
            "ja",
        )
        .await;
        expect_success(result, "en", "en generated");
    }

    #[tokio::test]
    async fn test_english_request_has_no_other_fallback() {
        let result = resolve(vec![handle("es", TranscriptKind::Manual)], "en").await;
        assert_eq!(result, ResolutionResult::failure(NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn test_exhausted_non_english_chain_reports_not_found() {
        let result = resolve(vec![handle("es", TranscriptKind::Generated)], "ja").await;
        assert_eq!(result, ResolutionResult::failure(NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn test_no_transcripts_at_all() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|id| Ok(TranscriptList::new(id, Vec::new())));
        provider.expect_fetch().never();

        let outcome = TranscriptResolver::new(provider).resolve_outcome("vid", "en").await;
        assert_eq!(
            outcome,
            Resolution::NotFound {
                requested: "en".to_string(),
                available: Vec::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_disabled_transcripts() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|id| Err(ProviderError::TranscriptsDisabled(id.to_string())));
        provider.expect_fetch().never();

        let result = TranscriptResolver::new(provider).resolve("vid", "en").await;
        assert_eq!(result, ResolutionResult::failure(DISABLED_MESSAGE));
    }

    #[tokio::test]
    async fn test_other_provider_failure_carries_its_message() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|id| Err(ProviderError::VideoUnavailable(id.to_string())));

        let resolver = TranscriptResolver::new(provider);
        match resolver.resolve_outcome("vid", "en").await {
            Resolution::Failed { kind, message } => {
                assert_eq!(kind, "video_unavailable");
                assert_eq!(message, "The video vid is no longer available");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|id| Ok(TranscriptList::new(id, vec![handle("en", TranscriptKind::Manual)])));
        provider
            .expect_fetch()
            .times(1)
            .returning(|h| Err(ProviderError::TooManyRequests(h.video_id.clone())));

        let result = TranscriptResolver::new(provider).resolve("vid", "en").await;
        assert_eq!(
            result,
            ResolutionResult::failure("Too many requests were sent while fetching video vid")
        );
    }

    #[tokio::test]
    async fn test_segments_keep_raw_values() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|id| Ok(TranscriptList::new(id, vec![handle("en", TranscriptKind::Manual)])));
        provider
            .expect_fetch()
            .returning(|_| Ok(vec![raw("first", 0.0, 1.5), raw("second", 1.5, 2.75)]));

        let result = TranscriptResolver::new(provider).resolve("vid", "en").await;
        assert_eq!(
            result.segments(),
            &[
                TranscriptSegment { text: "first".to_string(), start: 0.0, duration: 1.5 },
                TranscriptSegment { text: "second".to_string(), start: 1.5, duration: 2.75 },
            ]
        );
    }

    #[tokio::test]
    async fn test_custom_fallback_language() {
        let resolver = TranscriptResolver::new(provider_with(vec![handle("de", TranscriptKind::Manual)]))
            .with_fallback_language("de");

        expect_success(resolver.resolve("vid", "fr").await, "de", "de manual");
    }

    #[test]
    fn test_result_json_shape() {
        let success = ResolutionResult::Success {
            language: "en".to_string(),
            segments: vec![TranscriptSegment { text: "hi".to_string(), start: 1.0, duration: 2.5 }],
        };
        assert_eq!(
            serde_json::to_value(&success).unwrap(),
            serde_json::json!({
                "language": "en",
                "segments": [{ "text": "hi", "start": 1.0, "duration": 2.5 }]
            })
        );

        assert_eq!(
            serde_json::to_value(ResolutionResult::failure(NOT_FOUND_MESSAGE)).unwrap(),
            serde_json::json!({ "error": "No transcript found", "segments": [] })
        );
    }
}
