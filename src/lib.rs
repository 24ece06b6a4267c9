//! Transcript Resolver - fetch YouTube transcripts with language fallback
//!
//! This library lists the transcripts a video offers, picks one (manual before
//! auto-generated, requested language before the fallback language) and reduces
//! it to timed text segments ready to be printed as JSON.

pub mod cli;
pub mod config;
pub mod output;
pub mod provider;
pub mod resolver;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use provider::{ProviderError, TranscriptProvider, YoutubeProvider};
pub use resolver::{Resolution, ResolutionResult, TranscriptResolver, TranscriptSegment};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types surfaced by the command line front end
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("{}", cli::USAGE_MESSAGE)]
    MissingVideoId,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider setup failed: {0}")]
    ProviderSetup(String),
}
