use clap::Parser;
use std::path::PathBuf;

use crate::resolver::DEFAULT_LANGUAGE;

/// Error message printed when no video id is given
pub const USAGE_MESSAGE: &str = "Usage: get_transcript.py <video_id> [lang]";

#[derive(Parser, Debug)]
#[command(
    name = "get_transcript",
    about = "Fetch a YouTube transcript as JSON, falling back from manual to auto-generated captions and to English",
    version,
    long_about = "Fetch the transcript of a YouTube video and print it as a single JSON object. \
                  A manual transcript in the requested language is preferred, then an auto-generated one, \
                  then the same two in the fallback language (English unless configured otherwise)."
)]
pub struct Cli {
    /// Video id or YouTube URL
    #[arg(value_name = "VIDEO_ID")]
    pub video_id: Option<String>,

    /// Preferred transcript language code
    #[arg(value_name = "LANG", default_value = DEFAULT_LANGUAGE)]
    pub lang: String,

    /// Configuration file (YAML)
    #[arg(long, value_name = "FILE", env = "TRANSCRIPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
