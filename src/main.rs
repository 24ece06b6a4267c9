use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transcript_resolver::{
    output, utils, Cli, Config, ResolutionResult, TranscriptError, TranscriptResolver, YoutubeProvider,
};

const DEFAULT_FILTER: &str = "transcript_resolver=warn,get_transcript=warn";
const VERBOSE_FILTER: &str = "transcript_resolver=debug,get_transcript=debug";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(video_id) = cli.video_id.clone() else {
        let usage = ResolutionResult::failure(TranscriptError::MissingVideoId.to_string());
        emit(&usage, cli.pretty);
        return ExitCode::FAILURE;
    };

    let config = Config::load(cli.config.as_deref());
    init_tracing(cli.verbose, config.as_ref().map(|c| c.logging.json).unwrap_or(false));

    let result = match config {
        Ok(config) => {
            match &config.source {
                Some(path) => tracing::debug!("Loaded configuration from {}", path.display()),
                None => tracing::debug!("No configuration file found, using defaults"),
            }
            resolve(&config, &video_id, &cli.lang).await
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            ResolutionResult::failure(TranscriptError::Config(format!("{:#}", e)).to_string())
        }
    };

    if emit(&result, cli.pretty) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn resolve(config: &Config, input: &str, lang: &str) -> ResolutionResult {
    let provider = match YoutubeProvider::new(&config.provider) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!("Failed to set up transcript provider: {:#}", e);
            return ResolutionResult::failure(TranscriptError::ProviderSetup(format!("{:#}", e)).to_string());
        }
    };

    let video_id = utils::extract_video_id(input);
    if video_id != input {
        tracing::debug!("Extracted video id {} from {}", video_id, input);
    }

    TranscriptResolver::new(provider)
        .with_fallback_language(config.resolver.fallback_language.clone())
        .resolve(&video_id, lang)
        .await
}

/// Print the result; stdout only ever carries the JSON document
fn emit(result: &ResolutionResult, pretty: bool) -> bool {
    match output::print_to_console(result, pretty) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Failed to write result: {:#}", e);
            false
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}
