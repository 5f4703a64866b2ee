use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parakeet::config::DEFAULT_TTS_LANGUAGE;
use parakeet::voice::TextToSpeech;
use parakeet::weather::WeatherClient;
use parakeet::{Config, Daemon, format_weather};

/// Parakeet - Discord voice-message assistant
#[derive(Parser)]
#[command(name = "parakeet", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize text to an MP3 file without connecting to Discord
    TestTts {
        /// Text to synthesize
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,

        /// Output file
        #[arg(short, long, default_value = "reply.mp3")]
        output: PathBuf,
    },
    /// Look up current weather for a city and print the formatted sentence
    TestWeather {
        /// City name
        city: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parakeet=info",
        1 => "info,parakeet=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestTts { text, output } => test_tts(&text, &output).await,
            Command::TestWeather { city } => test_weather(&city).await,
        };
    }

    let config = Config::from_env()?;
    tracing::info!(language = %config.voice.language, "starting parakeet");

    Daemon::new(config).run().await?;
    Ok(())
}

async fn test_tts(text: &str, output: &Path) -> anyhow::Result<()> {
    let language = std::env::var("TTS_LANGUAGE")
        .unwrap_or_else(|_| DEFAULT_TTS_LANGUAGE.to_string());
    let tts = TextToSpeech::new(reqwest::Client::new(), language);

    let audio = tts.synthesize(text).await?;
    std::fs::write(output, &audio)?;

    println!("wrote {} bytes to {}", audio.len(), output.display());
    Ok(())
}

async fn test_weather(city: &str) -> anyhow::Result<()> {
    let key = std::env::var("WEATHER_API_KEY").context("WEATHER_API_KEY is not set")?;
    let client = WeatherClient::new(reqwest::Client::new(), key)?;

    let sentence = match client.current(city).await {
        Ok(snapshot) => format_weather(Some(&snapshot)),
        Err(e) => {
            tracing::warn!(error = %e, "weather lookup failed");
            format_weather(None)
        }
    };

    println!("{sentence}");
    Ok(())
}
