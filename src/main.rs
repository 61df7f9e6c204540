use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley::speech::{AzureSpeechClient, NluClient};
use parley::{AzureBackend, Config, Session};

/// Parley - spoken-dialogue controller for voice appointment booking
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize and play a test utterance
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Classify a test utterance against the intent model
    TestNlu {
        /// Text to classify
        #[arg(default_value = "create a meeting")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parley=info",
        1 => "info,parley=debug",
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
    let config = Config::load()?;

    if let Some(command) = cli.command {
        return match command {
            Command::TestTts { text } => test_tts(&config, &text).await,
            Command::TestNlu { text } => test_nlu(&config, &text).await,
        };
    }

    tracing::info!(
        region = %config.speech.region,
        voice = %config.speech.voice,
        locale = %config.speech.locale,
        "starting parley session"
    );

    let backend = Arc::new(AzureBackend::new(&config));
    let mut session = Session::new(backend);

    // Run until interrupted; the session itself loops indefinitely
    tokio::select! {
        result = session.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }

    Ok(())
}

/// Synthesize a test utterance and report the audio size
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let client = AzureSpeechClient::new(config.speech.clone());

    println!("Synthesizing speech...");
    let audio = client.synthesize(text).await?;
    println!("Got {} bytes of audio data", audio.len());

    if let Some(player) = &config.audio.player {
        println!("Play it with: ... | {player}");
    } else {
        println!("No player configured ([audio].player); audio discarded");
    }

    println!("\n---");
    println!("If synthesis succeeded, your speech credentials are working!");

    Ok(())
}

/// Classify a test utterance and print the intent ranking
async fn test_nlu(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing NLU with text: \"{text}\"\n");

    let client = NluClient::new(config.nlu.clone());
    let (intents, entities) = client.analyze(text, &config.speech.locale).await?;

    match intents.first() {
        Some(top) => println!("Top intent: {top}"),
        None => println!("No intents returned"),
    }
    if intents.len() > 1 {
        println!("Also ranked: {}", intents[1..].join(", "));
    }
    for entity in entities {
        println!("Entity: {} = {}", entity.category, entity.text);
    }

    println!("\n---");
    println!("If you saw an intent, your NLU project is reachable!");

    Ok(())
}
