use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use deck_common::{GenerationRequest, PartialPresentation};
use deck_core::client::{ModelClient, OpenAiAdapter, StubClient};
use deck_core::config::Config;
use deck_core::{GenerationSession, StreamParser};
use deck_protocol::{Event, Op};

#[derive(Parser)]
#[command(name = "deck")]
#[command(about = "AI-powered streaming presentation generation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override model (e.g., gpt-4o, gpt-4o-mini)
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a presentation from a topic, streaming progress as slides land
    Generate {
        /// Presentation topic
        topic: String,
        /// Number of slides to generate
        #[arg(short, long, default_value = "6")]
        count: usize,
        /// Output language
        #[arg(short, long, default_value = "en")]
        language: String,
        /// Write the finished presentation JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse a saved raw model transcript into a presentation (offline)
    Parse {
        /// Path to the transcript file
        file: PathBuf,
    },
}

pub async fn run_cli() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(model) = cli.model {
        config.model = model;
    }

    match cli.command {
        Commands::Generate {
            topic,
            count,
            language,
            output,
        } => generate(config, topic, count, language, output).await,
        Commands::Parse { file } => parse_transcript(&file),
    }
}

async fn generate(
    config: Config,
    topic: String,
    count: usize,
    language: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let request = GenerationRequest {
        topic,
        num_slides: count,
        language,
    };

    let client: Arc<dyn ModelClient + Send + Sync> = match &config.api_key {
        Some(key) => Arc::new(OpenAiAdapter::new_with_model(key.clone(), config.model.clone())),
        None => {
            info!("no OPENAI_API_KEY set, using the offline stub client");
            Arc::new(StubClient::new(request.clone()))
        }
    };

    let session = GenerationSession::spawn(client).await?;
    session
        .submit(Op::StartGeneration {
            request: request.clone(),
        })
        .await?;

    let mut last: Option<PartialPresentation> = None;
    loop {
        match session.next_event().await {
            Some(Event::SessionConfigured {}) => {}
            Some(Event::GenerationStarted) => {
                println!("generating \"{}\"...", request.topic);
            }
            Some(Event::SlideReady { slide, index }) => {
                println!("  slide {}: {}", index + 1, slide.title);
            }
            Some(Event::Snapshot { presentation }) => {
                if let (None, Some(title)) =
                    (last.as_ref().and_then(|p| p.main_title.as_ref()), presentation.main_title.as_ref())
                {
                    println!("title: {title}");
                }
                last = Some(presentation);
            }
            Some(Event::Completed { presentation }) => {
                finish(&presentation, output.as_deref())?;
                return Ok(());
            }
            Some(Event::Error { message }) => {
                // Show whatever partial result we got before failing.
                if let Some(partial) = last.filter(|p| p.has_usable_content()) {
                    eprintln!("generation failed: {message}");
                    finish(&partial, output.as_deref())?;
                    anyhow::bail!("generation failed after partial output: {message}");
                }
                anyhow::bail!("generation failed: {message}");
            }
            Some(Event::ShutdownComplete) | None => {
                anyhow::bail!("session ended unexpectedly");
            }
        }
    }
}

fn parse_transcript(file: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let mut parser = StreamParser::default();
    parser.push_chunk(&raw);
    let presentation = match parser.finish() {
        Some(snapshot) => snapshot,
        None => parser.state().clone(),
    };
    println!("{}", serde_json::to_string_pretty(&presentation)?);
    Ok(())
}

fn finish(presentation: &PartialPresentation, output: Option<&std::path::Path>) -> Result<()> {
    println!(
        "done: {} slide(s){}",
        presentation.slides.len(),
        presentation
            .main_title
            .as_deref()
            .map(|t| format!(" for \"{t}\""))
            .unwrap_or_default()
    );
    let json = serde_json::to_string_pretty(presentation)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
