//! `voice-edit`: apply one spoken or typed instruction to a file.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse arguments and load [`AppConfig`] (default on first run).
//! 3. Open the file into an [`EditorSession`].
//! 4. Build the [`CodeEditorAgent`] from config.
//! 5. Run one request on a current-thread tokio runtime.
//! 6. Print the line changes, apply them, optionally write back.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};

use voice_code_editor::{
    agent::{AgentRequest, CodeEditorAgent, Instruction},
    config::AppConfig,
    session::EditorSession,
};

#[derive(Parser, Debug)]
#[command(name = "voice-edit", version, about = "Edit a source file by voice or text instruction")]
#[command(group(ArgGroup::new("input").required(true).args(["instruction", "audio"])))]
struct Cli {
    /// File to edit.
    file: PathBuf,

    /// Typed instruction.
    #[arg(short, long)]
    instruction: Option<String>,

    /// Spoken instruction as a WAV file.
    #[arg(short, long, value_name = "WAV")]
    audio: Option<PathBuf>,

    /// Write the edited document back to FILE.
    #[arg(short, long)]
    write: bool,

    /// Save the spoken explanation here.
    #[arg(long, value_name = "PATH")]
    speech_out: Option<PathBuf>,

    /// Settings file (defaults to the platform config dir).
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Arguments + config
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load settings")?;

    // 3. Session
    let mut session = EditorSession::open(&cli.file)?;

    let instruction = match (&cli.instruction, &cli.audio) {
        (Some(text), _) => Instruction::Text(text.clone()),
        (None, Some(path)) => Instruction::Audio(
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?,
        ),
        (None, None) => bail!("either --instruction or --audio is required"),
    };

    // 4. Agent
    let agent = CodeEditorAgent::from_config(&config);
    if instruction.is_audio() && !agent.accepts_audio() {
        bail!("--audio needs a speech-to-text provider; stt.provider is Disabled");
    }

    let request = AgentRequest {
        snapshot: session.snapshot(),
        selections: session.selections(),
        instruction,
    };

    // 5. One request on a current-thread runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    let result = rt.block_on(agent.generate_completion(request))?;

    // 6. Report + apply
    if result.changes.is_empty() {
        println!("No changes.");
    }
    for change in &result.changes {
        println!("{change}");
    }
    if !result.explanation.is_empty() {
        println!("\n{}", result.explanation);
    }

    let report = session.apply_changes(&result.changes)?;
    if !report.is_clean() {
        log::warn!("{} change(s) could not be applied", report.stale.len());
    }

    if cli.write {
        session.save()?;
    } else if !result.changes.is_empty() {
        log::info!("dry run: pass --write to update {}", cli.file.display());
    }

    match (&cli.speech_out, &result.audio) {
        (Some(path), Some(audio)) => {
            std::fs::write(path, audio)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("explanation audio saved to {}", path.display());
        }
        (Some(_), None) => log::warn!("no explanation audio was produced"),
        _ => {}
    }

    Ok(())
}
