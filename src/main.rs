use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use lubankit::{
    event_bus, init_event_bus, init_logging_with, log_events, parse_script, Config, Editor,
    EventBusConfig, LogFormat, Replayer,
};

/// Replay a JSON script of editor actions against a headless editor.
#[derive(Debug, Parser)]
#[command(name = "lubankit", version)]
struct Cli {
    /// Script to replay
    script: PathBuf,

    /// Configuration file (JSON or TOML); defaults to the user config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging_with(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })?;

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let input = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading script {}", cli.script.display()))?;
    let steps = parse_script(&input)
        .with_context(|| format!("parsing script {}", cli.script.display()))?;
    tracing::info!("Replaying {} step(s) from {}", steps.len(), cli.script.display());

    init_event_bus(EventBusConfig::default())
        .map_err(|_| anyhow::anyhow!("event bus already initialized"))?;
    let bus = event_bus();
    log_events(&bus);

    let mut replayer = Replayer::new(Editor::with_event_bus(config, bus));
    let reports = replayer.run(steps)?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
