//! chordvoice — voice chord symbols from the command line.
//!
//! ```text
//! chordvoice voice Dm7 --style drop2 --inversion 1
//! chordvoice progression Dm7 G7 Cmaj7 --styles close,shell --range C3:C5
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::info;
use serde::Serialize;

use chordvoice::theory::Key;
use chordvoice::voicing::session::SessionStep;
use chordvoice::{ChordSpec, EngineConfig, PitchRange, Voicing, VoicingEngine, VoicingSession, VoicingStyle};

/// Chord voicing engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Voice a single chord symbol
    Voice(VoiceCommand),

    /// Voice a chord progression with voice leading between chords
    Progression(ProgressionCommand),
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
struct CommonArgs {
    /// Key context for spelling, e.g. "Eb" or "F#m"
    #[arg(short, long)]
    key: Option<Key>,

    /// Pitch range, e.g. "C3:C6" or "48:84"
    #[arg(short, long, default_value = "C3:C6")]
    range: PitchRange,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Override the tie-break seed from the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Engine config file (defaults to ~/.chordvoice/engine.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct VoiceCommand {
    /// Chord symbol, e.g. "Cmaj7" or "Bbm7b5"
    symbol: String,

    /// Voicing style (close, drop2, drop3, shell)
    #[arg(short, long, default_value = "close")]
    style: VoicingStyle,

    /// Chord degree to put in the bass (0 = root position)
    #[arg(short, long)]
    inversion: Option<usize>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct ProgressionCommand {
    /// Chord symbols in order
    #[arg(required = true)]
    symbols: Vec<String>,

    /// Enabled styles, comma separated; the smoothest one is used per chord
    #[arg(short, long, value_delimiter = ',', default_value = "close")]
    styles: Vec<VoicingStyle>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Serialize)]
struct StepOutput<'a> {
    symbol: &'a str,
    voicing: &'a Voicing,
    #[serde(skip_serializing_if = "Option::is_none")]
    movement: Option<i32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Voice(cmd) => run_voice(cmd),
        Commands::Progression(cmd) => run_progression(cmd),
    }
}

fn load_config(common: &CommonArgs) -> Result<EngineConfig> {
    let mut config = match &common.config {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::load().unwrap_or_default(),
    };
    if let Some(seed) = common.seed {
        config.seed = seed;
    }
    info!("engine config: {:?}", config);
    Ok(config)
}

fn parse_chord(symbol: &str, key: Option<Key>) -> Result<ChordSpec> {
    let chord = ChordSpec::from_symbol(symbol).with_context(|| format!("cannot read chord '{symbol}'"))?;
    Ok(match key {
        Some(key) => chord.with_key(key),
        None => chord,
    })
}

fn run_voice(cmd: VoiceCommand) -> Result<()> {
    let engine = VoicingEngine::with_config(load_config(&cmd.common)?);

    let mut chord = parse_chord(&cmd.symbol, cmd.common.key)?;
    if let Some(inversion) = cmd.inversion {
        chord = chord.with_inversion(inversion);
    }

    let voicing = engine
        .generate_voicing(&chord, cmd.style, cmd.common.range, None)
        .with_context(|| format!("cannot voice {} as {}", cmd.symbol, cmd.style))?;

    let output = StepOutput {
        symbol: &cmd.symbol,
        voicing: &voicing,
        movement: None,
    };
    match cmd.common.format {
        OutputFormat::Text => print_voicing(&output),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&output)?),
    }
    Ok(())
}

fn run_progression(cmd: ProgressionCommand) -> Result<()> {
    if cmd.styles.is_empty() {
        bail!("at least one style is required");
    }
    let engine = VoicingEngine::with_config(load_config(&cmd.common)?);

    let chords = cmd
        .symbols
        .iter()
        .map(|symbol| parse_chord(symbol, cmd.common.key))
        .collect::<Result<Vec<_>>>()?;

    let mut session = VoicingSession::new(&engine, cmd.styles.clone(), cmd.common.range);
    let mut steps: Vec<SessionStep> = Vec::with_capacity(chords.len());
    for (symbol, chord) in cmd.symbols.iter().zip(&chords) {
        let step = session
            .next(chord)
            .with_context(|| format!("cannot voice {symbol} in {}", cmd.common.range))?;
        steps.push(step);
    }

    let outputs: Vec<StepOutput<'_>> = cmd
        .symbols
        .iter()
        .zip(&steps)
        .map(|(symbol, step)| StepOutput {
            symbol,
            voicing: &step.voicing,
            movement: step.movement,
        })
        .collect();

    match cmd.common.format {
        OutputFormat::Text => {
            for output in &outputs {
                print_voicing(output);
            }
            let total: i32 = steps.iter().filter_map(|s| s.movement).sum();
            println!("total movement: {total} semitones");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outputs)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&outputs)?),
    }
    Ok(())
}

fn print_voicing(output: &StepOutput<'_>) {
    let v = output.voicing;
    let midi: Vec<String> = v.midi().iter().map(u8::to_string).collect();
    print!(
        "{:<8} {:<6} inv {}  {:<24} ({})",
        output.symbol,
        v.style.name(),
        v.inversion,
        v.labels().join(" "),
        midi.join(" ")
    );
    if let Some(movement) = output.movement {
        print!("  moves {movement}");
    }
    if v.quality_warning {
        print!("  [spacing warning: max gap {}, spread {}]", v.quality.max_gap, v.quality.total_spread);
    }
    println!();
}
