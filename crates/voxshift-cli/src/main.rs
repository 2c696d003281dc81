//! voxshift: apply voice effects to WAV files from the command line

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voxshift_core::{EffectKind, EffectPreset};
use voxshift_services::{export_clip, EffectOutcome, VoiceSession};

#[derive(Parser, Debug)]
#[command(name = "voxshift", author, version, about)]
struct Cli {
    /// Config file (default: <config dir>/voxshift/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply one or more effects to a WAV file and write the result
    Apply {
        input: PathBuf,

        /// Effect name; repeat to chain effects in order
        #[arg(long = "effect", short = 'e')]
        effects: Vec<String>,

        /// Output directory (overrides config)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        custom: CustomPreset,
    },
    /// List the built-in presets
    Presets {
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location
    ConfigPath,
}

/// Ad-hoc preset applied after any named effects
#[derive(clap::Args, Debug, Default)]
struct CustomPreset {
    /// Resampling index multiplier
    #[arg(long)]
    pitch: Option<f64>,
    /// Playback-rate multiplier
    #[arg(long)]
    speed: Option<f64>,
    /// Echo tap mix, 0..=1
    #[arg(long)]
    echo: Option<f64>,
}

impl CustomPreset {
    fn to_preset(&self) -> anyhow::Result<Option<EffectPreset>> {
        if self.pitch.is_none() && self.speed.is_none() && self.echo.is_none() {
            return Ok(None);
        }
        let preset = EffectPreset::custom(
            self.pitch.unwrap_or(1.0),
            self.speed.unwrap_or(1.0),
            self.echo.unwrap_or(0.0),
            0.0,
        )?;
        Ok(Some(preset))
    }
}

#[derive(Serialize)]
struct PresetEntry {
    name: &'static str,
    #[serde(flatten)]
    preset: EffectPreset,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let config = config::load_config(&config_path);

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(
                config.log.filter
                    .parse::<tracing_subscriber::filter::Directive>()
                    .context("invalid log filter in config")?,
            ))
        .init();

    tracing::debug!(config = %config_path.display(), "Loaded configuration");

    match cli.command {
        Command::Apply { input, effects, out_dir, custom } => {
            let custom = custom.to_preset()?;
            let effects = if effects.is_empty() && custom.is_none() {
                vec![config.output.default_effect.clone()]
            } else {
                effects
            };
            let out_dir = out_dir.unwrap_or_else(|| config.output.dir.clone());
            let path = apply(&input, &effects, custom.as_ref(), &out_dir)?;
            println!("{}", path.display());
        }
        Command::Presets { json } => print_presets(json)?,
        Command::ConfigPath => println!("{}", config_path.display()),
    }
    Ok(())
}

fn apply(
    input: &Path,
    effects: &[String],
    custom: Option<&EffectPreset>,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let bytes = std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let mut session = VoiceSession::new();
    session
        .load_clip(bytes, media_type_for(input))
        .with_context(|| format!("cannot load {}", input.display()))?;

    for name in effects {
        let outcome = session
            .select_effect_by_name(name)
            .with_context(|| format!("failed to apply effect '{name}'"))?;
        if let EffectOutcome::Applied { effect, frames } = outcome {
            eprintln!("{} effect applied ({frames} frames)", effect.display_name());
        }
    }

    if let Some(preset) = custom {
        let frames = session.apply_preset(preset).context("failed to apply custom preset")?;
        eprintln!("Custom preset applied ({frames} frames)");
    }

    let path = export_clip(&session, out_dir, chrono::Utc::now())
        .with_context(|| format!("failed to export to {}", out_dir.display()))?;
    Ok(path)
}

/// Guess a media type from the file extension
fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "wav" | "wave" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

fn print_presets(json: bool) -> anyhow::Result<()> {
    if json {
        let entries: Vec<PresetEntry> = EffectKind::ALL
            .into_iter()
            .map(|kind| PresetEntry { name: kind.name(), preset: kind.preset() })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:<10} {:>6} {:>6} {:>6} {:>10}", "name", "pitch", "speed", "echo", "distortion");
    for kind in EffectKind::ALL {
        let p = kind.preset();
        println!(
            "{:<10} {:>6} {:>6} {:>6} {:>10}",
            kind.name(), p.pitch_factor, p.speed_factor, p.echo_mix, p.distortion
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_for() {
        assert_eq!(media_type_for(Path::new("take.WAV")), "audio/wav");
        assert_eq!(media_type_for(Path::new("clip.webm")), "audio/webm");
        assert_eq!(media_type_for(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(media_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_parse_chained_effects() {
        let cli = Cli::try_parse_from(["voxshift", "apply", "in.wav", "-e", "robot", "--effect", "echo"]).unwrap();
        match cli.command {
            Command::Apply { input, effects, out_dir, custom } => {
                assert_eq!(input, PathBuf::from("in.wav"));
                assert_eq!(effects, vec!["robot", "echo"]);
                assert!(out_dir.is_none());
                assert!(custom.to_preset().unwrap().is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_custom_preset_flags() {
        let cli = Cli::try_parse_from(["voxshift", "apply", "in.wav", "--speed", "2", "--echo", "0.5"]).unwrap();
        let Command::Apply { custom, .. } = cli.command else { panic!("expected apply") };
        let preset = custom.to_preset().unwrap().unwrap();
        assert_eq!(preset.pitch_factor, 1.0);
        assert_eq!(preset.speed_factor, 2.0);
        assert_eq!(preset.echo_mix, 0.5);

        let bad = CustomPreset { speed: Some(0.0), ..Default::default() };
        assert!(bad.to_preset().is_err());
    }

    #[test]
    fn test_preset_json_shape() {
        let entry = PresetEntry { name: "echo", preset: EffectKind::Echo.preset() };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["name"], "echo");
        assert_eq!(value["echo_mix"], 0.8);
        assert_eq!(value["pitch_factor"], 1.0);
    }
}
