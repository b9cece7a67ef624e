//! Logic behind the `deluge-patch` command.
//!
//! Argument types are clap derives; each command is a plain function that
//! returns the text to print, so tests drive them without a process.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use thiserror::Error;

use crate::config::EditorConfig;
use crate::error::{ConfigError, SessionError};
use crate::overlay::Overlay;
use crate::samples::SampleRemap;
use crate::session::Session;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// ── Arguments ─────────────────────────────────────────────────────────────

/// Inspect and edit Deluge synth and kit patches without disturbing
/// anything the editor does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "deluge-patch")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Editor config file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log more; repeat for debug output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CliArgs {
    /// 0 = warnings, 1 = info, 2+ = debug, negative = errors only.
    pub fn verbosity(&self) -> i8 {
        if self.quiet {
            -1
        } else {
            i8::try_from(self.verbose).unwrap_or(i8::MAX)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Parse and re-serialize files, reporting any that would change
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Patch type, format version, sounds and kit rows as JSON
    Info { file: PathBuf },

    /// Read one field of a sound
    Get {
        file: PathBuf,
        sound: usize,
        field: String,
    },

    /// Write one field of a sound
    Set {
        file: PathBuf,
        sound: usize,
        field: String,
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Write the result here instead of over the input
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// The patch cables of a sound as JSON
    Cables { file: PathBuf, sound: usize },

    /// Sample paths the patch references, as JSON
    Samples { file: PathBuf },

    /// Point every reference to sample `from` at `to`
    Relink {
        file: PathBuf,
        from: String,
        to: String,

        /// Write the result here instead of over the input
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

// ── Logging ───────────────────────────────────────────────────────────────

/// Install the stderr log subscriber. A `log_level` from the config wins
/// over the verbosity flags.
pub fn init_logging(verbosity: i8, config_level: Option<&str>) {
    let level = match verbosity {
        v if v < 0 => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_new(config_level.unwrap_or(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// ── Commands ──────────────────────────────────────────────────────────────

/// Whether `path` survives a parse/serialize cycle unchanged.
pub fn check_file(path: &Path) -> Result<bool, CliError> {
    let original = std::fs::read(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let session = Session::open(path)?;
    let same = session.serialize()? == original;
    if !same {
        tracing::warn!(path = %path.display(), "round trip changed the file");
    }
    Ok(same)
}

pub fn info_json(path: &Path) -> Result<String, CliError> {
    let mut session = Session::open(path)?;
    let version = session.version_info()?;
    let rows = session.kit_rows()?;
    let mut sounds = Vec::new();
    for index in 0..session.sound_count()? {
        let handle = session.sound(index)?;
        let variant = handle.variant()?;
        sounds.push(json!({
            "index": index,
            "variant": variant.to_string(),
            "name": handle.get("name").ok(),
            "cables": handle.routes()?.len(),
            "fields": handle.fields()?.len(),
        }));
    }
    Ok(serde_json::to_string_pretty(&json!({
        "version": version,
        "sounds": sounds,
        "rows": rows,
    }))?)
}

pub fn get_field(
    path: &Path,
    sound: usize,
    field: &str,
    overlay: Overlay,
) -> Result<String, CliError> {
    let mut session = Session::open(path)?.with_overlay(overlay);
    let handle = session.sound(sound)?;
    let value = handle.get(field)?;
    let raw = handle.get_raw(field)?;
    Ok(serde_json::to_string(&json!({
        "field": field,
        "value": value,
        "raw": raw,
    }))?)
}

/// Set a field and save, to `out` when given. Returns whether anything
/// changed.
pub fn set_field(
    path: &Path,
    sound: usize,
    field: &str,
    input: &str,
    out: Option<&Path>,
    overlay: Overlay,
) -> Result<bool, CliError> {
    let mut session = Session::open(path)?.with_overlay(overlay);
    let changed = session.set_input(sound, field, input)?;
    match out {
        Some(out) => session.save_as(out)?,
        None if changed => session.save()?,
        None => {}
    }
    Ok(changed)
}

pub fn cables_json(path: &Path, sound: usize) -> Result<String, CliError> {
    let mut session = Session::open(path)?;
    let cables = session.sound(sound)?.routes()?;
    Ok(serde_json::to_string_pretty(&cables)?)
}

pub fn samples_json(path: &Path) -> Result<String, CliError> {
    let session = Session::open(path)?;
    Ok(serde_json::to_string_pretty(&session.sample_paths()?)?)
}

/// Replace sample path `from` with `to` and save, to `out` when given.
/// Returns how many references changed.
pub fn relink_sample(
    path: &Path,
    from: &str,
    to: &str,
    out: Option<&Path>,
) -> Result<usize, CliError> {
    let mut session = Session::open(path)?;
    let mut remap = SampleRemap::new();
    remap.insert(from, to);
    let changed = session.remap_samples(&remap)?;
    match out {
        Some(out) => session.save_as(out)?,
        None if changed > 0 => session.save()?,
        None => {}
    }
    Ok(changed)
}

/// Run a parsed command. Returns the text to print and whether the command
/// succeeded.
pub fn run(args: &CliArgs) -> Result<(String, bool), CliError> {
    let config = match &args.config {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };
    let overlay = Overlay::with_config(&config)?;
    match &args.command {
        Command::Check { files } => {
            let mut lines = Vec::new();
            let mut all_ok = true;
            for file in files {
                let line = match check_file(file) {
                    Ok(true) => format!("ok       {}", file.display()),
                    Ok(false) => {
                        all_ok = false;
                        format!("CHANGED  {}", file.display())
                    }
                    Err(e) => {
                        all_ok = false;
                        format!("ERROR    {}: {e}", file.display())
                    }
                };
                lines.push(line);
            }
            Ok((lines.join("\n"), all_ok))
        }
        Command::Info { file } => Ok((info_json(file)?, true)),
        Command::Get { file, sound, field } => {
            Ok((get_field(file, *sound, field, overlay)?, true))
        }
        Command::Set {
            file,
            sound,
            field,
            value,
            out,
        } => {
            let changed = set_field(file, *sound, field, value, out.as_deref(), overlay)?;
            let msg = if changed { "updated" } else { "unchanged" };
            Ok((format!("{field}: {msg}"), true))
        }
        Command::Cables { file, sound } => Ok((cables_json(file, *sound)?, true)),
        Command::Samples { file } => Ok((samples_json(file)?, true)),
        Command::Relink { file, from, to, out } => {
            let changed = relink_sample(file, from, to, out.as_deref())?;
            Ok((format!("{from}: {changed} reference(s) relinked"), true))
        }
    }
}
