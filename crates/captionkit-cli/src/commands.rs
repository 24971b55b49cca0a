//! Command handlers.
//!
//! Each handler loads the session, applies one caption store operation and
//! saves the session again. Store and codec errors are returned unchanged.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use captionkit_core::captions::{
    export_vtt, format_timestamp, parse_timestamp, parse_vtt, CaptionField, CaptionStore,
    FieldValue,
};
use captionkit_core::TimeSec;
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::{Cli, Command, ConfigAction};
use crate::fsutil::write_atomic;
use crate::seed::{seed_examples, EXAMPLE_VIDEO_URL};
use crate::session::Session;
use crate::settings::{Settings, SettingsManager};

/// Errors raised by the CLI itself
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Session file already exists: {0} (use --force to overwrite)")]
    SessionExists(PathBuf),

    #[error("Nothing to export: the session has no captions")]
    NothingToExport,

    #[error("Invalid time '{0}': expected MM:SS.mmm or seconds")]
    InvalidTime(String),
}

/// Parses a playback time given as `MM:SS.mmm` or plain seconds
pub fn parse_time_arg(value: &str) -> Result<TimeSec> {
    if value.contains(':') {
        return Ok(parse_timestamp(value)?);
    }
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| CliError::InvalidTime(value.to_string()).into())
}

/// Runs one CLI invocation, writing user-facing output to `out`
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let settings_manager = SettingsManager::new(&cli.config_dir());
    let settings = settings_manager.load();
    let session_path = cli
        .session
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.general.default_session_file));

    match cli.command {
        Command::New {
            video,
            no_seed,
            force,
        } => cmd_new(&settings_manager, settings, &session_path, video, no_seed, force, out),
        Command::Add { at, text } => cmd_add(&session_path, &at, text, out),
        Command::Set { id, field, value } => cmd_set(&session_path, &id, field, &value),
        Command::Retime { id, start, end } => cmd_retime(&session_path, &id, &start, &end),
        Command::Delete { id } => cmd_delete(&session_path, &id),
        Command::List { json } => cmd_list(&session_path, json, out),
        Command::Active { time } => cmd_active(&session_path, &time, out),
        Command::Export { output } => cmd_export(&settings, &session_path, output, out),
        Command::Import { file, replace } => cmd_import(&session_path, &file, replace, out),
        Command::Config { action } => cmd_config(&settings_manager, settings, action, out),
    }
}

fn cmd_new(
    settings_manager: &SettingsManager,
    mut settings: Settings,
    path: &Path,
    video: Option<String>,
    no_seed: bool,
    force: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::SessionExists(path.to_path_buf()).into());
    }

    let seed = !no_seed && !settings.general.has_seeded_examples;
    let video = match video {
        Some(url) => Some(url),
        None if seed => Some(EXAMPLE_VIDEO_URL.to_string()),
        None => None,
    };

    let mut session = Session::create(path, video);
    if seed {
        seed_examples(&mut session.store)?;
    }
    session.save()?;

    if seed {
        settings.general.has_seeded_examples = true;
        settings_manager.save(&settings)?;
        info!("Seeded session with example captions");
    }

    writeln!(
        out,
        "Created {} ({} captions)",
        path.display(),
        session.store.len()
    )?;
    Ok(())
}

fn cmd_add(path: &Path, at: &str, text: Option<String>, out: &mut dyn Write) -> Result<()> {
    let mut session = Session::load(path)?;
    let at = parse_time_arg(at)?;

    let id = session.store.add(at)?.id;
    if let Some(text) = text {
        session.store.set_text(&id, text)?;
    }
    session.save()?;

    writeln!(out, "{}", id)?;
    Ok(())
}

fn cmd_set(path: &Path, id: &str, field: CaptionField, value: &str) -> Result<()> {
    let mut session = Session::load(path)?;

    // Timestamps go through the strict parser; anything else is left to the
    // store's own coercion.
    let value = if field.is_numeric() && value.contains(':') {
        FieldValue::Number(parse_timestamp(value)?)
    } else {
        FieldValue::Text(value.to_string())
    };

    session.store.update(id, field, value)?;
    session.save()
}

fn cmd_retime(path: &Path, id: &str, start: &str, end: &str) -> Result<()> {
    let mut session = Session::load(path)?;
    let start = parse_time_arg(start)?;
    let end = parse_time_arg(end)?;

    session.store.update_time_range(id, start, end)?;
    session.save()
}

fn cmd_delete(path: &Path, id: &str) -> Result<()> {
    let mut session = Session::load(path)?;

    match session.store.delete(id) {
        Some(_) => session.save(),
        None => {
            info!(caption_id = %id, "No caption with this id, nothing deleted");
            Ok(())
        }
    }
}

fn cmd_list(path: &Path, json: bool, out: &mut dyn Write) -> Result<()> {
    let session = Session::load(path)?;
    let captions = session.store.list();

    if json {
        serde_json::to_writer_pretty(&mut *out, &captions)?;
        writeln!(out)?;
        return Ok(());
    }

    for (index, caption) in captions.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {} --> {}  {}  {}",
            index + 1,
            format_timestamp(caption.start_time),
            format_timestamp(caption.end_time),
            caption.id,
            caption.text.replace('\n', "\\n")
        )?;
    }
    Ok(())
}

fn cmd_active(path: &Path, time: &str, out: &mut dyn Write) -> Result<()> {
    let session = Session::load(path)?;
    let time = parse_time_arg(time)?;

    writeln!(out, "{}", session.store.active_at(time))?;
    Ok(())
}

fn cmd_export(
    settings: &Settings,
    path: &Path,
    output: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<()> {
    let session = Session::load(path)?;
    if session.store.is_empty() && settings.export.refuse_empty {
        return Err(CliError::NothingToExport.into());
    }

    let vtt = export_vtt(&session.store.list());
    let output = output.unwrap_or_else(|| PathBuf::from(&settings.export.default_file_name));

    if output.as_os_str() == "-" {
        out.write_all(vtt.as_bytes())?;
        return Ok(());
    }

    write_atomic(&output, vtt.as_bytes())?;
    info!(path = %output.display(), captions = session.store.len(), "Exported WebVTT");
    writeln!(out, "Wrote {}", output.display())?;
    Ok(())
}

fn cmd_import(path: &Path, file: &Path, replace: bool, out: &mut dyn Write) -> Result<()> {
    let mut session = Session::load(path)?;

    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let captions = parse_vtt(&content)?;

    if replace {
        if !session.store.is_empty() {
            warn!(
                removed = session.store.len(),
                "Replacing existing captions"
            );
        }
        session.store = CaptionStore::new();
    }
    let ids = session.store.extend_from(captions)?;
    session.save()?;

    writeln!(out, "Imported {} captions", ids.len())?;
    Ok(())
}

fn cmd_config(
    settings_manager: &SettingsManager,
    settings: Settings,
    action: ConfigAction,
    out: &mut dyn Write,
) -> Result<()> {
    let settings = match action {
        ConfigAction::Show => settings,
        ConfigAction::Reset => settings_manager.reset()?,
    };

    serde_json::to_writer_pretty(&mut *out, &settings)?;
    writeln!(out)?;
    Ok(())
}
