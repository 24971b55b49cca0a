//! Session Files
//!
//! Saves and restores one editing session: the caption list plus the video it
//! belongs to. Captions are written in timeline order and validated again on
//! load; a file that does not describe a valid timeline is rejected.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use captionkit_core::captions::{Caption, CaptionStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fsutil::write_atomic;

/// Session file format version
pub const SESSION_VERSION: u32 = 1;

/// On-disk session layout
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionData {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    /// Timestamp of the last save (RFC 3339)
    saved_at: String,
    captions: Vec<Caption>,
}

/// An editing session backed by a file
#[derive(Debug)]
pub struct Session {
    pub path: PathBuf,
    pub video_url: Option<String>,
    pub store: CaptionStore,
}

impl Session {
    /// Creates an empty, unsaved session
    pub fn create(path: &Path, video_url: Option<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            video_url,
            store: CaptionStore::new(),
        }
    }

    /// Loads a session file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Session file not found: {} (run `captionkit new` first)",
                path.display()
            );
        }

        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let data: SessionData = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse session file {}", path.display()))?;

        if data.version > SESSION_VERSION {
            bail!(
                "Session file version {} is newer than supported version {}",
                data.version,
                SESSION_VERSION
            );
        }

        let store = CaptionStore::from_captions(data.captions)
            .with_context(|| format!("Invalid captions in {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            video_url: data.video_url,
            store,
        })
    }

    /// Saves the session atomically
    pub fn save(&self) -> Result<()> {
        let data = SessionData {
            version: SESSION_VERSION,
            video_url: self.video_url.clone(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            captions: self.store.list(),
        };

        let content =
            serde_json::to_string_pretty(&data).context("Failed to serialize session")?;
        write_atomic(&self.path, content.as_bytes())?;

        info!(
            path = %self.path.display(),
            captions = self.store.len(),
            "Session saved"
        );
        Ok(())
    }
}
