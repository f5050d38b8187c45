//! Per-subject record of completed stages, used by `--resume`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Version for checkpoint format compatibility
pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    pub version: u32,
    pub subject: String,
    pub completed: Vec<CompletedStage>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedStage {
    pub name: String,
    pub completed_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(subject: &str) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            subject: subject.to_string(),
            completed: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_complete(&self, stage: &str) -> bool {
        self.completed.iter().any(|s| s.name == stage)
    }

    /// Record `stage` as complete, replacing an earlier record of it.
    pub fn mark_complete(&mut self, stage: &str) {
        let now = Utc::now();
        self.completed.retain(|s| s.name != stage);
        self.completed.push(CompletedStage {
            name: stage.to_string(),
            completed_at: now,
        });
        self.updated_at = now;
    }
}

/// Loads and saves the checkpoint file of one subject.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint, or start a fresh one when none exists or the
    /// stored one belongs to another subject.
    pub async fn load(&self, subject: &str) -> Result<Checkpoint> {
        if !self.path.exists() {
            debug!("No checkpoint at {}", self.path.display());
            return Ok(Checkpoint::new(subject));
        }

        let content = fs::read_to_string(&self.path).await?;
        let checkpoint: Checkpoint = serde_json::from_str(&content)?;

        if checkpoint.version > CHECKPOINT_VERSION {
            return Err(Error::Config(format!(
                "Checkpoint version {} is newer than supported version {}",
                checkpoint.version, CHECKPOINT_VERSION
            )));
        }
        if checkpoint.subject != subject {
            warn!(
                "Ignoring checkpoint for subject '{}' at {}",
                checkpoint.subject,
                self.path.display()
            );
            return Ok(Checkpoint::new(subject));
        }

        info!(
            "Loaded checkpoint with {} completed stages",
            checkpoint.completed.len()
        );
        Ok(checkpoint)
    }

    /// Write through a temp file and rename.
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let temp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(checkpoint)?;
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.path).await?;
        debug!("Saved checkpoint to {}", self.path.display());
        Ok(())
    }
}
