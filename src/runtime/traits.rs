//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::state_machine::DownloadRequest;
use crate::style::AvatarStyle;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;

/// Receiver of avatar downloads (the client-side save)
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, request: &DownloadRequest) -> Result<(), String>;
}

/// Source of wall-clock time for message timestamps and download names
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Chooses which canned reply to send
pub trait ReplyPicker: Send {
    /// Index into `replies`, which is never empty
    fn pick(&mut self, style: AvatarStyle, replies: &[&'static str]) -> usize;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: DownloadSink + ?Sized> DownloadSink for Arc<T> {
    async fn save(&self, request: &DownloadRequest) -> Result<(), String> {
        (**self).save(request).await
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Uniform choice over the canned replies
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of picks
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ReplyPicker for RandomPicker {
    fn pick(&mut self, _style: AvatarStyle, replies: &[&'static str]) -> usize {
        self.rng.gen_range(0..replies.len())
    }
}

/// Sink that only records the download in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl DownloadSink for TracingSink {
    async fn save(&self, request: &DownloadRequest) -> Result<(), String> {
        tracing::info!(
            file_name = %request.file_name,
            style = %request.avatar.style,
            url = %request.avatar.url,
            "Avatar download triggered"
        );
        Ok(())
    }
}

/// Sink that writes a JSON manifest per download into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where the manifest for `request` lands
    pub fn manifest_path(&self, request: &DownloadRequest) -> PathBuf {
        self.dir.join(format!("{}.json", request.file_name))
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, request: &DownloadRequest) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| format!("Failed to create {}: {e}", self.dir.display()))?;
        let path = self.manifest_path(request);
        let body = serde_json::to_vec_pretty(request).map_err(|e| e.to_string())?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        tracing::info!(path = %path.display(), "Avatar download saved");
        Ok(())
    }
}
