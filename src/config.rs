//! Studio configuration from the environment

use crate::runtime::RandomPicker;
use crate::state_machine::{StudioContext, DEFAULT_GENERATE_DELAY, DEFAULT_REPLY_DELAY};
use crate::upload::{UploadPolicy, DEFAULT_MAX_UPLOAD_BYTES};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings, read from `AVATAR_*` variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub generate_delay: Duration,
    pub reply_delay: Duration,
    /// Seed for reply selection; random when unset
    pub reply_seed: Option<u64>,
    pub strict_uploads: bool,
    pub max_upload_bytes: usize,
    /// Where downloads are written; logged only when unset
    pub download_dir: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            generate_delay: DEFAULT_GENERATE_DELAY,
            reply_delay: DEFAULT_REPLY_DELAY,
            reply_seed: None,
            strict_uploads: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            download_dir: None,
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            generate_delay: parse_var(&lookup, "AVATAR_GENERATE_DELAY_MS")
                .map_or(defaults.generate_delay, Duration::from_millis),
            reply_delay: parse_var(&lookup, "AVATAR_REPLY_DELAY_MS")
                .map_or(defaults.reply_delay, Duration::from_millis),
            reply_seed: parse_var(&lookup, "AVATAR_REPLY_SEED"),
            strict_uploads: lookup("AVATAR_STRICT_UPLOADS")
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes" | "on")),
            max_upload_bytes: parse_var(&lookup, "AVATAR_MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
            download_dir: lookup("AVATAR_DOWNLOAD_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn context(&self, session_id: impl Into<String>) -> StudioContext {
        let mut context = StudioContext::new(session_id);
        context.generate_delay = self.generate_delay;
        context.reply_delay = self.reply_delay;
        context.strict_uploads = self.strict_uploads;
        context.upload_policy = UploadPolicy {
            max_bytes: self.max_upload_bytes,
            ..UploadPolicy::default()
        };
        context
    }

    pub fn picker(&self) -> RandomPicker {
        self.reply_seed
            .map_or_else(RandomPicker::from_entropy, RandomPicker::seeded)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}
