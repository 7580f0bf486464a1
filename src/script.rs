//! Line-oriented session scripts for the demo binary
//!
//! One command per line; blank lines and `#` comments are skipped.

use crate::error::StudioResult;
use crate::runtime::StudioHandle;
use crate::style::{AvatarStyle, UnknownStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Upload(PathBuf),
    Style(AvatarStyle),
    Generate,
    Regenerate,
    Reset,
    Download,
    Chat,
    Send(String),
    Wait(Duration),
    State,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Style(#[from] UnknownStyle),
    #[error("invalid wait duration: {0}")]
    InvalidWait(String),
}

impl FromStr for ScriptCommand {
    type Err = ScriptError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let required = |name: &'static str| {
            if rest.is_empty() {
                Err(ScriptError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "upload" => Ok(ScriptCommand::Upload(PathBuf::from(required("upload")?))),
            "style" => Ok(ScriptCommand::Style(required("style")?.parse()?)),
            "generate" => Ok(ScriptCommand::Generate),
            "regenerate" => Ok(ScriptCommand::Regenerate),
            "reset" => Ok(ScriptCommand::Reset),
            "download" => Ok(ScriptCommand::Download),
            "chat" => Ok(ScriptCommand::Chat),
            // Blank text is passed through; the studio ignores it
            "send" => Ok(ScriptCommand::Send(rest.to_string())),
            "wait" => {
                let raw = required("wait")?;
                raw.parse::<u64>()
                    .map(|ms| ScriptCommand::Wait(Duration::from_millis(ms)))
                    .map_err(|_| ScriptError::InvalidWait(raw.to_string()))
            }
            "state" => Ok(ScriptCommand::State),
            other => Err(ScriptError::UnknownCommand(other.to_string())),
        }
    }
}

/// Parse a script line, skipping blanks and comments
pub fn parse_line(line: &str) -> Option<Result<ScriptCommand, ScriptError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        None
    } else {
        Some(trimmed.parse())
    }
}

/// Run one command against the studio. `State` prints the snapshot as JSON.
pub async fn execute(handle: &StudioHandle, command: ScriptCommand) -> StudioResult<()> {
    match command {
        ScriptCommand::Upload(path) => handle.upload_file(path).await,
        ScriptCommand::Style(style) => handle.select_style(style).await,
        ScriptCommand::Generate => handle.generate().await,
        ScriptCommand::Regenerate => handle.request_regeneration().await,
        ScriptCommand::Reset => handle.reset().await,
        ScriptCommand::Download => handle.download().await,
        ScriptCommand::Chat => handle.toggle_chat().await,
        ScriptCommand::Send(text) => handle.send_message(text).await,
        ScriptCommand::Wait(duration) => {
            tokio::time::sleep(duration).await;
            Ok(())
        }
        ScriptCommand::State => {
            let snapshot = handle.snapshot();
            match serde_json::to_string(&snapshot) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "Failed to serialize state"),
            }
            Ok(())
        }
    }
}
