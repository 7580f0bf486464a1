//! Effects produced by state transitions

use crate::state_machine::state::{GeneratedAvatar, Message};
use crate::style::AvatarStyle;
use crate::upload::UploadAdvisory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// A client-side save of the generated avatar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub file_name: String,
    pub avatar: GeneratedAvatar,
    pub requested_at: DateTime<Utc>,
}

/// Extension of every saved avatar
pub const DOWNLOAD_EXTENSION: &str = "jpg";

impl DownloadRequest {
    /// The file is named after `style`, the selection at download time,
    /// which may differ from the style the avatar was generated in
    pub fn new(avatar: GeneratedAvatar, style: AvatarStyle, at: DateTime<Utc>) -> Self {
        Self {
            file_name: download_file_name(style, at),
            avatar,
            requested_at: at,
        }
    }
}

/// `avatar-<style>-<epoch-millis>.jpg`
pub fn download_file_name(style: AvatarStyle, at: DateTime<Utc>) -> String {
    format!(
        "avatar-{}-{}.{DOWNLOAD_EXTENSION}",
        style.as_str(),
        at.timestamp_millis()
    )
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start the simulated generation timer
    ScheduleGeneration {
        ticket: u64,
        style: AvatarStyle,
        delay: Duration,
    },

    /// Abort the in-flight generation timer
    CancelGeneration,

    /// Queue a canned reply behind any already pending
    ScheduleReply {
        ticket: u64,
        style: AvatarStyle,
        delay: Duration,
    },

    /// Drop every pending reply
    CancelReplies,

    /// Hand the avatar to the download sink
    Download(DownloadRequest),

    /// Upload fell outside the advertised limits
    ReportAdvisories(Vec<UploadAdvisory>),

    /// Tell observers about a freshly appended message
    NotifyMessage(Message),

    /// Tell observers the avatar is ready
    NotifyAvatarReady(GeneratedAvatar),

    /// Publish the new state to observers
    PublishState,
}

impl Effect {
    pub fn schedule_generation(ticket: u64, style: AvatarStyle, delay: Duration) -> Self {
        Effect::ScheduleGeneration {
            ticket,
            style,
            delay,
        }
    }

    pub fn schedule_reply(ticket: u64, style: AvatarStyle, delay: Duration) -> Self {
        Effect::ScheduleReply {
            ticket,
            style,
            delay,
        }
    }
}
