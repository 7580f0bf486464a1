//! Events that drive the studio

use crate::style::AvatarStyle;
use crate::upload::UploadedImage;
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
///
/// Anything time- or randomness-dependent arrives already resolved, so the
/// transition function stays pure.
#[derive(Debug, Clone)]
pub enum Event {
    // Workflow events
    Upload {
        image: UploadedImage,
    },
    SelectStyle {
        style: AvatarStyle,
    },
    Generate,
    Reset,
    Download {
        at: DateTime<Utc>,
    },

    // Timer events
    GenerationComplete {
        ticket: u64,
    },
    ReplyReady {
        ticket: u64,
        text: String,
        at: DateTime<Utc>,
    },

    // Conversation events
    OpenChat {
        at: DateTime<Utc>,
    },
    CloseChat,
    ToggleChat {
        at: DateTime<Utc>,
    },
    SendMessage {
        text: String,
        at: DateTime<Utc>,
    },
    RequestRegeneration,
}

impl Event {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::Upload { .. } => "upload",
            Event::SelectStyle { .. } => "select_style",
            Event::Generate => "generate",
            Event::Reset => "reset",
            Event::Download { .. } => "download",
            Event::GenerationComplete { .. } => "generation_complete",
            Event::ReplyReady { .. } => "reply_ready",
            Event::OpenChat { .. } => "open_chat",
            Event::CloseChat => "close_chat",
            Event::ToggleChat { .. } => "toggle_chat",
            Event::SendMessage { .. } => "send_message",
            Event::RequestRegeneration => "request_regeneration",
        }
    }
}
