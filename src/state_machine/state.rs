//! Studio state types

use crate::style::AvatarStyle;
use crate::upload::{UploadPolicy, UploadedImage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

// ============================================================================
// Generation Workflow
// ============================================================================

/// An avatar produced by a finished generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedAvatar {
    pub style: AvatarStyle,
    pub url: String,
}

impl GeneratedAvatar {
    /// Deterministic stand-in for real inference
    pub fn placeholder(style: AvatarStyle) -> Self {
        Self {
            style,
            url: style.placeholder_url().to_string(),
        }
    }
}

/// Lifecycle of a single avatar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing uploaded
    #[default]
    Empty,

    /// Photo uploaded, no avatar yet
    Uploaded { image: UploadedImage },

    /// Generation in flight
    Generating {
        image: UploadedImage,
        /// Style captured when generation started
        style: AvatarStyle,
        /// Identifies the in-flight generation; completions must match it
        ticket: u64,
        /// Avatar from the previous run, still shown while regenerating
        previous: Option<GeneratedAvatar>,
    },

    /// Avatar ready
    Generated {
        image: UploadedImage,
        avatar: GeneratedAvatar,
    },
}

/// Coarse phase of the workflow, without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Empty,
    Uploaded,
    Generating,
    Generated,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        match self {
            WorkflowState::Empty => Phase::Empty,
            WorkflowState::Uploaded { .. } => Phase::Uploaded,
            WorkflowState::Generating { .. } => Phase::Generating,
            WorkflowState::Generated { .. } => Phase::Generated,
        }
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        match self {
            WorkflowState::Empty => None,
            WorkflowState::Uploaded { image }
            | WorkflowState::Generating { image, .. }
            | WorkflowState::Generated { image, .. } => Some(image),
        }
    }

    /// The finished avatar, if generation has completed
    pub fn avatar(&self) -> Option<&GeneratedAvatar> {
        match self {
            WorkflowState::Generated { avatar, .. } => Some(avatar),
            _ => None,
        }
    }

    /// The avatar a UI should display: the finished one, or the previous
    /// one while a regeneration is running
    pub fn displayed_avatar(&self) -> Option<&GeneratedAvatar> {
        match self {
            WorkflowState::Generated { avatar, .. } => Some(avatar),
            WorkflowState::Generating { previous, .. } => previous.as_ref(),
            _ => None,
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, WorkflowState::Generating { .. })
    }
}

// ============================================================================
// Scripted Conversation
// ============================================================================

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    System,
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

/// A reply that has been promised but not yet delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingReply {
    pub ticket: u64,
    pub style: AvatarStyle,
}

/// Message log of an open chat panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    /// Replies in send order
    pending: VecDeque<PendingReply>,
    #[serde(skip)]
    next_message_id: u64,
}

impl ConversationState {
    /// Start a conversation with the greeting for `style`
    pub fn initialize(style: AvatarStyle, at: DateTime<Utc>) -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            pending: VecDeque::new(),
            next_message_id: 1,
        };
        conversation.append(style.greeting(), Sender::System, at);
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingReply> {
        self.pending.iter()
    }

    /// True while at least one reply is outstanding
    pub fn is_composing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn append(
        &mut self,
        text: impl Into<String>,
        sender: Sender,
        at: DateTime<Utc>,
    ) -> Message {
        let message = Message {
            id: self.next_message_id,
            text: text.into(),
            sender,
            timestamp: at,
        };
        self.next_message_id += 1;
        self.messages.push(message.clone());
        message
    }

    pub(crate) fn expect_reply(&mut self, reply: PendingReply) {
        self.pending.push_back(reply);
    }

    /// Remove the oldest pending reply if it carries `ticket`
    pub(crate) fn take_reply(&mut self, ticket: u64) -> Option<PendingReply> {
        if self.pending.front().is_some_and(|p| p.ticket == ticket) {
            self.pending.pop_front()
        } else {
            None
        }
    }
}

// ============================================================================
// Studio State
// ============================================================================

/// Everything the studio holds for one UI session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct StudioState {
    /// Currently selected style
    pub style: AvatarStyle,
    pub workflow: WorkflowState,
    /// Open chat panel, if any
    pub chat: Option<ConversationState>,
    #[serde(skip)]
    pub(crate) next_ticket: u64,
}

impl StudioState {
    pub fn phase(&self) -> Phase {
        self.workflow.phase()
    }

    pub fn uploaded_image(&self) -> Option<&UploadedImage> {
        self.workflow.image()
    }

    pub fn generated_avatar(&self) -> Option<&GeneratedAvatar> {
        self.workflow.avatar()
    }

    pub fn messages(&self) -> &[Message] {
        self.chat
            .as_ref()
            .map(ConversationState::messages)
            .unwrap_or_default()
    }

    pub fn is_composing(&self) -> bool {
        self.chat.as_ref().is_some_and(ConversationState::is_composing)
    }

    pub fn is_chat_open(&self) -> bool {
        self.chat.is_some()
    }

    pub(crate) fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }
}

/// Immutable configuration the transition function consults
#[derive(Debug, Clone)]
pub struct StudioContext {
    pub session_id: String,
    /// Simulated generation latency
    pub generate_delay: Duration,
    /// Simulated reply latency
    pub reply_delay: Duration,
    pub upload_policy: UploadPolicy,
    /// Reject uploads that break the policy instead of only warning
    pub strict_uploads: bool,
}

/// Default simulated generation latency
pub const DEFAULT_GENERATE_DELAY: Duration = Duration::from_millis(2000);

/// Default simulated reply latency
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);

impl StudioContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            generate_delay: DEFAULT_GENERATE_DELAY,
            reply_delay: DEFAULT_REPLY_DELAY,
            upload_policy: UploadPolicy::default(),
            strict_uploads: false,
        }
    }
}
