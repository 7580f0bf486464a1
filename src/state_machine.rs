//! Core studio state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! generation workflow and the scripted conversation share one state value
//! and one transition function.

mod conversation;
mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;
mod workflow;

#[cfg(test)]
mod proptests;

pub use effect::{download_file_name, DownloadRequest, Effect, DOWNLOAD_EXTENSION};
pub use event::Event;
pub use state::{
    ConversationState, GeneratedAvatar, Message, PendingReply, Phase, Sender, StudioContext,
    StudioState, WorkflowState, DEFAULT_GENERATE_DELAY, DEFAULT_REPLY_DELAY,
};
pub use transition::{transition, TransitionError, TransitionResult};
