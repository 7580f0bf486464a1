//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result. Timers, clocks and randomness live in the runtime.

use super::{conversation, workflow, Effect, Event, StudioContext, StudioState};
use crate::upload::UploadAdvisory;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: StudioState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: StudioState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event is ignored
///
/// The runtime treats every variant as a silent no-op; callers that want to
/// surface validation to a user can inspect them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("No photo has been uploaded")]
    NoUploadedImage,
    #[error("No avatar has been generated")]
    NotGenerated,
    #[error("Avatar generation already in progress")]
    AlreadyGenerating,
    #[error("Message is empty")]
    EmptyInput,
    #[error("Chat is not available")]
    ChatUnavailable,
    #[error("Chat is already open")]
    ChatAlreadyOpen,
    #[error("Upload rejected: {}", format_advisories(.0))]
    UploadRejected(Vec<UploadAdvisory>),
    #[error("Stale completion for ticket {0}")]
    StaleCompletion(u64),
}

fn format_advisories(advisories: &[UploadAdvisory]) -> String {
    advisories
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pure transition function
pub fn transition(
    state: &StudioState,
    context: &StudioContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::Upload { image } => workflow::upload(state, context, image),
        Event::SelectStyle { style } => Ok(workflow::select_style(state, style)),
        Event::Generate | Event::RequestRegeneration => workflow::generate(state, context),
        Event::GenerationComplete { ticket } => workflow::complete(state, ticket),
        Event::Reset => Ok(workflow::reset(state)),
        Event::Download { at } => workflow::download(state, at),

        Event::OpenChat { at } => conversation::open(state, at),
        Event::CloseChat => conversation::close(state),
        Event::ToggleChat { at } => {
            if state.is_chat_open() {
                conversation::close(state)
            } else {
                conversation::open(state, at)
            }
        }
        Event::SendMessage { text, at } => conversation::send(state, context, text, at),
        Event::ReplyReady { ticket, text, at } => conversation::deliver(state, ticket, text, at),
    }
}
