//! Scripted conversation transitions

use super::transition::{TransitionError, TransitionResult};
use super::{ConversationState, Effect, PendingReply, Sender, StudioContext, StudioState};
use chrono::{DateTime, Utc};

/// Show the chat panel, seeding it with the greeting
///
/// Only possible while an avatar is on screen.
pub(super) fn open(
    state: &StudioState,
    at: DateTime<Utc>,
) -> Result<TransitionResult, TransitionError> {
    if state.is_chat_open() {
        return Err(TransitionError::ChatAlreadyOpen);
    }
    if state.workflow.displayed_avatar().is_none() {
        return Err(TransitionError::ChatUnavailable);
    }

    let conversation = ConversationState::initialize(state.style, at);
    let greeting = conversation.messages()[0].clone();
    let mut new_state = state.clone();
    new_state.chat = Some(conversation);
    Ok(TransitionResult::new(new_state)
        .with_effect(Effect::NotifyMessage(greeting))
        .with_effect(Effect::PublishState))
}

/// Hide the chat panel, discarding its log and pending replies
pub(super) fn close(state: &StudioState) -> Result<TransitionResult, TransitionError> {
    if !state.is_chat_open() {
        return Err(TransitionError::ChatUnavailable);
    }
    let mut new_state = state.clone();
    new_state.chat = None;
    Ok(TransitionResult::new(new_state)
        .with_effect(Effect::CancelReplies)
        .with_effect(Effect::PublishState))
}

pub(super) fn send(
    state: &StudioState,
    context: &StudioContext,
    text: String,
    at: DateTime<Utc>,
) -> Result<TransitionResult, TransitionError> {
    if state.chat.is_none() {
        return Err(TransitionError::ChatUnavailable);
    }
    if text.trim().is_empty() {
        return Err(TransitionError::EmptyInput);
    }

    let mut new_state = state.clone();
    let ticket = new_state.issue_ticket();
    let style = new_state.style;
    let Some(chat) = new_state.chat.as_mut() else {
        return Err(TransitionError::ChatUnavailable);
    };
    let message = chat.append(text, Sender::User, at);
    chat.expect_reply(PendingReply { ticket, style });

    Ok(TransitionResult::new(new_state)
        .with_effect(Effect::NotifyMessage(message))
        .with_effect(Effect::schedule_reply(ticket, style, context.reply_delay))
        .with_effect(Effect::PublishState))
}

pub(super) fn deliver(
    state: &StudioState,
    ticket: u64,
    text: String,
    at: DateTime<Utc>,
) -> Result<TransitionResult, TransitionError> {
    let mut new_state = state.clone();
    let chat = new_state
        .chat
        .as_mut()
        .ok_or(TransitionError::StaleCompletion(ticket))?;
    chat.take_reply(ticket)
        .ok_or(TransitionError::StaleCompletion(ticket))?;
    let message = chat.append(text, Sender::System, at);

    Ok(TransitionResult::new(new_state)
        .with_effect(Effect::NotifyMessage(message))
        .with_effect(Effect::PublishState))
}
