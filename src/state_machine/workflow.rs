//! Generation workflow transitions
//!
//! `Empty -> Uploaded -> Generating -> Generated`, with reset back to
//! `Empty` from anywhere and `Generated -> Generating` on regeneration.

use super::transition::{TransitionError, TransitionResult};
use super::{DownloadRequest, Effect, GeneratedAvatar, StudioContext, StudioState, WorkflowState};
use crate::style::AvatarStyle;
use crate::upload::UploadedImage;
use chrono::{DateTime, Utc};

/// Effects that tear down whatever timers `state` has running
fn teardown(state: &StudioState) -> Vec<Effect> {
    let mut effects = Vec::new();
    if state.workflow.is_generating() {
        effects.push(Effect::CancelGeneration);
    }
    if state.is_chat_open() {
        effects.push(Effect::CancelReplies);
    }
    effects
}

pub(super) fn upload(
    state: &StudioState,
    context: &StudioContext,
    image: UploadedImage,
) -> Result<TransitionResult, TransitionError> {
    let advisories = context.upload_policy.check(&image);
    if context.strict_uploads && !advisories.is_empty() {
        return Err(TransitionError::UploadRejected(advisories));
    }

    // A new photo invalidates the avatar, and with it the chat panel
    let effects = teardown(state);
    let mut new_state = state.clone();
    new_state.workflow = WorkflowState::Uploaded { image };
    new_state.chat = None;

    let mut result = TransitionResult::new(new_state);
    if !advisories.is_empty() {
        result = result.with_effect(Effect::ReportAdvisories(advisories));
    }
    Ok(result.with_effects(effects).with_effect(Effect::PublishState))
}

pub(super) fn select_style(state: &StudioState, style: AvatarStyle) -> TransitionResult {
    let mut new_state = state.clone();
    new_state.style = style;
    TransitionResult::new(new_state).with_effect(Effect::PublishState)
}

pub(super) fn generate(
    state: &StudioState,
    context: &StudioContext,
) -> Result<TransitionResult, TransitionError> {
    let (image, previous) = match &state.workflow {
        WorkflowState::Empty => return Err(TransitionError::NoUploadedImage),
        WorkflowState::Generating { .. } => return Err(TransitionError::AlreadyGenerating),
        WorkflowState::Uploaded { image } => (image.clone(), None),
        WorkflowState::Generated { image, avatar } => (image.clone(), Some(avatar.clone())),
    };

    let mut new_state = state.clone();
    let ticket = new_state.issue_ticket();
    let style = state.style;
    new_state.workflow = WorkflowState::Generating {
        image,
        style,
        ticket,
        previous,
    };

    Ok(TransitionResult::new(new_state)
        .with_effect(Effect::schedule_generation(
            ticket,
            style,
            context.generate_delay,
        ))
        .with_effect(Effect::PublishState))
}

pub(super) fn complete(
    state: &StudioState,
    ticket: u64,
) -> Result<TransitionResult, TransitionError> {
    match &state.workflow {
        WorkflowState::Generating {
            image,
            style,
            ticket: current,
            ..
        } if *current == ticket => {
            let avatar = GeneratedAvatar::placeholder(*style);
            let mut new_state = state.clone();
            new_state.workflow = WorkflowState::Generated {
                image: image.clone(),
                avatar: avatar.clone(),
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::NotifyAvatarReady(avatar))
                .with_effect(Effect::PublishState))
        }
        _ => Err(TransitionError::StaleCompletion(ticket)),
    }
}

pub(super) fn reset(state: &StudioState) -> TransitionResult {
    let effects = teardown(state);
    let mut new_state = state.clone();
    new_state.workflow = WorkflowState::Empty;
    new_state.chat = None;
    TransitionResult::new(new_state)
        .with_effects(effects)
        .with_effect(Effect::PublishState)
}

pub(super) fn download(
    state: &StudioState,
    at: DateTime<Utc>,
) -> Result<TransitionResult, TransitionError> {
    let avatar = state
        .generated_avatar()
        .ok_or(TransitionError::NotGenerated)?;
    Ok(TransitionResult::new(state.clone())
        .with_effect(Effect::Download(DownloadRequest::new(
            avatar.clone(),
            state.style,
            at,
        ))))
}
