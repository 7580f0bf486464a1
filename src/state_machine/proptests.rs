//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::style::AvatarStyle;
use crate::upload::UploadedImage;
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> StudioContext {
    StudioContext::new("test-session")
}

fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_style() -> impl Strategy<Value = AvatarStyle> {
    prop::sample::select(AvatarStyle::ALL.to_vec())
}

fn arb_image() -> impl Strategy<Value = UploadedImage> {
    (
        prop_oneof![Just("me.png"), Just("me.jpg"), Just("me.gif")],
        proptest::collection::vec(any::<u8>(), 0..16),
    )
        .prop_map(|(name, bytes)| UploadedImage::new(name, bytes))
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just("   ".to_string()), "[a-z ]{1,20}"]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_image().prop_map(|image| Event::Upload { image }),
        arb_style().prop_map(|style| Event::SelectStyle { style }),
        Just(Event::Generate),
        Just(Event::RequestRegeneration),
        Just(Event::Reset),
        (0i64..1_000).prop_map(|ms| Event::Download { at: at(ms) }),
        (0u64..8).prop_map(|ticket| Event::GenerationComplete { ticket }),
        (0u64..8, "[a-z ]{1,10}", 0i64..1_000)
            .prop_map(|(ticket, text, ms)| Event::ReplyReady { ticket, text, at: at(ms) }),
        (0i64..1_000).prop_map(|ms| Event::OpenChat { at: at(ms) }),
        Just(Event::CloseChat),
        (0i64..1_000).prop_map(|ms| Event::ToggleChat { at: at(ms) }),
        (arb_text(), 0i64..1_000).prop_map(|(text, ms)| Event::SendMessage { text, at: at(ms) }),
    ]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn is_valid_state(state: &StudioState) -> bool {
    // An avatar never outlives its photo
    if state.workflow.displayed_avatar().is_some() && state.uploaded_image().is_none() {
        return false;
    }
    // The chat panel only exists next to a visible avatar
    if state.is_chat_open() && state.workflow.displayed_avatar().is_none() {
        return false;
    }
    true
}

fn effects_are_valid(effects: &[Effect], new_state: &StudioState) -> bool {
    for effect in effects {
        match effect {
            Effect::ScheduleGeneration { ticket, style, .. } => match &new_state.workflow {
                WorkflowState::Generating {
                    ticket: current,
                    style: current_style,
                    ..
                } if current == ticket && current_style == style => {}
                _ => return false,
            },
            Effect::ScheduleReply { ticket, .. } => {
                let Some(chat) = &new_state.chat else {
                    return false;
                };
                if chat.pending().last().map(|p| p.ticket) != Some(*ticket) {
                    return false;
                }
            }
            Effect::Download(_) => {
                if new_state.phase() != Phase::Generated {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid state after any sequence of events
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = StudioState::default();
        let ctx = test_context();

        for event in events {
            match transition(&state, &ctx, event) {
                Ok(result) => {
                    state = result.new_state;
                    prop_assert!(is_valid_state(&state), "Invalid state: {:?}", state);
                    prop_assert!(
                        effects_are_valid(&result.effects, &state),
                        "Invalid effects for state {:?}: {:?}",
                        state,
                        result.effects
                    );
                }
                Err(_) => { /* Ignored event is OK */ }
            }
        }
    }

    // Invariant 2: A completion that outlived its generation never produces an avatar
    #[test]
    fn prop_stale_completion_never_yields_avatar(
        image in arb_image(),
        interrupt in prop_oneof![
            Just(Event::Reset),
            arb_image().prop_map(|image| Event::Upload { image }),
        ],
    ) {
        let ctx = test_context();
        let mut state = StudioState::default();
        for event in [Event::Upload { image }, Event::Generate, interrupt] {
            state = transition(&state, &ctx, event).unwrap().new_state;
        }
        for ticket in 0..4 {
            let result = transition(&state, &ctx, Event::GenerationComplete { ticket });
            prop_assert_eq!(result.unwrap_err(), TransitionError::StaleCompletion(ticket));
        }
        prop_assert!(state.generated_avatar().is_none());
    }

    // Invariant 3: Reset always lands in Empty with nothing left behind
    #[test]
    fn prop_reset_from_anywhere(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = StudioState::default();
        let ctx = test_context();
        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
            }
        }

        let result = transition(&state, &ctx, Event::Reset).unwrap();
        prop_assert_eq!(result.new_state.phase(), Phase::Empty);
        prop_assert!(result.new_state.uploaded_image().is_none());
        prop_assert!(result.new_state.generated_avatar().is_none());
        prop_assert!(!result.new_state.is_chat_open());
        prop_assert_eq!(result.new_state.style, state.style);
    }

    // Invariant 4: Every style generates its own placeholder
    #[test]
    fn prop_generate_yields_style_placeholder(style in arb_style(), image in arb_image()) {
        let ctx = test_context();
        let mut state = StudioState::default();
        for event in [Event::Upload { image }, Event::SelectStyle { style }, Event::Generate] {
            state = transition(&state, &ctx, event).unwrap().new_state;
        }
        let WorkflowState::Generating { ticket, .. } = state.workflow.clone() else {
            panic!("Expected Generating");
        };
        let done = transition(&state, &ctx, Event::GenerationComplete { ticket }).unwrap();
        let avatar = done.new_state.generated_avatar().unwrap();
        prop_assert_eq!(avatar.url.as_str(), style.placeholder_url());
    }

    // Invariant 5: Message ids strictly increase and the log only grows
    #[test]
    fn prop_message_log_is_append_only(texts in proptest::collection::vec(arb_text(), 0..15)) {
        let ctx = test_context();
        let mut state = StudioState::default();
        state = transition(&state, &ctx, Event::Upload { image: UploadedImage::new("a.png", vec![1]) })
            .unwrap()
            .new_state;
        state = transition(&state, &ctx, Event::Generate).unwrap().new_state;
        let WorkflowState::Generating { ticket, .. } = state.workflow.clone() else {
            panic!("Expected Generating");
        };
        state = transition(&state, &ctx, Event::GenerationComplete { ticket }).unwrap().new_state;
        state = transition(&state, &ctx, Event::OpenChat { at: at(0) }).unwrap().new_state;

        let mut expected_len = 1;
        for (i, text) in texts.into_iter().enumerate() {
            let blank = text.trim().is_empty();
            let before = state.messages().to_vec();
            match transition(&state, &ctx, Event::SendMessage { text, at: at(i64::try_from(i).unwrap()) }) {
                Ok(result) => {
                    prop_assert!(!blank);
                    state = result.new_state;
                    expected_len += 1;
                }
                Err(e) => {
                    prop_assert!(blank);
                    prop_assert_eq!(e, TransitionError::EmptyInput);
                }
            }
            prop_assert_eq!(state.messages().len(), expected_len);
            prop_assert_eq!(&state.messages()[..before.len()], &before[..]);
        }

        let ids: Vec<_> = state.messages().iter().map(|m| m.id).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
