//! Studio runtime executor

use super::traits::{Clock, DownloadSink, ReplyPicker};
use super::StudioEvent;

use crate::state_machine::{transition, Effect, Event, StudioContext, StudioState};
use crate::style::AvatarStyle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A reply waiting out its latency
struct ReplyJob {
    ticket: u64,
    text: String,
    due: Instant,
}

/// Worker that delivers replies one after another, in queue order
struct ReplyQueue {
    jobs: mpsc::UnboundedSender<ReplyJob>,
    cancel: CancellationToken,
}

/// Owns the studio state and applies events to it, one at a time
pub struct StudioRuntime<D>
where
    D: DownloadSink + 'static,
{
    context: StudioContext,
    state: StudioState,
    sink: Arc<D>,
    picker: Box<dyn ReplyPicker>,
    clock: Arc<dyn Clock>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the loop ends once every handle is dropped
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<StudioEvent>,
    state_tx: watch::Sender<StudioState>,
    /// Count of events applied so far
    processed_tx: watch::Sender<u64>,
    /// Token to cancel the running generation timer
    generation_cancel: Option<CancellationToken>,
    /// Reply worker of the open chat panel
    replies: Option<ReplyQueue>,
}

impl<D> StudioRuntime<D>
where
    D: DownloadSink + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: StudioContext,
        sink: D,
        picker: Box<dyn ReplyPicker>,
        clock: Arc<dyn Clock>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: &mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<StudioEvent>,
        state_tx: watch::Sender<StudioState>,
        processed_tx: watch::Sender<u64>,
    ) -> Self {
        Self {
            context,
            state: StudioState::default(),
            sink: Arc::new(sink),
            picker,
            clock,
            event_rx,
            event_tx: event_tx.downgrade(),
            broadcast_tx,
            state_tx,
            processed_tx,
            generation_cancel: None,
            replies: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting studio runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event).await;
            self.processed_tx.send_modify(|count| *count += 1);
        }

        self.cancel_generation();
        self.cancel_replies();
        tracing::info!(session_id = %self.context.session_id, "Studio runtime stopped");
    }

    async fn process_event(&mut self, event: Event) {
        let name = event.name();
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                // Ignored events never reach observers
                tracing::debug!(
                    session_id = %self.context.session_id,
                    event = name,
                    reason = %e,
                    "Ignoring event"
                );
                return;
            }
        };

        tracing::debug!(
            session_id = %self.context.session_id,
            event = name,
            phase = ?result.new_state.phase(),
            effects = result.effects.len(),
            "Applied event"
        );
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect).await;
        }
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleGeneration {
                ticket,
                style,
                delay,
            } => self.schedule_generation(ticket, style, delay),

            Effect::CancelGeneration => self.cancel_generation(),

            Effect::ScheduleReply {
                ticket,
                style,
                delay,
            } => self.schedule_reply(ticket, style, delay),

            Effect::CancelReplies => self.cancel_replies(),

            Effect::Download(request) => match self.sink.save(&request).await {
                Ok(()) => {
                    let _ = self.broadcast_tx.send(StudioEvent::Downloaded { request });
                }
                Err(e) => {
                    tracing::error!(error = %e, file_name = %request.file_name, "Download failed");
                    let _ = self.broadcast_tx.send(StudioEvent::Error { message: e });
                }
            },

            Effect::ReportAdvisories(advisories) => {
                for advisory in advisories {
                    tracing::warn!(
                        session_id = %self.context.session_id,
                        %advisory,
                        "Upload outside advertised limits"
                    );
                }
            }

            Effect::NotifyMessage(message) => {
                let _ = self.broadcast_tx.send(StudioEvent::Message { message });
            }

            Effect::NotifyAvatarReady(avatar) => {
                tracing::info!(style = %avatar.style, "Avatar generated");
                let _ = self.broadcast_tx.send(StudioEvent::AvatarReady { avatar });
            }

            Effect::PublishState => {
                self.state_tx.send_replace(self.state.clone());
                let _ = self
                    .broadcast_tx
                    .send(StudioEvent::state_change(&self.state));
            }
        }
    }

    fn schedule_generation(&mut self, ticket: u64, style: AvatarStyle, delay: Duration) {
        self.cancel_generation();
        let Some(event_tx) = self.event_tx.upgrade() else {
            return;
        };

        let cancel = CancellationToken::new();
        self.generation_cancel = Some(cancel.clone());
        tracing::info!(ticket, %style, delay_ms = delay.as_millis(), "Generating avatar");

        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::debug!(ticket, "Generation cancelled");
                }

                () = tokio::time::sleep(delay) => {
                    let _ = event_tx.send(Event::GenerationComplete { ticket }).await;
                }
            }
        });
    }

    fn cancel_generation(&mut self) {
        if let Some(token) = self.generation_cancel.take() {
            token.cancel();
        }
    }

    fn schedule_reply(&mut self, ticket: u64, style: AvatarStyle, delay: Duration) {
        let replies = style.canned_replies();
        let index = self.picker.pick(style, replies).min(replies.len() - 1);
        let job = ReplyJob {
            ticket,
            text: replies[index].to_string(),
            due: Instant::now() + delay,
        };

        if self.replies.is_none() {
            let worker = Self::spawn_reply_worker(self.event_tx.clone(), Arc::clone(&self.clock));
            self.replies = Some(worker);
        }
        let Some(queue) = &self.replies else {
            return;
        };
        if queue.jobs.send(job).is_err() {
            tracing::warn!(ticket, "Reply worker is gone, dropping reply");
        }
    }

    fn spawn_reply_worker(
        event_tx: mpsc::WeakSender<Event>,
        clock: Arc<dyn Clock>,
    ) -> ReplyQueue {
        let cancel = CancellationToken::new();
        let (jobs, mut job_rx) = mpsc::unbounded_channel::<ReplyJob>();

        let token = cancel.clone();
        tokio::spawn(async move {
            loop {
                let job = tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    job = job_rx.recv() => match job {
                        Some(job) => job,
                        None => break,
                    },
                };

                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    () = tokio::time::sleep_until(job.due) => {
                        let event = Event::ReplyReady {
                            ticket: job.ticket,
                            text: job.text,
                            at: clock.now(),
                        };
                        let Some(tx) = event_tx.upgrade() else {
                            break;
                        };
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Reply worker stopped");
        });

        ReplyQueue { jobs, cancel }
    }

    fn cancel_replies(&mut self) {
        if let Some(queue) = self.replies.take() {
            queue.cancel.cancel();
        }
    }
}
