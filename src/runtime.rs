//! Runtime for driving a studio session
//!
//! One background task owns the state; UI collaborators hold a
//! [`StudioHandle`] to send it events and observe the results.

mod executor;
pub mod traits;


pub use executor::StudioRuntime;
pub use traits::*;

use crate::error::{StudioError, StudioResult};
use crate::state_machine::{
    DownloadRequest, Event, GeneratedAvatar, Message, Phase, StudioContext, StudioState,
};
use crate::style::AvatarStyle;
use crate::upload::UploadedImage;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// Events sent to observers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    StateChange {
        phase: Phase,
        style: AvatarStyle,
        chat_open: bool,
        composing: bool,
    },
    Message {
        message: Message,
    },
    AvatarReady {
        avatar: GeneratedAvatar,
    },
    Downloaded {
        request: DownloadRequest,
    },
    Error {
        message: String,
    },
}

impl StudioEvent {
    pub fn state_change(state: &StudioState) -> Self {
        StudioEvent::StateChange {
            phase: state.phase(),
            style: state.style,
            chat_open: state.is_chat_open(),
            composing: state.is_composing(),
        }
    }
}

/// Handle to interact with a running studio
#[derive(Clone)]
pub struct StudioHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<StudioEvent>,
    state_rx: watch::Receiver<StudioState>,
    /// Events accepted by the channel, shared by every clone
    sent: Arc<AtomicU64>,
    /// Events the runtime has finished applying
    processed_rx: watch::Receiver<u64>,
    clock: Arc<dyn Clock>,
}

impl StudioHandle {
    async fn send(&self, event: Event) -> StudioResult<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| StudioError::RuntimeStopped)?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub async fn upload(&self, image: UploadedImage) -> StudioResult<()> {
        self.send(Event::Upload { image }).await
    }

    /// Read a photo from disk and upload it
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> StudioResult<()> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| StudioError::ReadUpload {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .into_owned();
        self.upload(UploadedImage::new(file_name, bytes)).await
    }

    pub async fn select_style(&self, style: AvatarStyle) -> StudioResult<()> {
        self.send(Event::SelectStyle { style }).await
    }

    pub async fn generate(&self) -> StudioResult<()> {
        self.send(Event::Generate).await
    }

    pub async fn reset(&self) -> StudioResult<()> {
        self.send(Event::Reset).await
    }

    pub async fn download(&self) -> StudioResult<()> {
        self.send(Event::Download {
            at: self.clock.now(),
        })
        .await
    }

    pub async fn open_chat(&self) -> StudioResult<()> {
        self.send(Event::OpenChat {
            at: self.clock.now(),
        })
        .await
    }

    pub async fn close_chat(&self) -> StudioResult<()> {
        self.send(Event::CloseChat).await
    }

    pub async fn toggle_chat(&self) -> StudioResult<()> {
        self.send(Event::ToggleChat {
            at: self.clock.now(),
        })
        .await
    }

    pub async fn send_message(&self, text: impl Into<String>) -> StudioResult<()> {
        self.send(Event::SendMessage {
            text: text.into(),
            at: self.clock.now(),
        })
        .await
    }

    /// Regenerate from the chat panel; leaves the message log alone
    pub async fn request_regeneration(&self) -> StudioResult<()> {
        self.send(Event::RequestRegeneration).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> StudioState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that wakes on every published state
    pub fn watch(&self) -> watch::Receiver<StudioState> {
        self.state_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Wait until the published state satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&StudioState) -> bool,
        timeout: Duration,
    ) -> StudioResult<StudioState> {
        let mut rx = self.state_rx.clone();
        let waited = async {
            rx.wait_for(predicate)
                .await
                .map(|state| StudioState::clone(&state))
        };
        let outcome = tokio::time::timeout(timeout, waited).await;
        match outcome {
            Ok(Ok(state)) => Ok(state),
            Ok(Err(_)) => Err(StudioError::RuntimeStopped),
            Err(_) => Err(StudioError::Timeout),
        }
    }

    /// Wait until the runtime has applied every event sent so far,
    /// including ignored ones and any effects they awaited
    pub async fn settle(&self) -> StudioResult<()> {
        let target = self.sent.load(Ordering::SeqCst);
        let mut rx = self.processed_rx.clone();
        let reached = rx.wait_for(|processed| *processed >= target).await.is_ok();
        if reached {
            Ok(())
        } else {
            Err(StudioError::RuntimeStopped)
        }
    }
}

/// Assembles a runtime from its collaborators
pub struct StudioBuilder<D> {
    context: StudioContext,
    sink: D,
    picker: Box<dyn ReplyPicker>,
    clock: Arc<dyn Clock>,
}

impl<D> StudioBuilder<D>
where
    D: DownloadSink + 'static,
{
    pub fn new(context: StudioContext, sink: D) -> Self {
        Self {
            context,
            sink,
            picker: Box::new(RandomPicker::from_entropy()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn picker(mut self, picker: impl ReplyPicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Start the runtime task. It stops once every handle is dropped.
    pub fn spawn(self) -> (StudioHandle, JoinHandle<()>) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (state_tx, state_rx) = watch::channel(StudioState::default());
        let (processed_tx, processed_rx) = watch::channel(0);

        let runtime = StudioRuntime::new(
            self.context,
            self.sink,
            self.picker,
            Arc::clone(&self.clock),
            event_rx,
            &event_tx,
            broadcast_tx.clone(),
            state_tx,
            processed_tx,
        );
        let task = tokio::spawn(runtime.run());

        let handle = StudioHandle {
            event_tx,
            broadcast_tx,
            state_rx,
            sent: Arc::new(AtomicU64::new(0)),
            processed_rx,
            clock: self.clock,
        };
        (handle, task)
    }
}
