//! Avatar Studio - headless avatar generation workflow
//!
//! A user uploads a photo, picks a style and receives a placeholder avatar
//! after a simulated delay. A scripted chat panel answers with canned
//! replies for the active style.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod runtime;
pub mod script;
pub mod state_machine;
pub mod style;
pub mod upload;

pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};
pub use runtime::{StudioBuilder, StudioEvent, StudioHandle};
pub use state_machine::{Phase, StudioState};
pub use style::AvatarStyle;
pub use upload::UploadedImage;
