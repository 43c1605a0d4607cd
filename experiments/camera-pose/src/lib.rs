//! Live camera pose overlay.
//!
//! A [`PoseSession`] pulls frames from a camera, hands them one at a time to a
//! pose estimator and draws each result with the [`OverlayRenderer`].

pub mod config;
pub mod display;
pub mod render;
pub mod session;
pub mod surface;

pub use config::{ConfigError, SessionConfig};
pub use display::{Display, DisplayError};
pub use render::{OverlayRenderer, RenderConfig};
pub use session::{PoseSession, SessionError, SessionHandle, SessionState, SessionStats};
pub use surface::{Canvas, Color, Surface};
