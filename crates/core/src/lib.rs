//! Viewport, scroll and visual-viewport recording for session replay.
//!
//! ```text
//!   host event ─▶ geometry read ─▶ scrollbar correction ─▶ change detector
//!                                                              │ changed
//!                                                              ▼
//!                                    segment buffer ◀─ emitter (timestamp)
//! ```
//!
//! A [`RecorderSession`] wires these together for one recording and owns
//! its listener handles.

pub mod clock;
pub mod config;
pub mod detector;
pub mod emitter;
pub mod error;
pub mod geometry;
pub mod host;
pub mod replay;
pub mod scenario;
pub mod scrollbar;
pub mod segment;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RecorderConfig;
pub use error::RecorderError;
pub use host::{EventSource, GeometryHost, HostEventKind, ScriptedHost, Subscription};
pub use replay::ReplayState;
pub use session::RecorderSession;
