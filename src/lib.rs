//! Queued command sequencing and live state telemetry for the Tello drone.
//!
//! Commands are sent one at a time over the drone's UDP control channel,
//! each one held back until the previous command's acknowledgement arrives.
//! Movement commands queued while the drone is still on the ground are
//! dropped rather than sent. State telemetry is decoded from the drone's
//! broadcast channel and can be queried at any time.

mod command;
mod errors;
mod options;
mod sequencer;
mod session;
mod telemetry;

pub use command::{Command, FlightState, FlipDirection};
pub use errors::{Result, SessionError};
pub use options::SessionOptions;
pub use session::Session;
pub use telemetry::Snapshot;
