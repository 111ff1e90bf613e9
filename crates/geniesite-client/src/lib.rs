//! Client side of a GenieSite generation.
//!
//! Bytes from the relay arrive in whatever chunks the transport produces.
//! [`reassemble`] rebuilds the protocol events from them, and
//! [`GenerationSession`] folds those events into the state a UI renders:
//! typing indicator, live reasoning transcript, progress and final code.
//! [`GenerationClient`] wires the two to an HTTP connection.

pub mod error;
pub mod reassembler;
pub mod session;
pub mod transport;

pub use error::ClientError;
pub use reassembler::{decode_frame, reassemble, ReassembledFrame};
pub use session::{GenerationSession, Phase, Role, SessionMessage};
pub use transport::{GenerationClient, GENERATE_ROUTE, LEGACY_GENERATE_ROUTE};
