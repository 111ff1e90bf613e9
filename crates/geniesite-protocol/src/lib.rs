//! # geniesite-protocol
//!
//! The wire protocol spoken between the GenieSite relay and its clients.
//!
//! A generation is streamed as a sequence of server-sent-event frames, one
//! [`ProtocolEvent`] per frame:
//!
//! ```text
//! data: {"type":"thoughts_start","message":"AI is thinking..."}
//!
//! data: {"type":"progress","message":"Generating code...","progress":42.0}
//!
//! ```
//!
//! - [`encode_event`] turns one event into one frame and never fails.
//! - [`FrameBuffer`] does the reverse for byte chunks that arrive at
//!   arbitrary boundaries, holding partial frames between reads.

pub mod encoder;
pub mod event;
pub mod frame;

pub use encoder::{encode_event, encode_frame, DATA_PREFIX, FRAME_TERMINATOR};
pub use event::{GenerationRequest, ProtocolEvent};
pub use frame::{frame_data, FrameBuffer, Utf8Decoder};
