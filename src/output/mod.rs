//! Event assembly and the framed output stream.

mod event;
pub mod frames;
pub mod progress;
mod stream;
mod writer;

pub use event::MonitorEvent;
pub use frames::{Frame, FrameDecoder};
pub use stream::{FrameWriter, PacedSink};
pub use writer::{CollectingWriter, EventWriter};
