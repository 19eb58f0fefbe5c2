//! Event writer trait definition.

use crate::error::Result;
use crate::output::MonitorEvent;

/// Trait for emitting monitor events.
pub trait EventWriter {
    /// Emit a single event.
    fn write_event(&mut self, event: &MonitorEvent) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: EventWriter + ?Sized> EventWriter for &mut W {
    fn write_event(&mut self, event: &MonitorEvent) -> Result<()> {
        (**self).write_event(event)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct CollectingWriter {
    /// Events in emit order.
    pub events: Vec<MonitorEvent>,
}

impl EventWriter for CollectingWriter {
    fn write_event(&mut self, event: &MonitorEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}
