//! Framed event stream and output pacing.

use crate::constants::stream::{FRAME_END, FRAME_START};
use crate::error::{Error, Result};
use crate::output::{EventWriter, MonitorEvent};
use crate::shutdown::ShutdownSignal;
use std::io::Write;
use std::time::{Duration, Instant};

/// Writes each event as `JSON_START<json>JSON_END\n` and flushes.
pub struct FrameWriter<W: Write> {
    inner: W,
}

impl<W: Write> FrameWriter<W> {
    /// Wrap a byte sink.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Recover the wrapped sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> EventWriter for FrameWriter<W> {
    fn write_event(&mut self, event: &MonitorEvent) -> Result<()> {
        let json = serde_json::to_string(event).map_err(|source| Error::EventSerialize { source })?;
        writeln!(self.inner, "{FRAME_START}{json}{FRAME_END}")?;
        self.inner.flush()?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Enforces a minimum interval between consecutive events.
///
/// The first event goes out immediately; each later one waits until
/// `interval` has passed since the previous emit. A shutdown request
/// cuts the wait short and the event is still written.
pub struct PacedSink<W: EventWriter> {
    inner: W,
    interval: Duration,
    last_emit: Option<Instant>,
    shutdown: ShutdownSignal,
}

impl<W: EventWriter> PacedSink<W> {
    /// Pace `inner` to at most one event per `interval`.
    pub fn new(inner: W, interval: Duration, shutdown: ShutdownSignal) -> Self {
        Self {
            inner,
            interval,
            last_emit: None,
            shutdown,
        }
    }

    /// Access the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: EventWriter> EventWriter for PacedSink<W> {
    fn write_event(&mut self, event: &MonitorEvent) -> Result<()> {
        if let Some(last) = self.last_emit {
            let wait = self.interval.saturating_sub(last.elapsed());
            if !wait.is_zero() {
                self.shutdown.sleep(wait);
            }
        }
        self.inner.write_event(event)?;
        self.last_emit = Some(Instant::now());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.inner.finalize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::CollectingWriter;

    fn event(change: f64) -> MonitorEvent {
        MonitorEvent {
            base_date_time: "2023-01-01T00:00:00".to_string(),
            sog: 5.0,
            cog: 90.0,
            lat: 29.0,
            lon: -89.0,
            change,
            anomaly: 0,
            oil_spill: 0,
            image_path: None,
        }
    }

    #[test]
    fn test_frame_format() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_event(&event(1.5)).unwrap();
        writer.write_event(&event(2.0)).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert!(line.starts_with("JSON_START{"));
            assert!(line.ends_with("}JSON_END"));
            let body = &line["JSON_START".len()..line.len() - "JSON_END".len()];
            let parsed: MonitorEvent = serde_json::from_str(body).unwrap();
            assert_eq!(parsed.anomaly, 0);
        }
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_first_event_is_not_delayed() {
        let mut sink = PacedSink::new(
            CollectingWriter::default(),
            Duration::from_secs(30),
            ShutdownSignal::new(),
        );
        let start = Instant::now();
        sink.write_event(&event(0.0)).unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(sink.get_ref().events.len(), 1);
    }

    #[test]
    fn test_interval_between_events() {
        let mut sink = PacedSink::new(
            CollectingWriter::default(),
            Duration::from_millis(60),
            ShutdownSignal::new(),
        );
        let start = Instant::now();
        for i in 0..3 {
            sink.write_event(&event(f64::from(i))).unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(120));
        assert_eq!(sink.into_inner().events.len(), 3);
    }

    #[test]
    fn test_shutdown_skips_wait() {
        let shutdown = ShutdownSignal::new();
        let mut sink = PacedSink::new(
            CollectingWriter::default(),
            Duration::from_secs(30),
            shutdown.clone(),
        );
        sink.write_event(&event(0.0)).unwrap();
        shutdown.request();

        let start = Instant::now();
        sink.write_event(&event(1.0)).unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(sink.get_ref().events.len(), 2);
    }
}
