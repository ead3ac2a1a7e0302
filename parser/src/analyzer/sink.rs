use std::io::Write;

use tracing::{debug, trace};

use crate::error::SinkError;

use super::events::ActionEvent;

/// Consumer of the event stream. Implementations decide how to batch;
/// `flush` must make everything ingested so far durable.
pub trait EventSink {
    fn ingest(&mut self, event: ActionEvent) -> Result<(), SinkError>;
    fn flush(&mut self) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn ingest(&mut self, event: ActionEvent) -> Result<(), SinkError> {
        (**self).ingest(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// Feeds events to a sink and flushes it every `batch_size` events, plus
/// once more on [`EventDispatcher::close`].
pub struct EventDispatcher<S> {
    sink: S,
    batch_size: usize,
    pending: usize,
    flushes: usize,
}

impl<S: EventSink> EventDispatcher<S> {
    pub fn new(sink: S, batch_size: usize) -> Self {
        Self {
            sink,
            batch_size: batch_size.max(1),
            pending: 0,
            flushes: 0,
        }
    }

    pub fn dispatch(&mut self, event: ActionEvent) -> Result<(), SinkError> {
        self.sink.ingest(event)?;
        self.pending += 1;
        if self.pending >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        trace!(pending = self.pending, "flushing event sink");
        self.sink.flush()?;
        self.pending = 0;
        self.flushes += 1;
        Ok(())
    }

    /// Flushes whatever is left, even if nothing is.
    pub fn close(&mut self) -> Result<(), SinkError> {
        debug!(pending = self.pending, flushes = self.flushes, "closing event sink");
        self.flush()
    }

    /// Events ingested since the last successful flush.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

/// Keeps every event in memory. Events only become visible in
/// [`MemorySink::events`] once flushed.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffered: Vec<ActionEvent>,
    events: Vec<ActionEvent>,
    batches: Vec<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ActionEvent] {
        &self.events
    }

    /// Number of events made durable by each flush, in order.
    pub fn batches(&self) -> &[usize] {
        &self.batches
    }

    pub fn buffered(&self) -> usize {
        self.buffered.len()
    }
}

impl EventSink for MemorySink {
    fn ingest(&mut self, event: ActionEvent) -> Result<(), SinkError> {
        self.buffered.push(event);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.batches.push(self.buffered.len());
        self.events.append(&mut self.buffered);
        Ok(())
    }
}

/// Writes one JSON object per line. Events are buffered until `flush`.
pub struct JsonLinesSink<W: Write> {
    output: W,
    buffered: Vec<ActionEvent>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            buffered: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn ingest(&mut self, event: ActionEvent) -> Result<(), SinkError> {
        self.buffered.push(event);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        for event in &self.buffered {
            serde_json::to_writer(&mut self.output, event)?;
            self.output.write_all(b"\n")?;
        }
        self.output.flush()?;
        self.buffered.clear();
        Ok(())
    }
}
