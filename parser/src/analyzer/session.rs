use tracing::{Level, debug, span, warn};

use crate::config::SessionConfig;
use crate::demofile::{DemoFile, RawFrame};
use crate::entity::{FrameUnpacker, RECORD_WIDTH};
use crate::error::{DecodeError, Error, FrameError};
use crate::flags::FieldExtractor;
use crate::game_constants::GameConstants;
use crate::huffman::{HuffmanDecoder, SymbolTable};

use super::events::ActionEvent;
use super::sink::{EventDispatcher, EventSink};
use super::survey::SessionSummary;
use super::tracker::{AnalyticsTracker, SessionContext};

/// Runs captures through decode, unpack, and analysis, handing the
/// resulting events to a sink in file order.
pub struct Session {
    config: SessionConfig,
    constants: GameConstants,
    decoder: HuffmanDecoder,
    unpacker: FrameUnpacker,
    tracker: AnalyticsTracker,
}

impl Session {
    pub fn new(config: SessionConfig, table: &SymbolTable) -> Result<Session, Error> {
        Self::with_constants(config, table, GameConstants::defaults())
    }

    pub fn with_constants(
        config: SessionConfig,
        table: &SymbolTable,
        constants: GameConstants,
    ) -> Result<Session, Error> {
        config.validate()?;
        let extractor = FieldExtractor::new(config.flag_layout, *constants.weapons());
        let tracker =
            AnalyticsTracker::new(extractor, config.aim_epsilon, config.aim_history_len);
        Ok(Session {
            decoder: HuffmanDecoder::new(table),
            unpacker: FrameUnpacker::new(),
            tracker,
            constants,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Decodes one frame and runs it through the tracker. Failures leave the
    /// context untouched apart from the summary counters.
    pub fn process_frame(
        &self,
        ctx: &mut SessionContext,
        frame: RawFrame<'_>,
    ) -> Result<Vec<ActionEvent>, FrameError> {
        let span = span!(Level::TRACE, "frame", index = frame.index);
        let _enter = span.enter();

        ctx.summary.total_frames += 1;
        let result = self
            .decoder
            .decode(frame.bytes, RECORD_WIDTH)
            .map_err(FrameError::from)
            .and_then(|decoded| self.unpacker.unpack(&decoded, record_number(frame.index)));

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                match &err {
                    FrameError::Decode(DecodeError::OutputOverflow { .. }) => {
                        ctx.summary.overflowed_frames += 1
                    }
                    FrameError::Decode(_) => ctx.summary.truncated_frames += 1,
                    FrameError::SizeMismatch { .. } => ctx.summary.size_mismatched_frames += 1,
                }
                warn!(index = frame.index, %err, "skipping frame");
                return Err(err);
            }
        };

        ctx.summary.decoded_frames += 1;
        Ok(self.tracker.process(ctx, &record))
    }

    /// Processes every whole frame of `demo` with a fresh context.
    pub fn run<S: EventSink>(
        &self,
        demo: &DemoFile,
        sink: S,
    ) -> Result<SessionSummary, Error> {
        let mut ctx = SessionContext::new();
        self.run_with_context(&mut ctx, demo, sink)?;
        Ok(ctx.summary)
    }

    /// Opens the capture named by `input_path` in the config and runs it.
    /// Nothing is decoded if the file can't be read.
    pub fn run_configured<S: EventSink>(&self, sink: S) -> Result<SessionSummary, Error> {
        let path = self
            .config
            .input_path
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("input_path is not set".into()))?;
        let demo = DemoFile::from_file(path)?;
        self.run(&demo, sink)
    }

    /// Like [`Session::run`], but keeps the per-player state around for the
    /// caller to inspect.
    pub fn run_with_context<S: EventSink>(
        &self,
        ctx: &mut SessionContext,
        demo: &DemoFile,
        sink: S,
    ) -> Result<(), Error> {
        debug!(bytes = demo.len(), chunk_size = self.config.chunk_size, "starting session");
        let mut dispatcher = EventDispatcher::new(sink, self.config.flush_batch_size);
        ctx.summary.trailing_bytes = demo.trailing_bytes(self.config.chunk_size);

        for frame in demo.frames(self.config.chunk_size) {
            let Ok(events) = self.process_frame(ctx, frame) else {
                continue;
            };
            for event in events {
                if let Err(err) = dispatcher.dispatch(event.clone()) {
                    // Keep what the sink already accepted before giving up.
                    if let Err(close_err) = dispatcher.close() {
                        warn!(%close_err, "failed to flush sink after error");
                    }
                    ctx.summary.flushes = dispatcher.flushes();
                    ctx.summary.log(&self.constants);
                    return Err(err.into());
                }
                ctx.summary.record(&event);
            }
        }

        dispatcher.close()?;
        ctx.summary.flushes = dispatcher.flushes();
        ctx.summary.log(&self.constants);
        Ok(())
    }
}

/// Record numbers are frame indices, saturated to fit the record field.
fn record_number(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
