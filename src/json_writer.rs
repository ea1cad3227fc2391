//! JSON layout output
//!
//! `JsonWriter` writes the final layout as one pretty-printed document.
//! `FrameStream` is a tick listener that streams every animated frame as one
//! JSON object per line.

use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::driver::TickListener;
use crate::io::{IoError, IoResult, LayoutWriter};
use crate::snapshot::LayoutSnapshot;

/// Writes a layout as pretty-printed JSON
#[derive(Debug, Default)]
pub struct JsonWriter;

impl JsonWriter {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutWriter for JsonWriter {
    fn write(&self, layout: &LayoutSnapshot, output: &Path) -> IoResult<()> {
        let json =
            serde_json::to_string_pretty(layout).map_err(|e| IoError::Write(e.to_string()))?;
        std::fs::write(output, json)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "json"
    }
}

/// Streams animated frames as newline-delimited JSON
///
/// Listener callbacks cannot fail, so the first write error is kept and
/// reported by [`FrameStream::finish`]; later frames are dropped.
#[derive(Debug)]
pub struct FrameStream<W> {
    sink: W,
    frames: usize,
    error: Option<std::io::Error>,
}

impl<W: Write + Send> FrameStream<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            frames: 0,
            error: None,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Flush the sink and surface any error seen while streaming
    pub fn finish(mut self) -> IoResult<W> {
        if let Some(err) = self.error.take() {
            return Err(err.into());
        }
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn write_frame(&mut self, layout: &LayoutSnapshot) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.sink, layout)?;
        self.sink.write_all(b"\n")
    }
}

impl<W: Write + Send> TickListener for FrameStream<W> {
    fn on_tick(&mut self, layout: &LayoutSnapshot) {
        if self.error.is_some() {
            return;
        }
        match self.write_frame(layout) {
            Ok(()) => self.frames += 1,
            Err(err) => {
                warn!(tick = layout.tick, %err, "failed to write frame");
                self.error = Some(err);
            }
        }
    }
}
