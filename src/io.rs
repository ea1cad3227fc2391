//! Layout writers and format dispatch
//!
//! A writer renders a [`LayoutSnapshot`] to a file. The registry picks a writer
//! by format id, or by the extension of the output path.

use std::path::Path;

use thiserror::Error;

use crate::error::SimulationError;
use crate::json_writer::JsonWriter;
use crate::snapshot::LayoutSnapshot;
use crate::svg_writer::SvgWriter;

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parsing error occurred
    #[error("parse error: {0}")]
    Parse(String),

    /// A rendering/writing error occurred
    #[error("write error: {0}")]
    Write(String),

    /// The file parsed but describes an invalid graph or configuration
    #[error(transparent)]
    Invalid(#[from] SimulationError),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// A writer renders a layout to a specific output format
pub trait LayoutWriter {
    /// Write the layout to the output path
    fn write(&self, layout: &LayoutSnapshot, output: &Path) -> IoResult<()>;

    /// Identifier for this output format (e.g., "svg", "json")
    fn format_id(&self) -> &str;
}

/// Registry of available layout writers
pub struct FormatRegistry {
    writers: Vec<Box<dyn LayoutWriter>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            writers: Vec::new(),
        }
    }

    /// Create a registry with `SvgWriter` (svg) and `JsonWriter` (json) registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_writer(Box::new(SvgWriter::new()));
        registry.register_writer(Box::new(JsonWriter::new()));
        registry
    }

    /// Register a writer
    pub fn register_writer(&mut self, writer: Box<dyn LayoutWriter>) {
        self.writers.push(writer);
    }

    /// Find a writer by format ID
    pub fn writer_for_format(&self, format_id: &str) -> Option<&dyn LayoutWriter> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Get file extension from a path
    pub fn extension_from_path(path: &Path) -> Option<&str> {
        path.extension().and_then(|e| e.to_str())
    }

    /// Find a writer for the given path based on its extension
    pub fn writer_for_path(&self, path: &Path) -> IoResult<&dyn LayoutWriter> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.writer_for_format(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }
}
