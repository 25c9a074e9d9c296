//! Edge list serialization.
//!
//! Formats:
//! - [`OutputFormat::Text`]: `source target weight\n`, no header
//! - [`OutputFormat::Jsonl`]: `{"source":0,"target":1,"weight":0.5}\n`
//!
//! Edges are written exactly as produced: no deduplication, no
//! symmetrization.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::graph::Edge;
use std::io::{BufWriter, Write};

/// Sink for a finished edge list.
pub trait GraphWriter {
    /// Writes every edge, in order.
    ///
    /// # Errors
    ///
    /// IO or serialization failures.
    fn write_edges(&mut self, edges: &[Edge]) -> Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// IO failures.
    fn finish(&mut self) -> Result<()>;
}

/// Whitespace-separated text records.
#[derive(Debug)]
pub struct TextEdgeWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> TextEdgeWriter<W> {
    /// Wraps `sink` in a buffered writer.
    pub fn new(sink: W) -> Self {
        Self {
            out: BufWriter::new(sink),
        }
    }
}

impl<W: Write> GraphWriter for TextEdgeWriter<W> {
    fn write_edges(&mut self, edges: &[Edge]) -> Result<()> {
        for edge in edges {
            writeln!(self.out, "{} {} {}", edge.source, edge.target, edge.weight)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON object per line.
#[derive(Debug)]
pub struct JsonLinesEdgeWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> JsonLinesEdgeWriter<W> {
    /// Wraps `sink` in a buffered writer.
    pub fn new(sink: W) -> Self {
        Self {
            out: BufWriter::new(sink),
        }
    }
}

impl<W: Write> GraphWriter for JsonLinesEdgeWriter<W> {
    fn write_edges(&mut self, edges: &[Edge]) -> Result<()> {
        for edge in edges {
            serde_json::to_writer(&mut self.out, edge)?;
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Returns the writer for `format` over `sink`.
///
/// Edges can be written in several batches; call
/// [`GraphWriter::finish`] once at the end.
pub fn writer_for<'w, W: Write + 'w>(format: OutputFormat, sink: W) -> Box<dyn GraphWriter + 'w> {
    match format {
        OutputFormat::Text => Box::new(TextEdgeWriter::new(sink)),
        OutputFormat::Jsonl => Box::new(JsonLinesEdgeWriter::new(sink)),
    }
}

/// Writes `edges` to `sink` in `format` and flushes.
///
/// # Errors
///
/// IO or serialization failures.
pub fn write_edges<W: Write>(format: OutputFormat, sink: W, edges: &[Edge]) -> Result<()> {
    let mut writer = writer_for(format, sink);
    writer.write_edges(edges)?;
    writer.finish()
}
