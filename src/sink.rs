//! Destinations for human-readable report lines.
//!
//! Components never print directly; they write to a [`ReportSink`] handed to
//! them. The CLI combines a console sink and a run-log file sink with
//! [`TeeSink`]; tests capture lines with [`MemorySink`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Line-oriented output destination.
pub trait ReportSink {
    /// Write one line (without trailing newline).
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Sink over any [`Write`] implementation.
///
/// Every line is flushed immediately so an interrupted run still leaves a
/// complete log up to the last processed sample.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// Sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl WriterSink<BufWriter<File>> {
    /// Sink writing to a newly created (truncated) file.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Duplicates every line to several sinks.
#[derive(Default)]
pub struct TeeSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl TeeSink {
    /// Empty tee.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a destination.
    #[must_use]
    pub fn with(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True when there are no destinations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for TeeSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.write_line(line)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Lines written so far.
    pub lines: Vec<String>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// True if any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl ReportSink for MemorySink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}
