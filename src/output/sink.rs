//! Output sinks shared by concurrent writer tasks.

use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Writer wrapper that treats a closed downstream pipe as success.
pub struct IgnoreBrokenPipe<W: Write> {
    inner: W,
}

impl<W: Write> IgnoreBrokenPipe<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for IgnoreBrokenPipe<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                // Downstream command closed the pipe (e.g. `| head`)
                Ok(buf.len())
            } else {
                Err(e)
            }
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                Ok(())
            } else {
                Err(e)
            }
        })
    }
}

/// Set of writers that receive every output line.
///
/// All writes go through one mutex so lines from concurrent tasks never
/// interleave.
#[derive(Default)]
pub struct OutputSinks {
    writers: Mutex<Vec<Box<dyn Write + Send>>>,
}

impl OutputSinks {
    /// Creates an empty sink set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arbitrary writer.
    pub fn push<W: Write + Send + 'static>(&mut self, writer: W) {
        self.writers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(writer));
    }

    /// Creates (truncating) `path` and adds it as a buffered sink.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created.
    pub fn add_file(&mut self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.push(BufWriter::new(file));
        Ok(())
    }

    /// Adds standard output as a sink.
    pub fn add_console(&mut self) {
        self.push(IgnoreBrokenPipe::new(io::stdout()));
    }

    /// Number of writers.
    pub fn len(&self) -> usize {
        self.writers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if there are no writers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes `line` to every sink.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        for writer in writers.iter_mut() {
            writer.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    /// Flushes every sink.
    pub fn flush(&self) -> io::Result<()> {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        for writer in writers.iter_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}
