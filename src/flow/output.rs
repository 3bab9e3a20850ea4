use std::fmt::{self, Display};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use super::Action;
use crate::error::PipelineError;

pub const SAMPLE_SEPARATOR: &str = " ";
pub const COMPLETED_MARKER: &str = "Completed";

/// Writes each acted-on item as its text followed by a separator, and the `Completed` marker
/// when the pipeline completes.
///
/// Clones share the same writer, so one output can be handed to a pipeline while the caller
/// keeps a handle for line breaks or inspection.
pub struct TextOutput<W> {
    writer: Arc<Mutex<W>>,
}

impl TextOutput<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl TextOutput<Vec<u8>> {
    pub fn buffer() -> Self {
        Self::new(Vec::new())
    }

    /// Everything written so far.
    pub fn contents(&self) -> Result<String, PipelineError> {
        let buffer = self.lock()?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl<W: Write> TextOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Arc::new(Mutex::new(writer)) }
    }

    pub fn write_sample(&self, item: impl Display) -> Result<(), PipelineError> {
        let mut writer = self.lock()?;
        write!(writer, "{}{}", item, SAMPLE_SEPARATOR)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_completed(&self) -> Result<(), PipelineError> {
        let mut writer = self.lock()?;
        writer.write_all(COMPLETED_MARKER.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_line_break(&self) -> Result<(), PipelineError> {
        let mut writer = self.lock()?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, W>, PipelineError> {
        self.writer.lock().map_err(|err| PipelineError::Poisoned(err.to_string()))
    }
}

impl<T, W> Action<T> for TextOutput<W>
where
    T: Display,
    W: Write + Send,
{
    fn act(&mut self, item: T) -> Result<(), PipelineError> {
        self.write_sample(item)
    }

    fn complete(&mut self) -> Result<(), PipelineError> {
        self.write_completed()
    }
}

impl<W> Clone for TextOutput<W> {
    fn clone(&self) -> Self {
        Self { writer: Arc::clone(&self.writer) }
    }
}

impl<W> fmt::Debug for TextOutput<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextOutput").finish()
    }
}
