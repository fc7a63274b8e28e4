//! shell::output
//!
//! Shared writers for command output.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// A clonable handle to the writer a shell streams output into.
///
/// The prompt line, child stdout, and child stderr may be written from
/// different tasks; writes are serialized through a mutex.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputSink {
    /// Wrap an arbitrary writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// The process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Box<dyn Write + Send>>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("output writer lock poisoned"))
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::stdout()
    }
}

/// An in-memory writer whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        match self.buf.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Everything written so far, lossily decoded.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .map_err(|_| io::Error::other("capture buffer lock poisoned"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fans writes out to several writers.
pub(crate) struct Tee {
    targets: Vec<Box<dyn Write + Send>>,
}

impl Tee {
    pub(crate) fn new(targets: Vec<Box<dyn Write + Send>>) -> Self {
        Self { targets }
    }
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for target in &mut self.targets {
            target.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for target in &mut self.targets {
            target.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_clones_share_contents() {
        let capture = CaptureBuffer::new();
        let mut writer = capture.clone();
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        assert_eq!(capture.contents_string(), "hello world");
    }

    #[test]
    fn sink_forwards_to_inner_writer() {
        let capture = CaptureBuffer::new();
        let mut sink = OutputSink::new(capture.clone());
        let mut other = sink.clone();
        sink.write_all(b"a").unwrap();
        other.write_all(b"b").unwrap();
        sink.flush().unwrap();
        assert_eq!(capture.contents(), b"ab");
    }

    #[test]
    fn tee_writes_everywhere() {
        let a = CaptureBuffer::new();
        let b = CaptureBuffer::new();
        let mut tee = Tee::new(vec![Box::new(a.clone()), Box::new(b.clone())]);
        tee.write_all(b"both").unwrap();
        assert_eq!(a.contents(), b"both");
        assert_eq!(b.contents(), b"both");
    }

    #[test]
    fn discard_accepts_writes() {
        let mut sink = OutputSink::discard();
        assert!(sink.write_all(b"ignored").is_ok());
    }
}
