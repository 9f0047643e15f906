// ABOUTME: Progress reporting seam for archive uploads.
// ABOUTME: The actor wraps upload streams; rendering is left to the implementation.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Observes bytes as they are read for upload.
pub trait ProgressBar: Send + Sync {
    /// Wrap `reader` so reads can be reported. `size` is the total expected.
    fn wrap(&self, reader: Box<dyn Read + Send>, size: u64) -> Box<dyn Read + Send>;

    /// Called once the upload has been accepted.
    fn complete(&self) {}
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressBar for NoProgress {
    fn wrap(&self, reader: Box<dyn Read + Send>, _size: u64) -> Box<dyn Read + Send> {
        reader
    }
}

/// Counts uploaded bytes and logs a line when each upload completes.
#[derive(Debug, Clone, Default)]
pub struct TransferLog {
    transferred: Arc<AtomicU64>,
}

impl TransferLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes read through every wrapped stream so far.
    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed)
    }
}

impl ProgressBar for TransferLog {
    fn wrap(&self, reader: Box<dyn Read + Send>, size: u64) -> Box<dyn Read + Send> {
        tracing::debug!("uploading {} bytes", size);
        Box::new(CountingReader {
            inner: reader,
            counter: Arc::clone(&self.transferred),
        })
    }

    fn complete(&self) {
        tracing::info!("upload finished, {} bytes sent", self.transferred());
    }
}

struct CountingReader {
    inner: Box<dyn Read + Send>,
    counter: Arc<AtomicU64>,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}
