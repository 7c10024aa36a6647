//! Recording resource used by unit tests

use super::Resource;
use crate::error::{Error, Result};
use hyper::body::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// How the mock answers `seek`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    Native,
    /// No seek capability at all (trait default)
    Missing,
    /// Seek exists but reports `io::ErrorKind::Unsupported`
    IoUnsupported,
    /// Seek fails with an unrelated I/O error
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read(usize),
    Seek(u64),
    Close,
    Marker(&'static str),
}

/// Shared call log, still readable after the mock has been moved away
#[derive(Debug, Clone, Default)]
pub struct MockLog(Arc<Mutex<Vec<Call>>>);

impl MockLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Read(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Seek(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Close).count()
    }
}

/// Resource that records every call and serves filler bytes
///
/// Unless scripted, each read returns exactly the requested number of bytes.
#[derive(Debug)]
pub struct MockResource {
    log: MockLog,
    seek_mode: SeekMode,
    script: Option<VecDeque<&'static [u8]>>,
    closable: bool,
    readable: bool,
}

impl MockResource {
    pub fn new() -> Self {
        Self {
            log: MockLog::default(),
            seek_mode: SeekMode::Native,
            script: None,
            closable: true,
            readable: true,
        }
    }

    pub fn seek_mode(mut self, mode: SeekMode) -> Self {
        self.seek_mode = mode;
        self
    }

    /// Serve these chunks in order, then report exhaustion
    pub fn script(mut self, chunks: &[&'static [u8]]) -> Self {
        self.script = Some(chunks.iter().copied().collect());
        self
    }

    pub fn without_close(mut self) -> Self {
        self.closable = false;
        self
    }

    pub fn unreadable(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn with_log(mut self, log: MockLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> MockLog {
        self.log.clone()
    }

    pub fn reads(&self) -> Vec<usize> {
        self.log.reads()
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.log.seeks()
    }
}

impl Resource for MockResource {
    fn read(&mut self, size: usize) -> Result<Bytes> {
        self.log.push(Call::Read(size));
        match self.script.as_mut() {
            Some(script) => Ok(script.pop_front().map(Bytes::from_static).unwrap_or_default()),
            None => Ok(Bytes::from(vec![b'x'; size])),
        }
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        match self.seek_mode {
            SeekMode::Missing => Err(Error::SeekUnsupported),
            SeekMode::Native => {
                self.log.push(Call::Seek(offset));
                Ok(())
            }
            SeekMode::IoUnsupported => {
                self.log.push(Call::Seek(offset));
                Err(std::io::Error::from(std::io::ErrorKind::Unsupported).into())
            }
            SeekMode::Broken => {
                self.log.push(Call::Seek(offset));
                Err(std::io::Error::other("disk on fire").into())
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.closable {
            self.log.push(Call::Close);
        }
        Ok(())
    }

    fn is_readable(&self) -> bool {
        self.readable
    }
}
