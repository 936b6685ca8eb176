//! Where finished documents go.
//!
//! The writer only produces bytes.  Handing them to the user (a browser
//! download, a file on disk, a buffer in a test) is the sink's job.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

/// Receives a serialized document under its file name.
pub trait DocumentSink {
    /// Delivery failure.
    type Error: Display;

    /// Deliver `bytes` as `filename`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the document could not be delivered.
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// A document delivered to a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    /// File name the document was saved under.
    pub filename: String,
    /// Serialized PDF.
    pub bytes: Vec<u8>,
}

/// Keeps delivered documents in memory.
///
/// Clones share the same storage, so a clone handed to a writer can be
/// inspected after the writer is gone.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saved: Rc<RefCell<Vec<SavedDocument>>>,
}

impl MemorySink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything delivered so far.
    #[must_use]
    pub fn take(&self) -> Vec<SavedDocument> {
        std::mem::take(&mut *self.saved.borrow_mut())
    }
}

impl DocumentSink for MemorySink {
    type Error = std::convert::Infallible;

    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), Self::Error> {
        self.saved.borrow_mut().push(SavedDocument {
            filename: filename.to_owned(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let sink = MemorySink::new();
        let mut handle = sink.clone();
        handle.deliver("a.pdf", b"%PDF").unwrap();
        let saved = sink.take();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].filename, "a.pdf");
        assert!(sink.take().is_empty());
    }
}
