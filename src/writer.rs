// File: src/writer.rs
use crate::error::{MarkovError, Result};
use crate::persistence::{CorpusSink, CorpusStore};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Serialises corpus appends on a dedicated thread so the request path never
/// blocks on disk. The thread owns the append handle.
pub struct BackgroundWriter {
    sender: Option<Sender<Vec<Vec<String>>>>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWriter {
    pub fn spawn(mut store: CorpusStore) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Vec<Vec<String>>>();
        let handle = thread::Builder::new()
            .name("corpus-writer".into())
            .spawn(move || {
                for batch in receiver {
                    if let Err(e) = store.append(&batch) {
                        error!(error = %e, lost = batch.len(), "corpus append failed");
                    }
                }
                debug!("corpus writer drained");
            })?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }
}

impl CorpusSink for BackgroundWriter {
    /// Queues the batch; the write itself happens on the writer thread.
    fn append(&mut self, sequences: &[Vec<String>]) -> Result<()> {
        if sequences.is_empty() {
            return Ok(());
        }
        let sender = self.sender.as_ref().ok_or(MarkovError::WriterClosed)?;
        sender
            .send(sequences.to_vec())
            .map_err(|_| MarkovError::WriterClosed)
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        // closing the channel lets the thread finish the queue and exit
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("corpus writer thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn drop_flushes_every_queued_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learned.txt");

        let mut writer = BackgroundWriter::spawn(CorpusStore::new(&path)).unwrap();
        for i in 0..10 {
            writer
                .append(&[vec![format!("line{i}"), "end".to_string()]])
                .unwrap();
        }
        drop(writer);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "line0 end");
        assert_eq!(lines[9], "line9 end");
    }
}
