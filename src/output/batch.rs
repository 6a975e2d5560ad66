//! Batched rendering of page records
//!
//! Records are buffered until the batch is full, then keywords are extracted
//! and every record is rendered in turn. A failed render is logged and counted;
//! the rest of the batch continues.

use crate::keywords::KeywordExtractor;
use crate::output::traits::{DocumentEmitter, KeywordSet, PageRecord, PageTotal};
use std::path::PathBuf;

/// Outcome of one flush
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlushOutcome {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

/// Buffers page records and hands them to a [`DocumentEmitter`] in batches
pub struct PdfBatcher<E: DocumentEmitter> {
    emitter: E,
    keywords: KeywordExtractor,
    batch_size: usize,
    pending: Vec<PageRecord>,
}

impl<E: DocumentEmitter> PdfBatcher<E> {
    pub fn new(emitter: E, keywords: KeywordExtractor, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            emitter,
            keywords,
            batch_size,
            pending: Vec::with_capacity(batch_size),
        }
    }

    /// Queues a record; returns true when the batch should be flushed
    pub fn push(&mut self, record: PageRecord) -> bool {
        self.pending.push(record);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.batch_size
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Renders and releases every pending record
    pub fn flush(&mut self, total: PageTotal) -> FlushOutcome {
        let mut outcome = FlushOutcome::default();
        if self.pending.is_empty() {
            return outcome;
        }

        tracing::info!(
            "Rendering batch of {} page(s), total {}",
            self.pending.len(),
            total
        );

        for record in self.pending.drain(..) {
            let keywords = KeywordSet {
                terms: self.keywords.extract(&record.raw_text),
                source_sequence: record.sequence_number,
            };

            match self.emitter.emit(&record, &keywords, total) {
                Ok(path) => {
                    tracing::info!(
                        sequence = record.sequence_number,
                        url = %record.url,
                        path = %path.display(),
                        "Wrote PDF"
                    );
                    outcome.written.push(path);
                }
                Err(e) => {
                    tracing::error!(
                        sequence = record.sequence_number,
                        url = %record.url,
                        error = %e,
                        "Failed to render page"
                    );
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}
