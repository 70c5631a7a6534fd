use log::debug;

use crate::error::Result;
use crate::sink::{Record, Sink};

/// Number of records and flushes produced by one accumulator
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub records: u64,
    pub batches: u64,
}

/// Buffers records of one kind and hands them to the sink `batch_size` at a time.
///
/// This is the only place generated records live in memory, so the buffer never
/// grows past `batch_size`.
pub struct BatchAccumulator<'s, T: Record, S: Sink + ?Sized> {
    sink: &'s mut S,
    buffer: Vec<T>,
    batch_size: usize,
    stats: BatchStats,
}

impl<'s, T: Record, S: Sink + ?Sized> BatchAccumulator<'s, T, S> {
    /// # Panics
    /// If `batch_size` is zero, config validation rejects that before any accumulator exists
    #[must_use]
    pub fn new(sink: &'s mut S, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        BatchAccumulator {
            sink,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            stats: BatchStats::default(),
        }
    }

    /// # Errors
    /// Propagates a sink failure when this record completes a batch
    pub fn add(&mut self, record: T) -> Result<()> {
        self.buffer.push(record);
        self.stats.records += 1;
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Records accepted so far, flushed or not
    #[must_use]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        T::write_batch(&mut *self.sink, &self.buffer)?;
        self.stats.batches += 1;
        debug!(
            "Flushed {} {} (batch {})",
            self.buffer.len(),
            T::PHASE,
            self.stats.batches
        );
        self.buffer.clear();
        Ok(())
    }

    /// Flushes whatever is left, even a partial batch
    ///
    /// # Errors
    /// Propagates a sink failure on the final flush
    pub fn finish(mut self) -> Result<BatchStats> {
        self.flush()?;
        Ok(self.stats)
    }
}
