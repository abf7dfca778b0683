use crate::error::BatchError;

/// Result of a read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

pub type ItemProcessorResult<O> = Result<O, BatchError>;

pub type ItemWriterResult = Result<(), BatchError>;

/// Source of items, read one at a time.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// Turns a read item into the item handed to the writer.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// Destination of items, written one chunk at a time.
///
/// A step calls `open` once, then `write` and `flush` for every chunk,
/// then `close` once all items were written.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
