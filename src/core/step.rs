use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use log::{debug, error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter},
};

/// Number of items read before a chunk is processed and written.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

#[derive(Debug, PartialEq)]
enum ChunkStatus {
    /// The chunk is full, more items may follow.
    Full,
    /// The reader is exhausted.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    Failed,
}

/// Summary of a finished step.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier of the step instance
    pub id: Uuid,
    pub name: String,
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully processed
    pub process_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
}

/// A unit of work inside a job.
pub trait Step {
    fn get_name(&self) -> &str;

    /// Runs the step to completion.
    ///
    /// # Returns
    /// - `Ok(StepExecution)` when every item was read, processed and written
    /// - `Err(BatchError)` with the first error met; nothing after it runs
    fn execute(&self) -> Result<StepExecution, BatchError>;
}

/// A chunk-oriented step: read items until a chunk is full, process them,
/// write them, repeat until the reader is exhausted.
///
/// The step stops at the first error. The writer is only closed when every
/// chunk went through, so writers that defer output to `close` never
/// produce a partial result.
pub struct StepInstance<'a, I, O> {
    id: Uuid,
    name: String,
    reader: &'a dyn ItemReader<I>,
    processor: &'a dyn ItemProcessor<I, O>,
    writer: &'a dyn ItemWriter<O>,
    chunk_size: usize,
    status: Cell<StepStatus>,
    read_count: Cell<usize>,
    process_count: Cell<usize>,
    write_count: Cell<usize>,
}

impl<I, O> Step for StepInstance<'_, I, O> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self) -> Result<StepExecution, BatchError> {
        let start_time = Instant::now();

        info!("Start of step: {}, id: {}", self.name, self.id);
        self.status.set(StepStatus::Started);

        let result = self.run_chunks();

        match &result {
            Ok(()) => self.status.set(StepStatus::Success),
            Err(err) => {
                error!("Step {} failed: {}", self.name, err);
                self.status.set(StepStatus::Failed);
            }
        }

        info!(
            "End of step: {}, id: {}, read: {}, written: {}",
            self.name,
            self.id,
            self.read_count.get(),
            self.write_count.get()
        );

        result.map(|()| StepExecution {
            id: self.id,
            name: self.name.clone(),
            status: self.status.get(),
            start_time,
            end_time: Instant::now(),
            duration: start_time.elapsed(),
            read_count: self.read_count.get(),
            process_count: self.process_count.get(),
            write_count: self.write_count.get(),
        })
    }
}

impl<I, O> StepInstance<'_, I, O> {
    pub fn get_status(&self) -> StepStatus {
        self.status.get()
    }

    pub fn get_read_count(&self) -> usize {
        self.read_count.get()
    }

    pub fn get_process_count(&self) -> usize {
        self.process_count.get()
    }

    pub fn get_write_count(&self) -> usize {
        self.write_count.get()
    }

    fn run_chunks(&self) -> Result<(), BatchError> {
        self.writer.open()?;

        let mut read_items: Vec<I> = Vec::with_capacity(self.chunk_size);

        loop {
            let chunk_status = self.read_chunk(&mut read_items)?;

            if !read_items.is_empty() {
                let processed_items = self.process_chunk(&read_items)?;
                self.write_chunk(&processed_items)?;
            }

            if chunk_status == ChunkStatus::Finished {
                break;
            }
        }

        self.writer.close()
    }

    fn read_chunk(&self, read_items: &mut Vec<I>) -> Result<ChunkStatus, BatchError> {
        debug!("Start reading chunk");
        read_items.clear();

        while let Some(item) = self.reader.read()? {
            read_items.push(item);
            self.read_count.set(self.read_count.get() + 1);

            if read_items.len() == self.chunk_size {
                debug!("End reading chunk: FULL");
                return Ok(ChunkStatus::Full);
            }
        }

        debug!("End reading chunk: FINISHED");
        Ok(ChunkStatus::Finished)
    }

    fn process_chunk(&self, read_items: &[I]) -> Result<Vec<O>, BatchError> {
        debug!("Start processing chunk");

        let mut processed_items = Vec::with_capacity(read_items.len());
        for item in read_items {
            processed_items.push(self.processor.process(item)?);
            self.process_count.set(self.process_count.get() + 1);
        }

        debug!("End processing chunk");
        Ok(processed_items)
    }

    fn write_chunk(&self, processed_items: &[O]) -> Result<(), BatchError> {
        debug!("Start writing chunk");

        self.writer.write(processed_items)?;
        self.writer.flush()?;
        self.write_count
            .set(self.write_count.get() + processed_items.len());

        debug!("End writing chunk");
        Ok(())
    }
}

/// Builder for [`StepInstance`].
///
/// ```
/// use mailbox_filters::core::item::{ItemProcessor, ItemProcessorResult, ItemReader, ItemReaderResult, ItemWriter, ItemWriterResult};
/// use mailbox_filters::core::step::{Step, StepBuilder, StepStatus};
/// use std::cell::{Cell, RefCell};
///
/// struct Countdown(Cell<u32>);
///
/// impl ItemReader<u32> for Countdown {
///     fn read(&self) -> ItemReaderResult<u32> {
///         let n = self.0.get();
///         if n == 0 {
///             return Ok(None);
///         }
///         self.0.set(n - 1);
///         Ok(Some(n))
///     }
/// }
///
/// struct Double;
///
/// impl ItemProcessor<u32, u32> for Double {
///     fn process(&self, item: &u32) -> ItemProcessorResult<u32> {
///         Ok(item * 2)
///     }
/// }
///
/// #[derive(Default)]
/// struct Collect(RefCell<Vec<u32>>);
///
/// impl ItemWriter<u32> for Collect {
///     fn write(&self, items: &[u32]) -> ItemWriterResult {
///         self.0.borrow_mut().extend_from_slice(items);
///         Ok(())
///     }
/// }
///
/// let reader = Countdown(Cell::new(3));
/// let writer = Collect::default();
///
/// let step = StepBuilder::new()
///     .name("double")
///     .reader(&reader)
///     .processor(&Double)
///     .writer(&writer)
///     .chunk(2)
///     .build()
///     .unwrap();
///
/// let execution = step.execute().unwrap();
///
/// assert_eq!(execution.status, StepStatus::Success);
/// assert_eq!(execution.write_count, 3);
/// assert_eq!(*writer.0.borrow(), vec![6, 4, 2]);
/// ```
pub struct StepBuilder<'a, I, O> {
    name: Option<String>,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: usize,
}

impl<I, O> Default for StepBuilder<'_, I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, I, O> StepBuilder<'a, I, O> {
    pub fn new() -> Self {
        Self {
            name: None,
            reader: None,
            processor: None,
            writer: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a impl ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Sets the commit interval. A size of zero is treated as one.
    pub fn chunk(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// # Errors
    /// Returns [`BatchError::Configuration`] when the reader, processor or
    /// writer is missing.
    pub fn build(self) -> Result<StepInstance<'a, I, O>, BatchError> {
        let missing = |part: &str| BatchError::Configuration(format!("step has no {}", part));

        Ok(StepInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            reader: self.reader.ok_or_else(|| missing("reader"))?,
            processor: self.processor.ok_or_else(|| missing("processor"))?,
            writer: self.writer.ok_or_else(|| missing("writer"))?,
            chunk_size: self.chunk_size,
            status: Cell::new(StepStatus::Starting),
            read_count: Cell::new(0),
            process_count: Cell::new(0),
            write_count: Cell::new(0),
        })
    }
}
