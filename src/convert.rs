//! End-to-end conversion of a Mailbox export into a Gmail filter feed.

use std::path::PathBuf;

use log::info;

use crate::{
    core::{
        job::{Job, JobBuilder, JobExecution},
        step::{DEFAULT_CHUNK_SIZE, StepBuilder},
    },
    error::BatchError,
    item::{
        csv::{CsvItemReader, RuleProcessor},
        xml::FilterFeedWriter,
    },
};

pub const DEFAULT_INPUT: &str = "./autoswipe_rules.csv";
pub const DEFAULT_OUTPUT: &str = "./filters.xml";

/// Where to read the export and where to write the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Rules handed to the writer at once.
    pub chunk_size: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Summary of a successful conversion.
#[derive(Debug)]
pub struct ConvertReport {
    /// Number of entries in the written feed
    pub filter_count: usize,
    pub execution: JobExecution,
}

/// Reads `config.input`, converts every row and writes `config.output`.
///
/// The output file is written only once every row parsed; on any error it
/// is left untouched.
///
/// # Errors
///
/// - [`BatchError::Io`] when the input cannot be opened
/// - [`BatchError::Step`] wrapping the first read, parse or write error
pub fn convert(config: &ConvertConfig) -> Result<ConvertReport, BatchError> {
    info!("Opening '{}'...", config.input.display());
    let reader = CsvItemReader::from_path(&config.input)?;

    info!("Parsing '{}'...", config.input.display());
    let processor = RuleProcessor;
    let writer = FilterFeedWriter::from_path(&config.output);

    let step = StepBuilder::new()
        .name("mailbox-csv-to-gmail-xml")
        .reader(&reader)
        .processor(&processor)
        .writer(&writer)
        .chunk(config.chunk_size)
        .build()?;

    let job = JobBuilder::new().name("convert-filters").start(&step).build();
    let execution = job.run()?;

    info!("done!");

    Ok(ConvertReport {
        filter_count: writer.entry_count(),
        execution,
    })
}
