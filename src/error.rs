use thiserror::Error;

pub use crate::rule::RuleError;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    /// A CSV row could not be turned into a rule.
    #[error("Invalid row at line {line}: {source}")]
    InvalidRow {
        line: u64,
        #[source]
        source: RuleError,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Step {name} failed")]
    Step {
        name: String,
        #[source]
        source: Box<BatchError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
