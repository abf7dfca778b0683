//! Reading Mailbox autoswipe exports.
//!
//! The export is a header-less, comma separated file with one rule per
//! line. Quoting is not interpreted by the reader: every comma splits a
//! field and quotes stay in the field until the rule parser strips them.
//!
//! # Examples
//!
//! ```
//! use mailbox_filters::core::item::{ItemProcessor, ItemReader};
//! use mailbox_filters::item::csv::{CsvItemReader, RuleProcessor};
//! use mailbox_filters::rule::{Action, Selector};
//!
//! let export = "\
//! \"deleted\",\"\",\"from\",\"news@example.com\",\"3\"
//! \"archive\",\"\",\"subject\",\"foo\",\"bar\",\"5\"
//! ";
//!
//! let reader = CsvItemReader::from_reader(export.as_bytes());
//! let processor = RuleProcessor;
//!
//! let first = processor.process(&reader.read().unwrap().unwrap()).unwrap();
//! assert_eq!(first.action, Action::Archive);
//!
//! let second = processor.process(&reader.read().unwrap().unwrap()).unwrap();
//! assert_eq!(
//!     second.selector,
//!     Selector::SubjectContains {
//!         subject_substrings: vec!["foo".to_string(), "bar".to_string()]
//!     }
//! );
//! assert_eq!(second.action, Action::Delete);
//!
//! assert!(reader.read().unwrap().is_none());
//! ```

pub mod csv_reader;

/// Turns raw rows into rules.
pub mod rule_processor;

use std::path::Path;

use log::info;

use crate::{
    core::item::{ItemProcessor, ItemReader},
    error::BatchError,
    rule::Rule,
};

pub use csv_reader::{CsvItemReader, CsvRow};
pub use rule_processor::RuleProcessor;

/// Reads a whole export into rules, in file order.
///
/// # Errors
///
/// Fails when the file cannot be opened or read, or on the first row that
/// is not a valid rule. No rules are returned in that case.
pub fn parse_mailbox_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>, BatchError> {
    let path = path.as_ref();

    info!("Opening '{}'...", path.display());
    let reader = CsvItemReader::from_path(path)?;

    info!("Parsing '{}'...", path.display());
    let processor = RuleProcessor;
    let mut rules = Vec::new();
    while let Some(row) = reader.read()? {
        rules.push(processor.process(&row)?);
    }

    Ok(rules)
}
