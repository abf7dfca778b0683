/*!
 # Mailbox filters

 Converts the CSV export of Mailbox "autoswipe" rules into an XML feed that
 Gmail imports as mail filters.

 The conversion is a single batch job built from the pieces in [`core`]:

 - **ItemReader:** [`item::csv::CsvItemReader`] reads the header-less export,
   one row per line.
 - **ItemProcessor:** [`item::csv::RuleProcessor`] turns a row into a
   [`rule::Rule`].
 - **ItemWriter:** [`item::xml::FilterFeedWriter`] renders every rule as a
   feed entry and writes the document once all rows are converted.

 Any bad row stops the job and nothing is written.

 ```no_run
 use mailbox_filters::convert::{convert, ConvertConfig};

 fn main() -> Result<(), mailbox_filters::BatchError> {
     let report = convert(&ConvertConfig::default())?;
     println!("{} filters exported", report.filter_count);
     Ok(())
 }
 ```

 The two stages are also available on their own:

 ```no_run
 use mailbox_filters::item::{csv::parse_mailbox_csv, xml::dump_filters_xml};

 let rules = parse_mailbox_csv("autoswipe_rules.csv")?;
 dump_filters_xml(&rules, "filters.xml")?;
 # Ok::<(), mailbox_filters::BatchError>(())
 ```
*/

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Readers, processors and writers of the conversion
pub mod item;

pub mod rule;

pub mod convert;
