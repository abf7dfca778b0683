use csv::{ReaderBuilder, StringRecordsIntoIter, Terminator, Trim};
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fs::File,
    io::{self, Read},
    path::Path,
};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

/// One raw line of the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number in the source
    pub line: u64,
    /// Whitespace-trimmed fields, quotes left in place
    pub fields: Vec<String>,
}

impl CsvRow {
    /// An empty line: a single empty field.
    fn blank(line: u64) -> Self {
        Self {
            line,
            fields: vec![String::new()],
        }
    }
}

/// Remembers where the newlines are in the bytes handed to the CSV parser.
///
/// The parser drops empty lines without a trace, so line numbers are
/// recovered from the offset at which each record ends.
struct LineTracker<R> {
    inner: R,
    newlines: Vec<u64>,
    len: u64,
}

impl<R> LineTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            newlines: Vec::new(),
            len: 0,
        }
    }

    /// Line of the record whose bytes, terminator included, end at `offset`.
    fn line_ending_at(&self, offset: u64) -> u64 {
        let before = self.newlines.partition_point(|&newline| newline < offset);
        // Only the last line of the input may end without a newline.
        let terminated = before > 0 && self.newlines[before - 1] + 1 == offset;
        before as u64 + u64::from(!terminated)
    }

    /// Number of lines seen so far; a final line without newline counts.
    fn line_count(&self) -> u64 {
        let newlines = self.newlines.len() as u64;
        let unterminated = self.len > 0 && self.newlines.last() != Some(&(self.len - 1));
        newlines + u64::from(unterminated)
    }
}

impl<R: Read> Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = self.inner.read(buf)?;
        let start = self.len;
        self.newlines.extend(
            buf[..count]
                .iter()
                .enumerate()
                .filter(|(_, byte)| **byte == b'\n')
                .map(|(i, _)| start + i as u64),
        );
        self.len += count as u64;
        Ok(count)
    }
}

/// A CSV item reader that implements the `ItemReader` trait.
///
/// Every line of the source becomes one row, and rows may have any number
/// of fields. An empty line is a row with a single empty field. Lines end
/// at `\n`; a trailing `\r` is trimmed with the rest of the whitespace.
///
/// # Examples
///
/// ```
/// use mailbox_filters::core::item::ItemReader;
/// use mailbox_filters::item::csv::CsvItemReader;
///
/// let reader = CsvItemReader::from_reader("\"deleted\", \"\" ,\"from\",\"a,b\"\n\n".as_bytes());
///
/// let row = reader.read().unwrap().unwrap();
/// assert_eq!(row.line, 1);
/// assert_eq!(row.fields, vec!["\"deleted\"", "\"\"", "\"from\"", "\"a", "b\""]);
///
/// let blank = reader.read().unwrap().unwrap();
/// assert_eq!(blank.line, 2);
/// assert_eq!(blank.fields, vec![""]);
///
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct CsvItemReader<R> {
    /// Iterator over the CSV records
    ///
    /// Uses `RefCell` so `read` can advance the iterator through `&self`.
    records: RefCell<StringRecordsIntoIter<LineTracker<R>>>,
    /// Rows found but not handed out yet: empty lines seen ahead of a record
    pending: RefCell<VecDeque<CsvRow>>,
    /// First line not yet turned into a row
    next_line: Cell<u64>,
}

impl<R: Read> CsvItemReader<R> {
    /// Creates a `CsvItemReader` from any source implementing `Read`.
    ///
    /// Fields are split on every comma: there are no headers and quotes are
    /// ordinary characters. Fields are trimmed.
    pub fn from_reader(rdr: R) -> Self {
        let rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(LineTracker::new(rdr));

        Self {
            records: RefCell::new(rdr.into_records()),
            pending: RefCell::new(VecDeque::new()),
            next_line: Cell::new(1),
        }
    }
}

impl CsvItemReader<File> {
    /// Creates a `CsvItemReader` from a file path.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> ItemReader<CsvRow> for CsvItemReader<R> {
    /// Reads the next row.
    ///
    /// # Returns
    /// - `Ok(Some(row))` if a row is successfully read
    /// - `Ok(None)` if there are no more rows to read
    /// - `Err(BatchError::ItemReader(error))` if the source cannot be read
    ///   or is not valid UTF-8
    fn read(&self) -> ItemReaderResult<CsvRow> {
        if let Some(row) = self.pending.borrow_mut().pop_front() {
            return Ok(Some(row));
        }

        let mut records = self.records.borrow_mut();
        // `skipped_until` is the first line after the empty ones the parser
        // went over.
        let (row, skipped_until) = match records.next() {
            Some(Ok(record)) => {
                let end = records.reader().position().byte();
                let line = records.reader().get_ref().line_ending_at(end);
                let fields = record.iter().map(str::to_string).collect();
                (Some(CsvRow { line, fields }), line)
            }
            Some(Err(error)) => return Err(BatchError::ItemReader(error.to_string())),
            None => (None, records.reader().get_ref().line_count() + 1),
        };

        let mut pending = self.pending.borrow_mut();
        pending.extend((self.next_line.get()..skipped_until).map(CsvRow::blank));
        self.next_line.set(skipped_until + u64::from(row.is_some()));
        pending.extend(row);

        Ok(pending.pop_front())
    }
}
