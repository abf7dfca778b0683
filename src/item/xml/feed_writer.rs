use std::{
    cell::{Cell, RefCell},
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::BatchError,
    rule::Rule,
};

use super::entry::{APPS_NAMESPACE, APPS_PREFIX, FilterEntry, write_empty, write_event};

/// Title of the feed root.
pub const FEED_TITLE: &str = "Mail Filters";

enum Destination<W> {
    Path(PathBuf),
    Writer(W),
}

/// Writes rules as a Gmail filter feed.
///
/// The document is built in memory; the destination is only touched by
/// `close`. A step that fails before closing the writer therefore leaves an
/// existing output file as it was. Writing a path truncates the file, there
/// is no temporary file and rename.
///
/// # Examples
///
/// ```
/// use mailbox_filters::core::item::ItemWriter;
/// use mailbox_filters::item::xml::FilterFeedWriter;
/// use mailbox_filters::rule::parse_line;
///
/// let rules = vec![parse_line("deleted,,from,a@example.com,3").unwrap()];
///
/// let mut buffer = Vec::new();
/// {
///     let writer = FilterFeedWriter::from_writer(&mut buffer);
///     writer.open().unwrap();
///     writer.write(&rules).unwrap();
///     writer.close().unwrap();
/// }
///
/// let xml = String::from_utf8(buffer).unwrap();
/// assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
/// assert!(xml.contains("<apps:property name=\"from\" value=\"a@example.com\"/>"));
/// assert!(xml.contains("<apps:property name=\"shouldArchive\" value=\"true\"/>"));
/// assert!(xml.ends_with("</feed>"));
/// ```
pub struct FilterFeedWriter<W: Write = File> {
    writer: RefCell<Writer<Vec<u8>>>,
    destination: RefCell<Destination<W>>,
    entry_count: Cell<usize>,
}

impl FilterFeedWriter<File> {
    /// The file at `path` is created or truncated when the writer is closed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new(Destination::Path(path.as_ref().to_path_buf()))
    }
}

impl<W: Write> FilterFeedWriter<W> {
    pub fn from_writer(wtr: W) -> Self {
        Self::new(Destination::Writer(wtr))
    }

    fn new(destination: Destination<W>) -> Self {
        Self {
            writer: RefCell::new(Writer::new(Vec::new())),
            destination: RefCell::new(destination),
            entry_count: Cell::new(0),
        }
    }

    /// Number of entries written so far.
    pub fn entry_count(&self) -> usize {
        self.entry_count.get()
    }

    fn write_document(&self, bytes: &[u8]) -> ItemWriterResult {
        match &mut *self.destination.borrow_mut() {
            Destination::Path(path) => {
                info!("Exporting to '{}'...", path.display());
                fs::write(&*path, bytes).map_err(|e| {
                    BatchError::ItemWriter(format!(
                        "Failed to write XML file '{}': {}",
                        path.display(),
                        e
                    ))
                })
            }
            Destination::Writer(wtr) => {
                info!("Exporting XML feed...");
                wtr.write_all(bytes)
                    .and_then(|()| wtr.flush())
                    .map_err(|e| BatchError::ItemWriter(format!("Failed to write XML feed: {}", e)))
            }
        }
    }
}

impl<W: Write> ItemWriter<Rule> for FilterFeedWriter<W> {
    /// Starts the document: XML declaration, `<feed>` root with the `apps`
    /// namespace and the feed title.
    fn open(&self) -> ItemWriterResult {
        let mut guard = self.writer.borrow_mut();
        let writer = &mut *guard;

        write_event(
            writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_event(writer, Event::Text(BytesText::new("\n")))?;

        let namespace = format!("xmlns:{}", APPS_PREFIX);
        let mut root = BytesStart::new("feed");
        root.push_attribute((namespace.as_str(), APPS_NAMESPACE));
        write_event(writer, Event::Start(root))?;

        write_empty(writer, "title", &[("text", FEED_TITLE)])
    }

    fn write(&self, items: &[Rule]) -> ItemWriterResult {
        let mut guard = self.writer.borrow_mut();
        let writer = &mut *guard;

        for rule in items {
            FilterEntry::from(rule).write_to(writer)?;
        }

        self.entry_count.set(self.entry_count.get() + items.len());
        debug!("{} entries buffered", self.entry_count());
        Ok(())
    }

    /// Ends the document and hands it to the destination.
    fn close(&self) -> ItemWriterResult {
        let bytes = {
            let mut guard = self.writer.borrow_mut();
            let writer = &mut *guard;
            write_event(writer, Event::End(BytesEnd::new("feed")))?;
            std::mem::take(writer.get_mut())
        };

        self.write_document(&bytes)
    }
}

/// Writes `rules` to `path` as a complete filter feed, replacing any
/// existing file.
pub fn dump_filters_xml<P: AsRef<Path>>(rules: &[Rule], path: P) -> Result<(), BatchError> {
    let writer = FilterFeedWriter::from_path(path);
    writer.open()?;
    writer.write(rules)?;
    writer.close()
}
