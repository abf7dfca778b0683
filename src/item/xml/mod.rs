//! Gmail filter feed output.
//!
//! Every rule becomes one `<entry>` of a `<feed>` document in the format
//! Gmail accepts under "Import filters":
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <feed xmlns:apps="http://schemas.google.com/apps/2006">
//!   <title text="Mail Filters"/>
//!   <entry>
//!     <category term="filter"/>
//!     <title text="Mail Filter"/>
//!     <content/>
//!     <apps:property name="subject" value="(&quot;foo&quot; AND &quot;bar&quot;)"/>
//!     <apps:property name="shouldTrash" value="true"/>
//!   </entry>
//! </feed>
//! ```
//!
//! The actual output carries no indentation.

pub mod entry;
pub mod feed_writer;

pub use entry::{FilterEntry, Property, subject_query};
pub use feed_writer::{FilterFeedWriter, dump_filters_xml};
