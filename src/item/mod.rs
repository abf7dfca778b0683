/// Reads Mailbox CSV exports and turns their rows into rules.
pub mod csv;

/// Writes rules as a Gmail filter XML feed.
pub mod xml;
