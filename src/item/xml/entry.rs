use std::io::Write;

use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, Event},
};

use crate::{
    error::BatchError,
    rule::{Action, Rule, Selector},
};

/// Namespace of the Gmail filter settings schema.
pub const APPS_NAMESPACE: &str = "http://schemas.google.com/apps/2006";

/// Prefix bound to [`APPS_NAMESPACE`] on the feed root.
pub const APPS_PREFIX: &str = "apps";

const PROPERTY_TAG: &str = "apps:property";

/// Title of every entry.
pub const ENTRY_TITLE: &str = "Mail Filter";

/// One `apps:property` element of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: &'static str,
    pub value: String,
}

impl Property {
    fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// One `<entry>` of the feed. An entry always has exactly one selector
/// property followed by one action property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub selector: Property,
    pub action: Property,
}

/// Builds the Gmail search expression matching every substring:
/// `["foo", "bar"]` gives `("foo" AND "bar")`.
pub fn subject_query<S: AsRef<str>>(substrings: &[S]) -> String {
    let terms: Vec<String> = substrings
        .iter()
        .map(|s| format!("\"{}\"", s.as_ref()))
        .collect();
    format!("({})", terms.join(" AND "))
}

impl From<&Selector> for Property {
    fn from(selector: &Selector) -> Self {
        match selector {
            Selector::To { email_address } => Property::new("to", email_address.as_str()),
            Selector::From { email_address } => Property::new("from", email_address.as_str()),
            Selector::SubjectContains { subject_substrings } => {
                Property::new("subject", subject_query(subject_substrings.as_slice()))
            }
        }
    }
}

impl From<Action> for Property {
    fn from(action: Action) -> Self {
        match action {
            Action::Archive => Property::new("shouldArchive", "true"),
            Action::Delete => Property::new("shouldTrash", "true"),
        }
    }
}

impl From<&Rule> for FilterEntry {
    fn from(rule: &Rule) -> Self {
        Self {
            selector: Property::from(&rule.selector),
            action: Property::from(rule.action),
        }
    }
}

pub(crate) fn write_event<W: Write>(
    writer: &mut Writer<W>,
    event: Event<'_>,
) -> Result<(), BatchError> {
    writer
        .write_event(event)
        .map_err(|e| BatchError::ItemWriter(format!("Failed to write XML event: {}", e)))
}

/// Writes `<name attr="value"/>`.
pub(crate) fn write_empty<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), BatchError> {
    let mut element = BytesStart::new(name);
    for attribute in attributes {
        element.push_attribute(*attribute);
    }
    write_event(writer, Event::Empty(element))
}

impl FilterEntry {
    pub fn properties(&self) -> [&Property; 2] {
        [&self.selector, &self.action]
    }

    /// Writes the entry:
    ///
    /// ```xml
    /// <entry>
    ///   <category term="filter"/>
    ///   <title text="Mail Filter"/>
    ///   <content/>
    ///   <apps:property name="from" value="a@example.com"/>
    ///   <apps:property name="shouldArchive" value="true"/>
    /// </entry>
    /// ```
    ///
    /// without the indentation.
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), BatchError> {
        write_event(writer, Event::Start(BytesStart::new("entry")))?;
        write_empty(writer, "category", &[("term", "filter")])?;
        write_empty(writer, "title", &[("text", ENTRY_TITLE)])?;
        write_empty(writer, "content", &[])?;

        for property in self.properties() {
            write_empty(
                writer,
                PROPERTY_TAG,
                &[("name", property.name), ("value", property.value.as_str())],
            )?;
        }

        write_event(writer, Event::End(BytesEnd::new("entry")))
    }
}

#[cfg(test)]
mod tests {
    use quick_xml::Writer;

    use crate::rule::{Action, Rule, Selector};

    use super::{FilterEntry, Property, subject_query};

    fn render(entry: &FilterEntry) -> String {
        let mut writer = Writer::new(Vec::new());
        entry.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn subject_query_joins_quoted_terms() {
        assert_eq!(subject_query(&["a", "b", "c"]), r#"("a" AND "b" AND "c")"#);
        assert_eq!(subject_query(&["only"]), r#"("only")"#);
    }

    #[test]
    fn from_rule_with_archive_action() {
        let rule = Rule {
            action: Action::Archive,
            selector: Selector::From {
                email_address: "a@example.com".to_string(),
            },
            usage_count: 3,
        };

        let entry = FilterEntry::from(&rule);

        assert_eq!(
            entry.properties(),
            [
                &Property::new("from", "a@example.com"),
                &Property::new("shouldArchive", "true"),
            ]
        );
    }

    #[test]
    fn to_rule_with_delete_action() {
        let rule = Rule {
            action: Action::Delete,
            selector: Selector::To {
                email_address: "me@example.com".to_string(),
            },
            usage_count: 0,
        };

        let entry = FilterEntry::from(&rule);

        assert_eq!(entry.selector, Property::new("to", "me@example.com"));
        assert_eq!(entry.action, Property::new("shouldTrash", "true"));
    }

    #[test]
    fn entry_is_written_with_fixed_header_elements() {
        let rule = Rule {
            action: Action::Delete,
            selector: Selector::SubjectContains {
                subject_substrings: vec!["foo".to_string(), "bar".to_string()],
            },
            usage_count: 5,
        };

        let xml = render(&FilterEntry::from(&rule));

        assert_eq!(
            xml,
            "<entry>\
             <category term=\"filter\"/>\
             <title text=\"Mail Filter\"/>\
             <content/>\
             <apps:property name=\"subject\" value=\"(&quot;foo&quot; AND &quot;bar&quot;)\"/>\
             <apps:property name=\"shouldTrash\" value=\"true\"/>\
             </entry>"
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let entry = FilterEntry {
            selector: Property::new("from", "<odd&addr>"),
            action: Property::from(Action::Archive),
        };

        let xml = render(&entry);

        assert!(xml.contains("value=\"&lt;odd&amp;addr&gt;\""));
    }
}
