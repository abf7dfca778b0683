//! Filter rules as exported by Mailbox, and the positional row format they
//! come in.
//!
//! A row looks like `action,ignored,selector_type,value[,value...],usage_count`.
//! Every field may be wrapped in one pair of double quotes; embedded commas
//! are not supported, so every comma starts a new field.
//!
//! ```
//! use mailbox_filters::rule::{parse_line, Action, Selector};
//!
//! let rule = parse_line(r#""deleted","","from","a@example.com","3""#).unwrap();
//!
//! assert_eq!(rule.action, Action::Archive);
//! assert_eq!(
//!     rule.selector,
//!     Selector::From { email_address: "a@example.com".to_string() }
//! );
//! assert_eq!(rule.usage_count, 3);
//! ```

use thiserror::Error;

/// What to do with a message matched by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Archive,
    Delete,
}

/// Discriminant of [`Selector`], as named in the CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    From,
    To,
    SubjectContains,
}

/// Matching criterion of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    From { email_address: String },
    To { email_address: String },
    /// Matches when the subject contains every substring.
    SubjectContains { subject_substrings: Vec<String> },
}

impl Selector {
    pub fn kind(&self) -> SelectorKind {
        match self {
            Selector::From { .. } => SelectorKind::From,
            Selector::To { .. } => SelectorKind::To,
            Selector::SubjectContains { .. } => SelectorKind::SubjectContains,
        }
    }
}

/// One filter instruction, built from a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    pub selector: Selector,
    /// How many times Mailbox applied the rule. Not part of the XML output.
    ///
    /// See [`parse_usage_count`] for counts outside the range of `i64`.
    pub usage_count: i64,
}

/// CSV action labels. The export labels are swapped relative to their
/// meaning: "deleted" archives and "archive" trashes.
pub const ACTION_LABELS: [(&str, Action); 2] =
    [("deleted", Action::Archive), ("archive", Action::Delete)];

/// CSV selector type labels.
pub const SELECTOR_LABELS: [(&str, SelectorKind); 3] = [
    ("from", SelectorKind::From),
    ("to", SelectorKind::To),
    ("subject", SelectorKind::SubjectContains),
];

/// action, ignored, selector type, at least one selector value, usage count.
pub const MIN_FIELDS: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum RuleError {
    #[error("expected at least 5 fields, found {found}")]
    MissingFields { found: usize },

    #[error("Unknown selector type: '{0}'")]
    UnknownSelectorType(String),

    #[error("Unknown action: '{0}'")]
    UnknownAction(String),

    #[error("Invalid usage count '{value}': not an integer")]
    InvalidUsageCount { value: String },
}

fn lookup<T: Copy>(table: &[(&str, T)], label: &str) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| *key == label)
        .map(|(_, value)| *value)
}

/// Looks up a CSV action label.
pub fn action_from_label(label: &str) -> Result<Action, RuleError> {
    lookup(&ACTION_LABELS, label).ok_or_else(|| RuleError::UnknownAction(label.to_string()))
}

/// Looks up a CSV selector type label.
pub fn selector_kind_from_label(label: &str) -> Result<SelectorKind, RuleError> {
    lookup(&SELECTOR_LABELS, label)
        .ok_or_else(|| RuleError::UnknownSelectorType(label.to_string()))
}

/// Trims surrounding whitespace, then drops one leading and one trailing `"`.
pub fn clean_field(raw: &str) -> &str {
    let field = raw.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

/// Parses a usage count: an optional `+` or `-` followed by ASCII digits.
///
/// The count is never exported, so any length of digits is accepted and
/// values outside the range of `i64` saturate to `i64::MIN` or `i64::MAX`.
pub fn parse_usage_count(text: &str) -> Result<i64, RuleError> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RuleError::InvalidUsageCount {
            value: text.to_string(),
        });
    }

    // Digits only, so overflow is the one way left to fail.
    let saturated = if text.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    };
    Ok(text.parse::<i64>().unwrap_or(saturated))
}

/// Builds a rule from the fields of one row.
///
/// Fields are cleaned with [`clean_field`] before use. The second field is
/// never looked at. For `from`/`to` rows only the first selector value is
/// kept; `subject` rows keep all of them in order.
///
/// # Errors
///
/// Fails on rows shorter than [`MIN_FIELDS`], unknown selector or action
/// labels, and a last field that is not an integer.
pub fn parse_row<S: AsRef<str>>(fields: &[S]) -> Result<Rule, RuleError> {
    if fields.len() < MIN_FIELDS {
        return Err(RuleError::MissingFields {
            found: fields.len(),
        });
    }

    let fields: Vec<&str> = fields.iter().map(|f| clean_field(f.as_ref())).collect();
    let last = fields.len() - 1;
    let (action_label, selector_label, usage_count) = (fields[0], fields[2], fields[last]);
    // Everything between the selector type and the last field is a selector
    // value; there is at least one.
    let selector_values = &fields[3..last];
    let first_value = selector_values[0];

    let selector = match selector_kind_from_label(selector_label)? {
        SelectorKind::From => Selector::From {
            email_address: first_value.to_string(),
        },
        SelectorKind::To => Selector::To {
            email_address: first_value.to_string(),
        },
        SelectorKind::SubjectContains => Selector::SubjectContains {
            subject_substrings: selector_values.iter().map(|v| v.to_string()).collect(),
        },
    };

    let action = action_from_label(action_label)?;

    let usage_count = parse_usage_count(usage_count)?;

    Ok(Rule {
        action,
        selector,
        usage_count,
    })
}

/// Splits a raw line on every comma and parses it with [`parse_row`].
pub fn parse_line(line: &str) -> Result<Rule, RuleError> {
    let fields: Vec<&str> = line.split(',').collect();
    parse_row(&fields)
}
