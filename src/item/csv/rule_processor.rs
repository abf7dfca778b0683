use log::debug;

use crate::{
    core::item::{ItemProcessor, ItemProcessorResult},
    error::BatchError,
    rule::{parse_row, Rule},
};

use super::CsvRow;

/// Maps a [`CsvRow`] to a [`Rule`]; a row that does not parse fails with
/// [`BatchError::InvalidRow`] carrying its line number.
#[derive(Default, Debug, Clone, Copy)]
pub struct RuleProcessor;

impl ItemProcessor<CsvRow, Rule> for RuleProcessor {
    fn process(&self, item: &CsvRow) -> ItemProcessorResult<Rule> {
        let rule = parse_row(&item.fields).map_err(|source| BatchError::InvalidRow {
            line: item.line,
            source,
        })?;

        debug!("Line {}: {:?}", item.line, rule);
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::item::ItemProcessor,
        error::{BatchError, RuleError},
        item::csv::CsvRow,
        rule::{Action, Selector},
    };

    use super::RuleProcessor;

    fn row(line: u64, fields: &[&str]) -> CsvRow {
        CsvRow {
            line,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn valid_row_becomes_a_rule() {
        let rule = RuleProcessor
            .process(&row(1, &["\"archive\"", "\"\"", "\"to\"", "\"me@example.com\"", "\"9\""]))
            .unwrap();

        assert_eq!(rule.action, Action::Delete);
        assert_eq!(
            rule.selector,
            Selector::To {
                email_address: "me@example.com".to_string()
            }
        );
        assert_eq!(rule.usage_count, 9);
    }

    #[test]
    fn invalid_row_reports_its_line() {
        let err = RuleProcessor
            .process(&row(7, &["deleted", "", "cc", "a@example.com", "1"]))
            .unwrap_err();

        match err {
            BatchError::InvalidRow { line, source } => {
                assert_eq!(line, 7);
                assert_eq!(source, RuleError::UnknownSelectorType("cc".to_string()));
            }
            other => panic!("expected an invalid row error, got {:?}", other),
        }
    }
}
