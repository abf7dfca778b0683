mod common;

use std::{fs, iter};

use common::write_export;
use mailbox_filters::{
    BatchError, RuleError,
    convert::{ConvertConfig, convert},
    core::item::{ItemProcessor, ItemReader},
    item::csv::{CsvItemReader, RuleProcessor, parse_mailbox_csv},
};

fn run(input: std::path::PathBuf, output: std::path::PathBuf) -> Result<usize, BatchError> {
    convert(&ConvertConfig {
        input,
        output,
        ..ConvertConfig::default()
    })
    .map(|report| report.filter_count)
}

fn row_error(error: BatchError) -> (u64, RuleError) {
    match error {
        BatchError::Step { source, .. } => match *source {
            BatchError::InvalidRow { line, source } => (line, source),
            other => panic!("expected an invalid row, got {:?}", other),
        },
        other => panic!("expected a step error, got {:?}", other),
    }
}

#[test]
fn unknown_selector_type_aborts_before_writing() {
    let (input, output) = write_export(
        "deleted,,from,a@example.com,1\n\
         deleted,,cc,b@example.com,2\n",
    );

    let error = run(input, output.clone()).unwrap_err();

    let (line, source) = row_error(error);
    assert_eq!(line, 2);
    assert_eq!(source, RuleError::UnknownSelectorType("cc".to_string()));
    assert!(!output.exists());
}

#[test]
fn unknown_action_aborts() {
    let (input, output) = write_export("\"trash\",\"\",\"from\",\"a@example.com\",\"1\"\n");

    let (_, source) = row_error(run(input, output.clone()).unwrap_err());

    assert_eq!(source, RuleError::UnknownAction("trash".to_string()));
    assert!(!output.exists());
}

#[test]
fn non_integer_usage_count_aborts() {
    let (input, output) = write_export("deleted,,from,a@example.com,many\n");

    let (_, source) = row_error(run(input, output.clone()).unwrap_err());

    assert_eq!(
        source,
        RuleError::InvalidUsageCount {
            value: "many".to_string()
        }
    );
    assert!(!output.exists());
}

#[test]
fn blank_line_aborts_with_its_line_number() {
    let (input, output) = write_export(
        "deleted,,from,a@example.com,1\n\ndeleted,,from,b@example.com,2\n",
    );

    let (line, source) = row_error(run(input, output.clone()).unwrap_err());

    assert_eq!(line, 2);
    assert_eq!(source, RuleError::MissingFields { found: 1 });
    assert!(!output.exists());
}

#[test]
fn trailing_blank_line_aborts() {
    let (input, output) = write_export("deleted,,from,a@example.com,1\r\n\r\n");

    let (line, source) = row_error(run(input, output.clone()).unwrap_err());

    assert_eq!(line, 2);
    assert_eq!(source, RuleError::MissingFields { found: 1 });
    assert!(!output.exists());
}

#[test]
fn bad_row_after_blank_lines_keeps_its_line_number() {
    let (input, _) = write_export(
        "deleted,,from,a@example.com,1\n\n\ndeleted,,cc,b@example.com,2\n",
    );

    // The export as a whole stops at the first blank line.
    match parse_mailbox_csv(&input) {
        Err(BatchError::InvalidRow { line, source }) => {
            assert_eq!(line, 2);
            assert_eq!(source, RuleError::MissingFields { found: 1 });
        }
        other => panic!("expected an invalid row, got {:?}", other),
    }

    // Row by row, the later selector error is still tied to line 4.
    let reader = CsvItemReader::from_path(&input).unwrap();
    let errors: Vec<(u64, RuleError)> = iter::from_fn(|| reader.read().unwrap())
        .filter_map(|row| RuleProcessor.process(&row).err())
        .map(|error| match error {
            BatchError::InvalidRow { line, source } => (line, source),
            other => panic!("expected an invalid row, got {:?}", other),
        })
        .collect();

    assert_eq!(
        errors,
        vec![
            (2, RuleError::MissingFields { found: 1 }),
            (3, RuleError::MissingFields { found: 1 }),
            (4, RuleError::UnknownSelectorType("cc".to_string())),
        ]
    );
}

#[test]
fn over_long_usage_count_is_accepted() {
    let (input, output) = write_export("deleted,,from,a@example.com,99999999999999999999\n");

    assert_eq!(run(input, output.clone()).unwrap(), 1);
    assert!(output.exists());
}

#[test]
fn short_row_aborts() {
    let (input, output) = write_export("deleted,,from,1\n");

    let (_, source) = row_error(run(input, output).unwrap_err());

    assert_eq!(source, RuleError::MissingFields { found: 4 });
}

#[test]
fn failed_run_leaves_previous_output_untouched() {
    // More rows than one chunk, so earlier chunks are written before the failure.
    let mut export = String::new();
    for i in 0..25 {
        export.push_str(&format!("deleted,,from,user{}@example.com,{}\n", i, i));
    }
    export.push_str("deleted,,from,last@example.com,oops\n");
    let (input, output) = write_export(&export);
    fs::write(&output, "previous filters").unwrap();

    let error = run(input, output.clone()).unwrap_err();

    let (line, _) = row_error(error);
    assert_eq!(line, 26);
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous filters");
}

#[test]
fn missing_input_is_an_io_error() {
    let (input, output) = write_export("");
    fs::remove_file(&input).unwrap();

    let error = run(input.clone(), output.clone()).unwrap_err();

    assert!(matches!(error, BatchError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    assert!(!output.exists());
    assert!(matches!(parse_mailbox_csv(&input), Err(BatchError::Io(_))));
}

#[test]
fn unwritable_output_is_reported() {
    let (input, _) = write_export("deleted,,from,a@example.com,1\n");
    let output = std::path::PathBuf::from("/nonexistent/directory/filters.xml");

    let error = run(input, output).unwrap_err();

    match error {
        BatchError::Step { source, .. } => {
            assert!(matches!(*source, BatchError::ItemWriter(ref m) if m.contains("/nonexistent/directory/filters.xml")));
        }
        other => panic!("expected a step error, got {:?}", other),
    }
}

#[test]
fn parse_mailbox_csv_returns_no_partial_result() {
    let (input, _) = write_export("deleted,,from,a@example.com,1\ndeleted,,bcc,b@example.com,2\n");

    let result = parse_mailbox_csv(&input);

    match result {
        Err(BatchError::InvalidRow { line, source }) => {
            assert_eq!(line, 2);
            assert_eq!(source, RuleError::UnknownSelectorType("bcc".to_string()));
        }
        other => panic!("expected an invalid row, got {:?}", other),
    }
}
