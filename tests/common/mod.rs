#![allow(dead_code)]
//! Temporary input and output files for integration tests.
use std::{env::temp_dir, fs, path::PathBuf};

use rand::distr::{Alphanumeric, SampleString};

/// Writes `content` to a fresh CSV file and returns its path together with
/// an unused output path next to it.
pub fn write_export(content: &str) -> (PathBuf, PathBuf) {
    let file_name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    let input = temp_dir().join(format!("{}.csv", file_name));
    let output = temp_dir().join(format!("{}.xml", file_name));

    fs::write(&input, content).expect("Failed to write CSV file");

    (input, output)
}

/// All `<apps:property .../>` elements of a feed, as `(name, value)` pairs
/// with the value still escaped.
pub fn properties(xml: &str) -> Vec<(String, String)> {
    xml.split("<apps:property ")
        .skip(1)
        .map(|element| {
            let name = attribute(element, "name");
            let value = attribute(element, "value");
            (name, value)
        })
        .collect()
}

fn attribute(element: &str, name: &str) -> String {
    let start = element
        .find(&format!("{}=\"", name))
        .map(|i| i + name.len() + 2)
        .expect("attribute present");
    let end = element[start..].find('"').expect("attribute closed") + start;
    element[start..end].to_string()
}
