//! Input file parsing for the GBILI CLI
//!
//! Feature matrix: one object per line, attributes separated by whitespace
//! or commas. Labels: integer object ids, whitespace or newline separated.
//! Blank lines and lines starting with `#` are ignored in both.

use anyhow::{bail, Context, Result};
use gbili_core::{FeatureMatrix, LabeledSet, ObjectId};
use std::fs;
use std::path::Path;

fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
}

/// Parses a feature matrix from text.
pub fn parse_features(text: &str) -> Result<FeatureMatrix> {
    let mut data = Vec::new();
    let mut dimension = None;

    for (line_no, line) in data_lines(text) {
        let mut count = 0usize;
        for field in fields(line) {
            let value: f32 = field
                .parse()
                .with_context(|| format!("line {line_no}: invalid number '{field}'"))?;
            data.push(value);
            count += 1;
        }

        match dimension {
            None => dimension = Some(count),
            Some(expected) if expected != count => bail!(
                "line {line_no}: expected {expected} attributes, found {count}"
            ),
            Some(_) => {}
        }
    }

    let Some(dimension) = dimension else {
        bail!("feature matrix contains no objects");
    };
    Ok(FeatureMatrix::new(data, dimension)?)
}

/// Parses labeled object ids from text.
pub fn parse_labels(text: &str) -> Result<LabeledSet> {
    let mut ids = Vec::new();
    for (line_no, line) in data_lines(text) {
        for field in fields(line) {
            let id: ObjectId = field
                .parse()
                .with_context(|| format!("line {line_no}: invalid object id '{field}'"))?;
            ids.push(id);
        }
    }
    Ok(LabeledSet::new(ids))
}

/// Reads and parses a feature matrix file.
pub fn read_features(path: &Path) -> Result<FeatureMatrix> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feature matrix {}", path.display()))?;
    parse_features(&text).with_context(|| format!("Invalid feature matrix {}", path.display()))
}

/// Reads and parses a labels file.
pub fn read_labels(path: &Path) -> Result<LabeledSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels {}", path.display()))?;
    parse_labels(&text).with_context(|| format!("Invalid labels file {}", path.display()))
}
