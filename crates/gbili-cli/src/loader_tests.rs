//! Tests for `loader` module

use super::loader::*;
use std::io::Write;

#[test]
fn test_parse_whitespace_matrix() {
    // Arrange
    let text = "0.0 1.0\n2.5\t-3\n\n4 5\n";

    // Act
    let matrix = parse_features(text).expect("parse");

    // Assert
    assert_eq!(matrix.len(), 3);
    assert_eq!(matrix.dimension(), 2);
    assert_eq!(matrix.row(1), &[2.5, -3.0]);
}

#[test]
fn test_parse_comma_matrix_with_comments() {
    let text = "# x,y,z\n1,2,3\n4, 5, 6\n";

    let matrix = parse_features(text).expect("parse");

    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.row(0), &[1.0, 2.0, 3.0]);
    assert_eq!(matrix.row(1), &[4.0, 5.0, 6.0]);
}

#[test]
fn test_ragged_matrix_reports_line() {
    let err = parse_features("1 2\n3 4\n5\n").expect_err("ragged");

    assert!(err.to_string().contains("line 3"), "{err}");
}

#[test]
fn test_invalid_number_reports_line() {
    let err = parse_features("1 2\n3 abc\n").expect_err("bad number");

    assert!(format!("{err:#}").contains("line 2"), "{err:#}");
}

#[test]
fn test_empty_matrix_rejected() {
    assert!(parse_features("# only a comment\n\n").is_err());
}

#[test]
fn test_non_finite_value_rejected() {
    assert!(parse_features("1 2\nNaN 3\n").is_err());
}

#[test]
fn test_parse_labels() {
    let labels = parse_labels("4\n0\n\n# comment\n4\n").expect("parse");

    assert_eq!(labels.as_slice(), &[0, 4]);
}

#[test]
fn test_parse_labels_rejects_negative() {
    let err = parse_labels("1\n-2\n").expect_err("negative id");

    assert!(format!("{err:#}").contains("line 2"), "{err:#}");
}

#[test]
fn test_read_from_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let features = dir.path().join("data.txt");
    let labels = dir.path().join("labels.txt");
    writeln!(std::fs::File::create(&features).expect("create"), "0\n1\n2").expect("write");
    writeln!(std::fs::File::create(&labels).expect("create"), "1").expect("write");

    let matrix = read_features(&features).expect("features");
    let labeled = read_labels(&labels).expect("labels");

    assert_eq!(matrix.len(), 3);
    assert_eq!(labeled.len(), 1);
}

#[test]
fn test_missing_file_names_path() {
    let err = read_labels(std::path::Path::new("/nonexistent/labels.txt")).expect_err("missing");

    assert!(err.to_string().contains("labels.txt"), "{err}");
}
