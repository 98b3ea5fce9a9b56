use super::ingest::to_csv_bytes;
use super::*;

fn names(cols: &[String]) -> Vec<&str> {
    cols.iter().map(String::as_str).collect()
}

#[test]
fn test_parse_keeps_column_and_row_order() {
    let dataset = parse_csv(b"time,src,bytes\n1,10.0.0.1,300\n2,10.0.0.2,120\n").unwrap();

    assert_eq!(names(dataset.columns()), vec!["time", "src", "bytes"]);
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.rows()[1], vec!["2", "10.0.0.2", "120"]);
}

#[test]
fn test_parse_strips_bom() {
    let dataset = parse_csv(b"\xEF\xBB\xBFa,b\n1,2\n").unwrap();
    assert_eq!(names(dataset.columns()), vec!["a", "b"]);
}

#[test]
fn test_empty_upload_is_a_parse_error() {
    let err = parse_csv(b"").unwrap_err();
    assert!(matches!(err, IngestError::Parse(ref m) if m == "No columns to parse from file"));
}

#[test]
fn test_long_row_is_a_parse_error() {
    let err = parse_csv(b"a,b\n1,2\n3,4,5\n").unwrap_err();
    match err {
        IngestError::Parse(msg) => assert_eq!(msg, "Expected 2 fields in line 3, saw 3"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_short_row_is_padded_with_missing_cells() {
    let dataset = parse_csv(b"a,b,c\n1,2\n").unwrap();
    assert_eq!(dataset.rows()[0], vec!["1", "2", ""]);
}

#[test]
fn test_invalid_utf8_is_a_parse_error() {
    assert!(matches!(parse_csv(b"a,b\n1,\xff\n"), Err(IngestError::Parse(_))));
}

#[test]
fn test_duplicate_headers_are_renamed() {
    let dataset = parse_csv(b"x,x,y,x\n1,2,3,4\n").unwrap();
    assert_eq!(names(dataset.columns()), vec!["x", "x.1", "y", "x.2"]);
}

#[test]
fn test_head_and_tail() {
    let dataset = parse_csv(b"n\n0\n1\n2\n3\n4\n").unwrap();

    let head = dataset.head(2);
    assert_eq!(head.first_row, 0);
    assert_eq!(head.rows, vec![vec!["0"], vec!["1"]]);

    let tail = dataset.tail(2);
    assert_eq!(tail.first_row, 3);
    assert_eq!(tail.rows, vec![vec!["3"], vec!["4"]]);

    assert_eq!(dataset.tail(50).rows.len(), 5);
}

#[test]
fn test_numeric_columns_are_selected_and_filled() {
    let dataset = parse_csv(b"user,amount,score,flag\nann,10,NA,yes\nbob,,2.5,no\n").unwrap();
    let features = FeatureMatrix::from_dataset(&dataset, &[]).unwrap();

    assert_eq!(names(features.columns()), vec!["amount", "score"]);
    assert_eq!(features.values().row(0).to_vec(), vec![10.0, 0.0]);
    assert_eq!(features.values().row(1).to_vec(), vec![0.0, 2.5]);
}

#[test]
fn test_all_missing_column_counts_as_numeric() {
    let dataset = parse_csv(b"a,empty\n1,\n2,\n").unwrap();
    let features = FeatureMatrix::from_dataset(&dataset, &[]).unwrap();

    assert_eq!(names(features.columns()), vec!["a", "empty"]);
    assert!(features.values().column(1).iter().all(|v| *v == 0.0));
}

#[test]
fn test_excluded_columns_are_skipped() {
    let dataset = parse_csv(b"Time,V1,Class\n0,1.5,0\n1,-0.5,1\n").unwrap();
    let features = FeatureMatrix::from_dataset(&dataset, &["Class".to_string()]).unwrap();
    assert_eq!(names(features.columns()), vec!["Time", "V1"]);
}

#[test]
fn test_text_only_dataset_has_no_features() {
    let dataset = parse_csv(b"host,verdict\nweb,ok\n").unwrap();
    assert!(matches!(
        FeatureMatrix::from_dataset(&dataset, &[]),
        Err(IngestError::NoNumericFeatures)
    ));
}

#[test]
fn test_header_only_dataset_has_no_features() {
    let dataset = parse_csv(b"a,b\n").unwrap();
    assert_eq!(dataset.row_count(), 0);
    assert!(matches!(
        FeatureMatrix::from_dataset(&dataset, &[]),
        Err(IngestError::NoNumericFeatures)
    ));
}

#[test]
fn test_csv_round_trip_preserves_cells() {
    let input = b"name,comment,value\n\"Doe, J\",\"said \"\"hi\"\"\",1.50\nx,,\n";
    let dataset = parse_csv(input).unwrap();

    let reparsed = parse_csv(&to_csv_bytes(&dataset).unwrap()).unwrap();
    assert_eq!(reparsed, dataset);
    assert_eq!(reparsed.rows()[0][2], "1.50");
}
