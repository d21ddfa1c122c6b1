use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::schema::{COLLECTED_COLUMNS, REQUIRED_COLUMNS};
use crate::{decode_with_fallbacks, parse_metadata_document, parse_upload_date, read_table};
use crate::{RawTable, TextEncoding};

fn default_candidates() -> Vec<TextEncoding> {
    ["utf-8", "utf-8-sig", "gbk", "latin1"]
        .iter()
        .map(|label| TextEncoding::from_label(label).expect("known label"))
        .collect()
}

#[test]
fn parses_metadata_document_with_all_fields() {
    let record = parse_metadata_document(
        r#"{
            "id": "abc123",
            "title": "Top 10?",
            "upload_date": "20240301",
            "view_count": 100,
            "like_count": 5,
            "comment_count": 5,
            "duration": 300,
            "uploader": "ignored"
        }"#,
    )
    .expect("document should parse");

    assert_eq!(record.video_id(), "abc123");
    assert_eq!(record.title(), "Top 10?");
    assert_eq!(record.upload_date(), Some("20240301"));
    assert_eq!(record.view_count(), 100);
    assert_eq!(record.like_count(), 5);
    assert_eq!(record.comment_count(), 5);
    assert_eq!(record.duration_seconds(), 300.0);
}

#[test]
fn absent_and_null_numbers_default_to_zero() {
    let record = parse_metadata_document(
        r#"{"id": "x", "upload_date": "20240101", "like_count": null, "duration": 61.5}"#,
    )
    .expect("document should parse");

    assert_eq!(record.view_count(), 0);
    assert_eq!(record.like_count(), 0);
    assert_eq!(record.comment_count(), 0);
    assert_eq!(record.duration_seconds(), 61.5);
}

#[test]
fn numeric_id_and_title_are_kept_as_text() {
    let record =
        parse_metadata_document(r#"{"id": 12345, "title": 2024, "upload_date": "20240301"}"#)
            .expect("document should parse");

    assert_eq!(record.video_id(), "12345");
    assert_eq!(record.title(), "2024");

    let date = parse_upload_date(record.upload_date().unwrap()).unwrap();
    let row = record.to_collected_row(date);
    assert_eq!(row.video_id, "12345");
    assert_eq!(row.title, "2024");
}

#[test]
fn null_id_and_title_project_to_empty_text() {
    let record =
        parse_metadata_document(r#"{"id": null, "title": null, "upload_date": "20240301"}"#)
            .unwrap();

    assert_eq!(record.video_id(), "");
    assert_eq!(record.title(), "");
}

#[test]
fn empty_upload_date_counts_as_missing() {
    let record = parse_metadata_document(r#"{"id": "x", "upload_date": ""}"#).unwrap();
    assert_eq!(record.upload_date(), None);

    let record = parse_metadata_document(r#"{"id": "x"}"#).unwrap();
    assert_eq!(record.upload_date(), None);
}

#[test]
fn malformed_document_is_rejected() {
    assert!(matches!(
        parse_metadata_document("{not json"),
        Err(ParserError::Json(_))
    ));
    assert!(matches!(
        parse_metadata_document("[1, 2, 3]"),
        Err(ParserError::Json(_))
    ));
}

#[test]
fn upload_date_requires_eight_digits() {
    assert_eq!(
        parse_upload_date("20240115").unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );

    for bad in ["2024-01-15", "2024011", "202401150", "20241301", "20240230", " 20240115"] {
        assert!(
            matches!(parse_upload_date(bad), Err(ParserError::InvalidUploadDate { .. })),
            "expected {bad:?} to be rejected"
        );
    }
}

#[test]
fn collected_row_projection_uses_defaults() {
    let record = parse_metadata_document(r#"{"upload_date": "20240301"}"#).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let row = record.to_collected_row(date);

    assert_eq!(row.video_id, "");
    assert_eq!(row.title, "");
    assert_eq!(row.upload_date, date);
    assert_eq!(row.view_count, 0);
    assert_eq!(row.duration, 0.0);
}

#[test]
fn decode_prefers_first_matching_encoding() {
    let bytes = "\u{feff}video_id,title\nx,héllo\n".as_bytes();
    let decoded = decode_with_fallbacks(bytes, &default_candidates()).unwrap();

    assert_eq!(decoded.encoding, "utf-8");
    assert!(decoded.text.contains("héllo"));
}

#[test]
fn decode_falls_back_to_gbk() {
    let bytes = b"video_id,title\nx,\xD6\xD0\xCE\xC4\n";
    let decoded = decode_with_fallbacks(bytes, &default_candidates()).unwrap();

    assert_eq!(decoded.encoding, "gbk");
    assert!(decoded.text.contains("中文"));
}

#[test]
fn decode_falls_back_to_latin1() {
    let bytes = b"video_id,title\nx,caf\xE9\n";
    let decoded = decode_with_fallbacks(bytes, &default_candidates()).unwrap();

    assert_eq!(decoded.encoding, "latin1");
    assert!(decoded.text.contains("café"));
}

#[test]
fn gbk_rejects_bytes_outside_two_byte_layout() {
    let gbk = TextEncoding::from_label("gbk").unwrap();

    assert!(gbk.decode(b"x,\x80\n").is_err());
    assert!(gbk.decode(b"\x81\x30\x81\x30").is_err());
    assert!(gbk.decode(b"\xD6").is_err());
    assert_eq!(gbk.decode(b"\xD6\xD0").unwrap(), "中");
}

#[test]
fn lone_euro_byte_falls_through_to_latin1() {
    let decoded = decode_with_fallbacks(b"x,\x80\n", &default_candidates()).unwrap();

    assert_eq!(decoded.encoding, "latin1");
    assert_eq!(decoded.text, "x,\u{80}\n");
}

#[test]
fn latin1_maps_each_byte_to_same_code_point() {
    let latin1 = TextEncoding::from_label("latin1").unwrap();
    let bytes: Vec<u8> = (0x80..=0x9F).collect();
    let expected: String = (0x80u8..=0x9F).map(char::from).collect();

    assert_eq!(latin1.decode(&bytes).unwrap(), expected);
    assert_eq!(latin1.decode(b"caf\xE9").unwrap(), "café");
}

#[test]
fn decode_reports_every_attempt_on_failure() {
    let candidates = vec![
        TextEncoding::from_label("utf-8").unwrap(),
        TextEncoding::from_label("utf-8-sig").unwrap(),
    ];
    let err = decode_with_fallbacks(b"caf\xE9", &candidates).unwrap_err();

    match err {
        ParserError::Undecodable { attempts } => {
            let tried: Vec<&str> = attempts.iter().map(|a| a.encoding.as_str()).collect();
            assert_eq!(tried, ["utf-8", "utf-8-sig"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_encoding_label_is_rejected() {
    assert!(matches!(
        TextEncoding::from_label("klingon-8"),
        Err(ParserError::UnknownEncoding(_))
    ));
}

#[test]
fn reads_table_and_strips_bom_from_header() {
    let text = "\u{feff}video_id\ttitle\tupload_date\tview_count\tlike_count\tcomment_count\tduration\n\
                a\tTop 10?\t2024/03/01\t100\t5\t\t300\n";
    let table = read_table(text, b'\t').unwrap();

    assert_eq!(table.headers, COLLECTED_COLUMNS);
    assert_eq!(table.height(), 1);
    assert_eq!(table.cell(0, 0), Some("a"));
    assert_eq!(table.cell(0, 1), Some("Top 10?"));
    assert_eq!(table.cell(0, 5), None);
    assert!(table.missing_columns(&REQUIRED_COLUMNS).is_empty());
}

#[test]
fn reads_short_rows_and_null_markers_as_missing() {
    let table = read_table("video_id,title,view_count\na,NaN\nb,x,NA\n", b',').unwrap();

    assert_eq!(table.height(), 2);
    assert_eq!(table.cell(0, 1), None);
    assert_eq!(table.cell(0, 2), None);
    assert_eq!(table.cell(1, 1), Some("x"));
    assert_eq!(table.cell(1, 2), None);
}

#[test]
fn repeated_header_names_get_numeric_suffixes() {
    let table = read_table("video_id,title,,,title,title.1\na,b,,,c,d\n", b',').unwrap();

    assert_eq!(
        table.headers,
        ["video_id", "title", "", ".1", "title.1", "title.1.1"]
    );
    assert_eq!(table.column_index("title"), Some(1));
    assert_eq!(table.cell(0, 4), Some("c"));
}

#[test]
fn missing_columns_are_reported_in_required_order() {
    let table = RawTable {
        headers: vec!["title".into(), "video_id".into(), "upload_date".into()],
        rows: Vec::new(),
    };

    assert_eq!(
        table.missing_columns(&REQUIRED_COLUMNS),
        ["view_count", "like_count", "comment_count", "duration"]
    );
}

#[test]
fn empty_input_is_not_a_table() {
    assert!(matches!(read_table("", b','), Err(ParserError::EmptyTable)));
}
