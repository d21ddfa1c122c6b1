use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;
use vidmetrics_core::pipeline::{build_feature_table, run_all, run_feature_builder};
use vidmetrics_core::{PipelineConfig, PipelineError};
use vidmetrics_parser::{read_table, ParserError};

fn config_for(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.collector.input_dir = dir.join("docs");
    config.collector.output_path = dir.join("videos.csv");
    config.features.input_path = dir.join("videos.csv");
    config.features.output_path = dir.join("videos_features.csv");
    config
}

fn read_output(path: &Path) -> vidmetrics_parser::RawTable {
    let bytes = fs::read(path).expect("output written");
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "output must carry a BOM");
    read_table(std::str::from_utf8(&bytes).unwrap(), b',').unwrap()
}

#[test]
fn collects_and_featurizes_single_recent_video() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(
        docs.join("a.info.json"),
        json!({"id": "a", "upload_date": "20240301", "view_count": 100, "like_count": 5,
               "comment_count": 5, "duration": 300, "title": "Top 10?"})
        .to_string(),
    )
    .unwrap();
    fs::write(
        docs.join("b.info.json"),
        json!({"id": "b", "upload_date": "20230101", "view_count": 50, "title": "old"})
            .to_string(),
    )
    .unwrap();

    let config = config_for(dir.path());
    let summary = run_all(&config).unwrap();

    assert_eq!(summary.collection.files_found, 2);
    assert_eq!(summary.collection.retained, 1);
    assert_eq!(summary.features.output_rows, 1);
    assert_eq!(summary.features.encoding, "utf-8");

    let intermediate = read_output(&config.collector.output_path);
    assert_eq!(intermediate.height(), 1);
    assert_eq!(intermediate.cell(0, 0), Some("a"));

    let output = read_output(&config.features.output_path);
    assert_eq!(output.height(), 1);
    let cell = |name: &str| {
        let idx = output.column_index(name).unwrap_or_else(|| panic!("missing {name}"));
        output.cell(0, idx).map(str::to_string)
    };

    assert_eq!(cell("video_id").as_deref(), Some("a"));
    assert_eq!(cell("upload_date").as_deref(), Some("2024-03-01"));
    assert_eq!(cell("view_ratio").as_deref(), Some("1.0"));
    assert_eq!(cell("engagement_ratio").as_deref(), Some("1.0"));
    assert_eq!(cell("is_question").as_deref(), Some("True"));
    assert_eq!(cell("has_number").as_deref(), Some("True"));
    assert_eq!(cell("duration_min").as_deref(), Some("5.0"));
    assert_eq!(cell("duration_bucket").as_deref(), Some("5-10"));
    assert_eq!(cell("duration_quartile").as_deref(), Some("Q1"));
    assert_eq!(cell("publish_hour").as_deref(), Some("0"));
    assert_eq!(cell("publish_weekday").as_deref(), Some("4"));
}

#[test]
fn missing_duration_column_aborts_without_output() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    fs::write(
        &config.features.input_path,
        "\u{feff}video_id,title,upload_date,view_count,like_count,comment_count\na,t,2024-03-01,1,1,1\n",
    )
    .unwrap();

    let err = run_feature_builder(&config).unwrap_err();
    match err {
        PipelineError::MissingColumns { missing } => assert_eq!(missing, ["duration"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!config.features.output_path.exists());
}

#[test]
fn undecodable_input_aborts_and_lists_encodings() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.features.encodings = vec!["utf-8".to_string(), "utf-8-sig".to_string()];
    fs::write(
        &config.features.input_path,
        b"video_id,title,upload_date,view_count,like_count,comment_count,duration\na,caf\xE9,2024-03-01,1,1,1,1\n",
    )
    .unwrap();

    let err = run_feature_builder(&config).unwrap_err();
    match err {
        PipelineError::Parser(ParserError::Undecodable { attempts }) => {
            assert_eq!(attempts.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!config.features.output_path.exists());
}

#[test]
fn legacy_encoded_tab_separated_input_is_accepted() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.table.delimiter = '\t';

    let mut bytes = b"video_id\ttitle\tupload_date\tview_count\tlike_count\tcomment_count\tduration\n".to_vec();
    bytes.extend_from_slice(b"a\t\xD6\xD0\xCE\xC4\t2024/06/01\t10\t1\t1\t600\n");

    let (df, encoding, report) = build_feature_table(&bytes, &config).unwrap();

    assert_eq!(encoding, "gbk");
    assert_eq!(report.retained_rows, 1);
    assert_eq!(df.column("title").unwrap().str().unwrap().get(0), Some("中文"));
    assert_eq!(
        df.column("duration_bucket").unwrap().str().unwrap().get(0),
        Some("10-15")
    );
}
