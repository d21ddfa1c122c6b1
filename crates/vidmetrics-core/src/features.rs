use chrono::{Datelike, NaiveDate, Timelike};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use vidmetrics_parser::schema::{
    COMMENT_COUNT, DURATION, LIKE_COUNT, NORMALIZED_DATE_FORMAT, TITLE, UPLOAD_DATE, VIEW_COUNT,
};

use crate::config::FeatureConfig;

const SECONDS_PER_MINUTE: f64 = 60.0;

static QUESTION_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?？]").expect("question mark pattern is valid"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("digit pattern is valid"));

/// Appends the derived feature columns to a cleaned table.
///
/// Per-row features are computed in one pass. The ratio denominators and the
/// quartile edges are aggregates over the whole frame, so quartile labels are
/// only comparable within a single run.
pub fn derive_features(df: &DataFrame, config: &FeatureConfig) -> PolarsResult<DataFrame> {
    let len = df.height();

    let views = df.column(VIEW_COUNT)?.i64()?;
    let likes = df.column(LIKE_COUNT)?.i64()?;
    let comments = df.column(COMMENT_COUNT)?.i64()?;
    let duration = df.column(DURATION)?.f64()?;
    let titles = df.column(TITLE)?.str()?;
    let dates = df.column(UPLOAD_DATE)?.str()?;

    let mut view_log = Vec::with_capacity(len);
    let mut like_log = Vec::with_capacity(len);
    let mut comment_log = Vec::with_capacity(len);
    let mut engagement_rate = Vec::with_capacity(len);
    let mut title_length = Vec::with_capacity(len);
    let mut is_question = Vec::with_capacity(len);
    let mut duration_min = Vec::with_capacity(len);
    let mut duration_bucket: Vec<Option<&str>> = Vec::with_capacity(len);
    let mut publish_hour = Vec::with_capacity(len);
    let mut publish_weekday = Vec::with_capacity(len);
    let mut has_number = Vec::with_capacity(len);
    let mut engagements = Vec::with_capacity(len);

    for idx in 0..len {
        let view_count = views.get(idx).unwrap_or(0) as f64;
        let like_count = likes.get(idx).unwrap_or(0) as f64;
        let comment_count = comments.get(idx).unwrap_or(0) as f64;
        let title = titles.get(idx).unwrap_or_default();
        let minutes = duration.get(idx).unwrap_or(0.0) / SECONDS_PER_MINUTE;
        let upload = dates
            .get(idx)
            .and_then(|value| NaiveDate::parse_from_str(value, NORMALIZED_DATE_FORMAT).ok());

        view_log.push(view_count.ln_1p());
        like_log.push(like_count.ln_1p());
        comment_log.push(comment_count.ln_1p());
        engagement_rate.push(rate(like_count + comment_count, view_count));
        engagements.push(like_count + comment_count);

        title_length.push(title.chars().count() as i64);
        is_question.push(QUESTION_MARK.is_match(title));
        has_number.push(DIGIT.is_match(title));

        duration_min.push(minutes);
        duration_bucket.push(bucket_label(
            minutes,
            &config.duration_bucket_edges,
            &config.duration_bucket_labels,
        ));

        publish_hour.push(
            upload
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|ts| ts.hour() as i32),
        );
        publish_weekday.push(upload.map(|date| date.weekday().num_days_from_monday() as i32));
    }

    let total_views = floored_total((0..len).map(|idx| views.get(idx).unwrap_or(0) as f64).sum());
    let total_engagements = floored_total(engagements.iter().sum());

    let view_ratio: Vec<f64> = (0..len)
        .map(|idx| views.get(idx).unwrap_or(0) as f64 / total_views)
        .collect();
    let engagement_ratio: Vec<f64> = engagements
        .iter()
        .map(|value| value / total_engagements)
        .collect();

    let quartile_edges = quantile_edges(&duration_min, config.quartile_labels.len());
    let duration_quartile: Vec<Option<&str>> = duration_min
        .iter()
        .map(|value| quantile_label(*value, &quartile_edges, &config.quartile_labels))
        .collect();

    let mut output = df.clone();
    output.hstack_mut(&mut [
        Series::new("view_count_log".into(), view_log).into(),
        Series::new("like_count_log".into(), like_log).into(),
        Series::new("comment_count_log".into(), comment_log).into(),
        Series::new("engagement_rate".into(), engagement_rate).into(),
        Series::new("title_length".into(), title_length).into(),
        Series::new("is_question".into(), is_question).into(),
        Series::new("duration_min".into(), duration_min).into(),
        Series::new("duration_bucket".into(), duration_bucket).into(),
        Series::new("publish_hour".into(), publish_hour).into(),
        Series::new("publish_weekday".into(), publish_weekday).into(),
        Series::new("has_number".into(), has_number).into(),
        Series::new("view_ratio".into(), view_ratio).into(),
        Series::new("engagement_ratio".into(), engagement_ratio).into(),
        Series::new("duration_quartile".into(), duration_quartile).into(),
    ])?;

    Ok(output)
}

/// `numerator / denominator`, reading a zero denominator as 1.
fn rate(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    }
}

fn floored_total(total: f64) -> f64 {
    if total > 0.0 {
        total
    } else {
        1.0
    }
}

/// Label of the `[edges[i], edges[i + 1])` interval containing `value`.
pub fn bucket_label<'a>(value: f64, edges: &[f64], labels: &'a [String]) -> Option<&'a str> {
    if !value.is_finite() {
        return None;
    }
    edges
        .windows(2)
        .zip(labels)
        .find(|(bounds, _)| value >= bounds[0] && value < bounds[1])
        .map(|(_, label)| label.as_str())
}

/// `bins + 1` edges splitting `values` into equal-frequency bins, using
/// linear interpolation between order statistics.
pub fn quantile_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || bins == 0 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let last = (sorted.len() - 1) as f64;
    (0..=bins)
        .map(|step| {
            let position = last * step as f64 / bins as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let weight = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        })
        .collect()
}

/// Bin `i` covers `(edges[i], edges[i + 1]]`, with the first bin also taking
/// `edges[0]`. When edges coincide the lowest matching label wins.
pub fn quantile_label<'a>(value: f64, edges: &[f64], labels: &'a [String]) -> Option<&'a str> {
    if !value.is_finite() || edges.len() < 2 || value < edges[0] {
        return None;
    }
    edges[1..]
        .iter()
        .zip(labels)
        .find(|(upper, _)| value <= **upper)
        .map(|(_, label)| label.as_str())
}
