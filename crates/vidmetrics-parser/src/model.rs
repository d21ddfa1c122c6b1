use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// The subset of a per-video metadata document the collector reads.
///
/// Every field is optional; `null` and an absent key are treated the same.
/// Counts and duration accept integer or floating point JSON numbers. `id` and
/// `title` accept any scalar and are read as text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMetadataRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub view_count: Option<Number>,
    #[serde(default)]
    pub like_count: Option<Number>,
    #[serde(default)]
    pub comment_count: Option<Number>,
    #[serde(default)]
    pub duration: Option<Number>,
}

impl RawMetadataRecord {
    /// Raw upload date, or `None` when the key is absent, null or empty.
    pub fn upload_date(&self) -> Option<&str> {
        self.upload_date
            .as_deref()
            .filter(|value| !value.is_empty())
    }

    /// `id` as text; a numeric id keeps its decimal form.
    pub fn video_id(&self) -> String {
        text_or_empty(self.id.as_ref())
    }

    pub fn title(&self) -> String {
        text_or_empty(self.title.as_ref())
    }

    pub fn view_count(&self) -> i64 {
        count_or_zero(self.view_count.as_ref())
    }

    pub fn like_count(&self) -> i64 {
        count_or_zero(self.like_count.as_ref())
    }

    pub fn comment_count(&self) -> i64 {
        count_or_zero(self.comment_count.as_ref())
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(0.0)
    }

    /// Projects the record onto the intermediate table's columns.
    pub fn to_collected_row(&self, upload_date: NaiveDate) -> CollectedRow {
        CollectedRow {
            video_id: self.video_id(),
            title: self.title(),
            upload_date,
            view_count: self.view_count(),
            like_count: self.like_count(),
            comment_count: self.comment_count(),
            duration: self.duration_seconds(),
        }
    }
}

fn text_or_empty(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn count_or_zero(value: Option<&Number>) -> i64 {
    value
        .and_then(|number| {
            number
                .as_i64()
                .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
        })
        .unwrap_or(0)
}

/// One accepted video in the intermediate table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedRow {
    pub video_id: String,
    pub title: String,
    pub upload_date: NaiveDate,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub duration: f64,
}
