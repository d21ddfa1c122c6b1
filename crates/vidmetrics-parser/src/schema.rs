pub const VIDEO_ID: &str = "video_id";
pub const TITLE: &str = "title";
pub const UPLOAD_DATE: &str = "upload_date";
pub const VIEW_COUNT: &str = "view_count";
pub const LIKE_COUNT: &str = "like_count";
pub const COMMENT_COUNT: &str = "comment_count";
pub const DURATION: &str = "duration";

/// Header of the intermediate table, in the order the collector writes it.
pub const COLLECTED_COLUMNS: [&str; 7] = [
    VIDEO_ID,
    TITLE,
    UPLOAD_DATE,
    VIEW_COUNT,
    LIKE_COUNT,
    COMMENT_COUNT,
    DURATION,
];

/// Columns the feature builder refuses to run without, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    VIDEO_ID,
    UPLOAD_DATE,
    VIEW_COUNT,
    LIKE_COUNT,
    COMMENT_COUNT,
    TITLE,
    DURATION,
];

pub const COUNT_COLUMNS: [&str; 3] = [VIEW_COUNT, LIKE_COUNT, COMMENT_COUNT];

/// Derived columns appended by the feature builder, in output order.
pub const DERIVED_COLUMNS: [&str; 14] = [
    "view_count_log",
    "like_count_log",
    "comment_count_log",
    "engagement_rate",
    "title_length",
    "is_question",
    "duration_min",
    "duration_bucket",
    "publish_hour",
    "publish_weekday",
    "has_number",
    "view_ratio",
    "engagement_ratio",
    "duration_quartile",
];

/// Calendar format the collector writes and the cleaning step normalizes to.
pub const NORMALIZED_DATE_FORMAT: &str = "%Y-%m-%d";
