//! YouTube Analytics API v2 report types.
//!
//! A report is a table: `columnHeaders` names the columns, and `rows` holds one JSON array per
//! row in the same column order. Each query here asks for a fixed set of columns, so rows are
//! deserialized straight into tuples.

use jiff::civil::Date;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use ytdash_sdk::protocol::{CountryViews, DailyViews, VideoRetention};

/// Response structure for the `reports.query` API call.
///
/// `rows` is omitted entirely when the report is empty.
///
/// See: <https://developers.google.com/youtube/analytics/reference/reports/query>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound = "R: DeserializeOwned")]
pub struct Report<R> {
    #[serde(default)]
    pub column_headers: Vec<ColumnHeader>,
    #[serde(default = "Vec::new")]
    pub rows: Vec<R>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    pub name: String,
    #[serde(default)]
    pub column_type: String,
    #[serde(default)]
    pub data_type: String,
}

/// `dimensions=day`, `metrics=views`.
pub type DailyViewsReport = Report<(Date, u64)>;

/// `dimensions=country`, `metrics=views`.
pub type CountryViewsReport = Report<(String, u64)>;

/// No dimensions, `metrics=averageViewDuration,averageViewPercentage`.
pub type RetentionReport = Report<(f64, f64)>;

impl DailyViewsReport {
    pub fn into_daily_views(self) -> Vec<DailyViews> {
        self.rows
            .into_iter()
            .map(|(date, views)| DailyViews { date, views })
            .collect()
    }
}

impl CountryViewsReport {
    pub fn into_country_views(self) -> Vec<CountryViews> {
        self.rows
            .into_iter()
            .map(|(id, value)| CountryViews { id, value })
            .collect()
    }
}

impl RetentionReport {
    /// The single row of the report, with the percentage scaled to a ratio.
    ///
    /// Upstream returns no rows until it has processed the video, which reads as zero retention.
    pub fn into_retention(self) -> VideoRetention {
        match self.rows.first() {
            Some(&(average_view_duration, average_view_percentage)) => VideoRetention {
                average_view_duration,
                click_ratio: average_view_percentage / 100.0,
            },
            None => VideoRetention::default(),
        }
    }
}
