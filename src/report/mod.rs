//! # Reports
//!
//! Every report produced by one pass lands in the same dated folder,
//! `<MonthName>/<DD-MM-YYYY>`, taken from the Asia/Kolkata calendar.

pub mod html;

use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

/// Asia/Kolkata is UTC+05:30 all year round.
const REPORT_UTC_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

fn report_offset() -> FixedOffset {
    FixedOffset::east_opt(REPORT_UTC_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Dated folder, relative to the report root, shared by one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFolder(String);

impl ReportFolder {
    /// Folder for the current date in Asia/Kolkata.
    pub fn now() -> Self {
        Self::for_date(Utc::now().with_timezone(&report_offset()).date_naive())
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self(format!("{}/{}", date.format("%B"), date.format("%d-%m-%Y")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Where the HTML report for `collection` is written.
    pub fn export_path(&self, report_dir: &Path, collection: &str) -> PathBuf {
        let mut path = report_dir.to_path_buf();
        path.extend(self.0.split('/'));
        path.push(format!("{collection}.html"));
        path
    }

    /// Link recorded in the run summary for `collection`.
    pub fn link(&self, collection: &str) -> String {
        format!("{}/{collection}.html", self.0)
    }
}

impl Display for ReportFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
