//! Elapsed-time formatting for run logs.

const MS_PER_MINUTE: u64 = 60 * 1000;
const MS_PER_SECOND: u64 = 1000;

/// Format the distance between two millisecond timestamps as
/// `"<minutes>.<seconds> minutes"`.
///
/// Seconds are a sub-unit of minutes, not a decimal fraction, and are not
/// zero-padded: 2 min 5 s is `"2.5 minutes"`, 2 min 50 s is `"2.50 minutes"`.
pub fn format_elapsed(start_ms: i64, end_ms: i64) -> String {
    let elapsed = start_ms.abs_diff(end_ms);
    let minutes = elapsed / MS_PER_MINUTE;
    let seconds = (elapsed % MS_PER_MINUTE) / MS_PER_SECOND;
    format!("{minutes}.{seconds} minutes")
}
