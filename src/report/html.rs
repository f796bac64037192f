//! HTML rendering for runs executed by the built-in HTTP engine.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::DateTime;

use crate::error::{Error, Result};
use crate::http::method::HttpMethod;
use crate::testing::{RequestOutcome, RunReport};
use crate::timing::format_elapsed;

const BG: &str = "#12151b";
const SURFACE: &str = "#191e26";
const SURFACE_ALT: &str = "#1f252e";
const BORDER: &str = "#303a46";
const TEXT: &str = "#e6ecf4";
const TEXT_MUTED: &str = "#8491a0";
const PRIMARY: &str = "#3ac96f";
const DANGER: &str = "#e25c5c";

/// Render `report` and write it to `path`, creating parent directories.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, render(report)).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn render(report: &RunReport) -> String {
    let stats = report.stats();
    let title = escape(&report.collection);
    let mut html = String::with_capacity(4096);

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ background: {BG}; color: {TEXT}; font-family: -apple-system, "Segoe UI", sans-serif; margin: 24px; }}
h1 {{ font-size: 20px; margin: 0 0 4px; }}
.muted {{ color: {TEXT_MUTED}; font-size: 13px; }}
.cards {{ display: flex; gap: 12px; margin: 20px 0; }}
.card {{ background: {SURFACE}; border: 1px solid {BORDER}; border-radius: 6px; padding: 12px 16px; min-width: 140px; }}
.card strong {{ display: block; font-size: 22px; }}
table {{ width: 100%; border-collapse: collapse; background: {SURFACE}; }}
th, td {{ border-bottom: 1px solid {BORDER}; padding: 8px; text-align: left; font-size: 13px; vertical-align: top; }}
tr:nth-child(even) {{ background: {SURFACE_ALT}; }}
.pass {{ color: {PRIMARY}; }}
.fail {{ color: {DANGER}; }}
.method {{ font-weight: 600; }}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="muted">Environment: {environment} &middot; Started: {started} &middot; Duration: {duration}</div>
"#,
        environment = escape(&report.environment),
        started = format_timestamp(report.started),
        duration = format_elapsed(report.started, report.completed),
    );

    html.push_str(r#"<div class="cards">"#);
    card(&mut html, "Requests", stats.requests.total, stats.requests.failed);
    card(&mut html, "Assertions", stats.assertions.total, stats.assertions.failed);
    let _ = write!(
        html,
        r#"<div class="card"><span class="muted">Skipped test scripts</span><strong>{}</strong></div>"#,
        report.skipped_scripts
    );
    html.push_str("</div>\n");

    html.push_str(
        "<table>\n<tr><th>Request</th><th>Method</th><th>URL</th><th>Status</th><th>Time</th><th>Size</th><th>Checks</th></tr>\n",
    );
    for outcome in &report.outcomes {
        row(&mut html, outcome);
    }
    html.push_str("</table>\n</body>\n</html>\n");

    html
}

fn card(html: &mut String, label: &str, total: u64, failed: u64) {
    let class = if failed == 0 { "pass" } else { "fail" };
    let _ = write!(
        html,
        r#"<div class="card"><span class="muted">{label}</span><strong>{total}</strong><span class="{class}">{failed} failed</span></div>"#
    );
}

fn row(html: &mut String, outcome: &RequestOutcome) {
    let color = outcome
        .method
        .parse::<HttpMethod>()
        .map(HttpMethod::color)
        .unwrap_or(TEXT);
    let status = match outcome.status {
        Some(code) => format!("{code} {}", escape(&outcome.status_text)),
        None => String::from("&ndash;"),
    };

    let mut checks = String::new();
    if let Some(error) = &outcome.error {
        let _ = write!(checks, r#"<div class="fail">{}</div>"#, escape(error));
    }
    for assertion in &outcome.assertions {
        let (class, mark) = if assertion.passed { ("pass", "&#10003;") } else { ("fail", "&#10007;") };
        let _ = write!(checks, r#"<div class="{class}">{mark} {}"#, escape(&assertion.name));
        if !assertion.message.is_empty() {
            let _ = write!(checks, r#" <span class="muted">({})</span>"#, escape(&assertion.message));
        }
        checks.push_str("</div>");
    }

    let _ = writeln!(
        html,
        r#"<tr><td class="{class}">{name}</td><td class="method" style="color: {color}">{method}</td><td>{url}</td><td>{status}</td><td>{time} ms</td><td>{size} B</td><td>{checks}</td></tr>"#,
        class = if outcome.passed() { "pass" } else { "fail" },
        name = escape(&outcome.name),
        method = escape(&outcome.method),
        url = escape(&outcome.url),
        time = outcome.duration_ms,
        size = outcome.size_bytes,
    );
}

fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Assertion;
    use tempfile::tempdir;

    fn sample() -> RunReport {
        RunReport {
            collection: "Shop <beta>".into(),
            environment: "QA".into(),
            started: 0,
            completed: 125_000,
            skipped_scripts: 3,
            outcomes: vec![
                RequestOutcome {
                    name: "list orders".into(),
                    method: "GET".into(),
                    url: "http://localhost/orders?a=1&b=2".into(),
                    status: Some(200),
                    status_text: "OK".into(),
                    duration_ms: 12,
                    size_bytes: 34,
                    error: None,
                    assertions: vec![Assertion::status_not_error().evaluate(200)],
                },
                RequestOutcome {
                    name: "delete order".into(),
                    method: "DELETE".into(),
                    url: "http://localhost/orders/1".into(),
                    error: Some("connection refused".into()),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn render_includes_summary_and_rows() {
        let html = render(&sample());

        assert!(html.contains("<title>Shop &lt;beta&gt;</title>"));
        assert!(html.contains("Duration: 2.5 minutes"));
        assert!(html.contains("1970-01-01 00:00:00 UTC"));
        assert!(html.contains("http://localhost/orders?a=1&amp;b=2"));
        assert!(html.contains("connection refused"));
        assert!(html.contains("<strong>3</strong>"));
        assert_eq!(html.matches("<tr><td").count(), 2);
    }

    #[test]
    fn write_report_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("March").join("07-03-2024").join("shop.html");

        write_report(&path, &sample()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
