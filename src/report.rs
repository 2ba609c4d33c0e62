use std::cell::Cell;

use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::clock::{to_milliseconds, to_milliseconds_f64};
use crate::stats::TestSummary;

/// Banner printed before any test runs.
pub fn format_run_banner(test_count: usize, duration_seconds: u64) -> String {
    format!(
        "Running {} registered tests...\nTest duration: {} seconds per test\n\n",
        test_count, duration_seconds
    )
}

/// Per-test block: header, run count, then timings or an empty notice.
pub fn format_test_report(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n=== {} ===\n", summary.name));
    out.push_str(&format!("Tests run: {}\n", summary.test_count));

    if summary.test_count == 0 {
        out.push_str("No measurements recorded\n");
        return out;
    }

    out.push_str(&format!("Min:    {:.3} ms\n", to_milliseconds(summary.min_ns)));
    out.push_str(&format!("Max:    {:.3} ms\n", to_milliseconds(summary.max_ns)));
    out.push_str(&format!(
        "Mean:   {:.3} ms\n",
        to_milliseconds_f64(summary.mean_ns)
    ));

    if summary.total_bytes > 0 {
        out.push_str(&format!(
            "Throughput: {:.3} GB/s\n",
            summary.throughput_gbps
        ));
    }
    out
}

fn style_name() -> Style {
    Style::new().cyan().bold()
}

fn style_header() -> Style {
    Style::new().bold()
}

fn style_dimmed() -> Style {
    Style::new().dimmed()
}

fn style_fastest() -> Style {
    Style::new().green()
}

fn style_slower() -> Style {
    Style::new().yellow()
}

/// Whether owo-colors would style text written to stdout.
pub fn stdout_supports_color() -> bool {
    let supported = Cell::new(false);
    let probe = "".if_supports_color(Stream::Stdout, |s| {
        supported.set(true);
        s
    });
    let _ = probe.to_string();
    supported.get()
}

fn paint(text: String, color: bool, style: Style) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text
    }
}

/// Mean of the fastest test that recorded at least one sample.
fn fastest_mean(summaries: &[TestSummary]) -> Option<f64> {
    summaries
        .iter()
        .filter(|s| s.test_count > 0)
        .map(|s| s.mean_ns)
        .min_by(|a, b| a.total_cmp(b))
}

/// How many times slower `mean_ns` is than `fastest`: `x1.00`, or `x2500`
/// once the ratio reaches a thousand.
pub fn format_relative(mean_ns: f64, fastest: Option<f64>) -> String {
    match fastest {
        Some(best) if best > 0.0 => {
            let ratio = mean_ns / best;
            if ratio >= 1000.0 {
                format!("x{:.0}", ratio)
            } else {
                format!("x{:.2}", ratio)
            }
        }
        Some(_) => "x1.00".to_string(),
        None => "-".to_string(),
    }
}

/// Side-by-side table of every test, in registration order.
///
/// ANSI styles are emitted only when `color` is set.
pub fn format_comparison(summaries: &[TestSummary], color: bool) -> String {
    let mut out = String::new();
    out.push_str(&paint("=== Comparison ===".to_string(), color, style_header()));
    out.push('\n');

    if summaries.is_empty() {
        out.push_str("No tests registered\n");
        return out;
    }

    let name_width = summaries
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Test".len());
    let fastest = fastest_mean(summaries);

    out.push_str(&format!(
        "{:<width$}  {:>8}  {:>10}  {:>10}  {:>10}  {:>12}  {:>12}\n",
        "Test",
        "Runs",
        "Min (ms)",
        "Max (ms)",
        "Mean (ms)",
        "GB/s",
        "Relative",
        width = name_width
    ));

    for summary in summaries {
        let name_padded = format!("{:<width$}", summary.name, width = name_width);
        let name_colored = paint(name_padded, color, style_name());

        if summary.test_count == 0 {
            let notice = paint("no measurements".to_string(), color, style_dimmed());
            out.push_str(&format!("{}  {:>8}  {}\n", name_colored, 0, notice));
            continue;
        }

        let throughput = if summary.total_bytes > 0 {
            format!("{:.3}", summary.throughput_gbps)
        } else {
            "-".to_string()
        };
        let relative = format!("{:>12}", format_relative(summary.mean_ns, fastest));
        let relative_style = if fastest == Some(summary.mean_ns) {
            style_fastest()
        } else {
            style_slower()
        };
        let relative_colored = paint(relative, color, relative_style);

        out.push_str(&format!(
            "{}  {:>8}  {:>10.3}  {:>10.3}  {:>10.3}  {:>12}  {}\n",
            name_colored,
            summary.test_count,
            to_milliseconds(summary.min_ns),
            to_milliseconds(summary.max_ns),
            to_milliseconds_f64(summary.mean_ns),
            throughput,
            relative_colored
        ));
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    timestamp: String,
    tests: Vec<JsonTest<'a>>,
}

#[derive(Serialize)]
struct JsonTest<'a> {
    #[serde(flatten)]
    summary: &'a TestSummary,
    min_ms: f64,
    max_ms: f64,
    mean_ms: f64,
    relative: Option<f64>,
}

/// Machine-readable report of every test.
pub fn format_json(summaries: &[TestSummary], now: DateTime<Utc>) -> String {
    let fastest = fastest_mean(summaries);
    let tests = summaries
        .iter()
        .map(|summary| JsonTest {
            summary,
            min_ms: to_milliseconds(summary.min_ns),
            max_ms: to_milliseconds(summary.max_ns),
            mean_ms: to_milliseconds_f64(summary.mean_ns),
            relative: match fastest {
                Some(best) if best > 0.0 && summary.test_count > 0 => Some(summary.mean_ns / best),
                _ => None,
            },
        })
        .collect();

    let report = JsonReport {
        timestamp: now.to_rfc3339(),
        tests,
    };
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}
