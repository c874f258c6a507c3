use crate::outcome::Outcome;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;
use tracing::debug;

/// How the final report is written. Unrecognized names fall back to plaintext.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputMode {
    #[default]
    Plaintext,
    Json,
    Yaml,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Plaintext => "plaintext",
            OutputMode::Json => "json",
            OutputMode::Yaml => "yaml",
        }
    }
}

impl From<&str> for OutputMode {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => OutputMode::Json,
            "yaml" => OutputMode::Yaml,
            "plaintext" | "" => OutputMode::Plaintext,
            other => {
                debug!("unknown output mode {other:?}; using plaintext");
                OutputMode::Plaintext
            }
        }
    }
}

impl From<String> for OutputMode {
    fn from(raw: String) -> Self {
        OutputMode::from(raw.as_str())
    }
}

impl From<OutputMode> for String {
    fn from(mode: OutputMode) -> Self {
        mode.as_str().to_string()
    }
}

impl FromStr for OutputMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OutputMode::from(s))
    }
}

/// Aggregate tallies over a finished collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub success: usize,
    pub fail: usize,
    pub average_ttfb_ms: i64,
}

impl Summary {
    pub fn from_results(results: &[Option<Outcome>]) -> Self {
        let mut success = 0usize;
        let mut fail = 0usize;
        let mut total_ttfb = 0i64;

        for outcome in results.iter().flatten() {
            if outcome.is_failure() {
                fail += 1;
                continue;
            }
            success += 1;
            total_ttfb += outcome.latency.ttfb_ms;
        }

        // No successes means no meaningful average; report zero.
        let average_ttfb_ms = if success > 0 {
            total_ttfb / success as i64
        } else {
            0
        };

        Self {
            success,
            fail,
            average_ttfb_ms,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.fail
    }
}

/// Serialized form of a finished run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report<'a> {
    pub success: usize,
    pub fail: usize,
    #[serde(rename = "AverageTTFB")]
    pub average_ttfb: i64,
    pub results: &'a [Option<Outcome>],
}

impl<'a> Report<'a> {
    pub fn new(summary: Summary, results: &'a [Option<Outcome>]) -> Self {
        Self {
            success: summary.success,
            fail: summary.fail,
            average_ttfb: summary.average_ttfb_ms,
            results,
        }
    }
}

/// Write the report for `results` in the given mode.
///
/// Structured modes are encoded in full before anything is written, so an
/// encoder failure leaves `out` untouched.
pub fn render<W: Write>(results: &[Option<Outcome>], mode: OutputMode, out: &mut W) -> Result<()> {
    let summary = Summary::from_results(results);
    debug!(
        "report success={} fail={} avg_ttfb={}ms mode={}",
        summary.success,
        summary.fail,
        summary.average_ttfb_ms,
        mode.as_str()
    );

    match mode {
        OutputMode::Json => render_json(summary, results, out),
        OutputMode::Yaml => render_yaml(summary, results, out),
        OutputMode::Plaintext => render_plaintext(summary, out),
    }
}

pub fn render_stdout(results: &[Option<Outcome>], mode: OutputMode) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    render(results, mode, &mut lock)?;
    lock.flush().with_context(|| "flush stdout")
}

fn render_json<W: Write>(summary: Summary, results: &[Option<Outcome>], out: &mut W) -> Result<()> {
    let bytes = serde_json::to_vec(&Report::new(summary, results))
        .with_context(|| "encoding JSON report")?;
    out.write_all(&bytes).with_context(|| "writing JSON report")
}

fn render_yaml<W: Write>(summary: Summary, results: &[Option<Outcome>], out: &mut W) -> Result<()> {
    let doc = serde_yaml::to_string(&Report::new(summary, results))
        .with_context(|| "encoding YAML report")?;
    out.write_all(doc.as_bytes())
        .with_context(|| "writing YAML report")
}

fn render_plaintext<W: Write>(summary: Summary, out: &mut W) -> Result<()> {
    writeln!(out, "Success rate:      {}/{}", summary.success, summary.total())?;
    writeln!(out, "Average TTFB:      {}ms", summary.average_ttfb_ms)?;
    Ok(())
}
