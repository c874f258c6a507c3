use crate::{config::Config, outcome::Outcome};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// Tests one target and reports how it went.
///
/// An `Err` means the probe could not even be attempted (for example a
/// malformed proxy address); a target that was tried and did not answer is an
/// `Ok` failed [`Outcome`].
pub trait Prober: Sync {
    fn probe(&self, target: &str) -> Result<Outcome>;
}

/// Fetches a fixed URL through each proxy and times the response headers.
#[derive(Debug, Clone)]
pub struct HttpProber {
    url: String,
    timeout: Duration,
    user_agent: String,
}

impl HttpProber {
    pub fn new(cfg: &Config) -> Self {
        Self {
            url: cfg.probe.url.clone(),
            timeout: Duration::from_millis(cfg.probe.timeout_ms),
            user_agent: cfg.probe.user_agent.clone(),
        }
    }
}

impl Prober for HttpProber {
    fn probe(&self, target: &str) -> Result<Outcome> {
        let proxy = ureq::Proxy::new(target)
            .with_context(|| format!("invalid proxy address: {target}"))?;
        let agent = ureq::AgentBuilder::new()
            .proxy(proxy)
            .timeout(self.timeout)
            .build();

        let started = Instant::now();
        let res = agent
            .get(&self.url)
            .set("User-Agent", &self.user_agent)
            .call();
        let ttfb_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

        let outcome = match res {
            Ok(resp) => Outcome::succeeded(target, i32::from(resp.status()), ttfb_ms),
            Err(ureq::Error::Status(code, _)) => Outcome::succeeded(target, i32::from(code), ttfb_ms),
            Err(ureq::Error::Transport(err)) => {
                let mut out = Outcome::failed(target);
                out.error = Some(err.to_string());
                out
            }
        };

        debug!(
            "probe target={} status={} ttfb={}ms",
            target, outcome.status_code, outcome.latency.ttfb_ms
        );
        Ok(outcome)
    }
}

/// Parse a targets list: one proxy per line, blank lines and `#` comments
/// skipped.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
