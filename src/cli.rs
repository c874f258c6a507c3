use crate::{
    config::Config,
    probe::{HttpProber, parse_targets},
    progress::{self, NoProgress, ProgressSink},
    report::{self, OutputMode},
    runner::run_probes,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "proxy-probe.toml";

#[derive(Parser, Debug)]
#[command(name = "proxy-probe")]
#[command(about = "Probe proxies in parallel and report success rate and TTFB")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./proxy-probe.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe every proxy and print a report.
    Check {
        /// Proxy to probe, e.g. http://10.0.0.1:3128. Repeatable.
        #[arg(long = "proxy")]
        proxies: Vec<String>,
        /// File with one proxy per line.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Report format: plaintext, json or yaml.
        #[arg(long)]
        output: Option<OutputMode>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Print the effective configuration.
    Config {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let mut cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    match &args.cmd {
        Command::Check {
            proxies,
            file,
            output,
            url,
            timeout_ms,
        } => {
            if let Some(mode) = output {
                cfg.output.mode = *mode;
            }
            if let Some(url) = url {
                cfg.probe.url = url.clone();
            }
            if let Some(ms) = timeout_ms {
                cfg.probe.timeout_ms = *ms;
            }
            let _guard = init_logging(&args, &cfg)?;
            check(&cfg, proxies, file.as_deref())
        }
        Command::Config {} => {
            let _guard = init_logging(&args, &cfg)?;
            print!("{}", cfg.to_toml()?);
            Ok(())
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Stdout carries the report, so console logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create_dir_all {}", parent.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn check(cfg: &Config, proxies: &[String], file: Option<&Path>) -> Result<()> {
    let targets = collect_targets(proxies, file)?;
    let mode = cfg.output.mode;
    info!(
        "check targets={} url={} mode={}",
        targets.len(),
        cfg.probe.url,
        mode.as_str()
    );

    let bar = (mode == OutputMode::Plaintext && cfg.output.progress && !targets.is_empty())
        .then(|| progress::bar(targets.len()));
    let sink: Box<dyn ProgressSink> = match &bar {
        Some(pb) => Box::new(pb.clone()),
        None => Box::new(NoProgress),
    };

    let prober = HttpProber::new(cfg);
    let results = run_probes(&targets, &prober, mode, sink);

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }

    report::render_stdout(&results, mode)
}

fn collect_targets(proxies: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut targets: Vec<String> = proxies
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if let Some(path) = file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading targets: {}", path.display()))?;
        targets.extend(parse_targets(&raw));
    }
    Ok(targets)
}
