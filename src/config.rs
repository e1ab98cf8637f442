use std::path::PathBuf;

use anyhow::{Result, anyhow};

pub const DEFAULT_INPUT_DIR: &str = "data/extracted";
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";
pub const DEFAULT_FILE_EXT: &str = "json";
const DEFAULT_LOAD_THREADS: usize = 4;

pub const USAGE: &str = "usage: cricket_tables [--input DIR] [--output DIR] [--ext EXT] [--format csv|xlsx|all] [--threads N]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Xlsx,
    All,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "xlsx" => Ok(OutputFormat::Xlsx),
            "all" | "both" => Ok(OutputFormat::All),
            other => Err(anyhow!("unknown output format: {other}")),
        }
    }

    pub fn writes_csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::All)
    }

    pub fn writes_xlsx(self) -> bool {
        matches!(self, OutputFormat::Xlsx | OutputFormat::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub file_ext: String,
    pub format: OutputFormat,
    pub load_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_ext: DEFAULT_FILE_EXT.to_string(),
            format: OutputFormat::Csv,
            load_threads: DEFAULT_LOAD_THREADS,
        }
    }
}

impl Config {
    /// Load `.env.local` / `.env`, then resolve from the process environment and arguments.
    pub fn from_env_and_args() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    /// Defaults, overridden by environment, overridden by flags.
    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Config::default();

        if let Some(dir) = env_non_empty(&env, "CRICKET_INPUT_DIR") {
            cfg.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_non_empty(&env, "CRICKET_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(ext) = env_non_empty(&env, "CRICKET_FILE_EXT") {
            cfg.file_ext = ext;
        }
        if let Some(format) = env_non_empty(&env, "CRICKET_OUTPUT_FORMAT") {
            cfg.format = OutputFormat::parse(&format)?;
        }
        if let Some(threads) = env_non_empty(&env, "CRICKET_LOAD_THREADS") {
            cfg.load_threads = parse_threads(&threads)?;
        }

        let mut idx = 0;
        while idx < args.len() {
            let arg = args[idx].as_str();
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
                _ => (arg, None),
            };
            let mut value = || -> Result<String> {
                if let Some(v) = inline.clone() {
                    return Ok(v);
                }
                idx += 1;
                args.get(idx)
                    .cloned()
                    .ok_or_else(|| anyhow!("missing value for {flag}"))
            };
            match flag {
                "--input" | "-i" => cfg.input_dir = PathBuf::from(non_empty_value(flag, value()?)?),
                "--output" | "-o" => cfg.output_dir = PathBuf::from(non_empty_value(flag, value()?)?),
                "--ext" => cfg.file_ext = non_empty_value(flag, value()?)?,
                "--format" => cfg.format = OutputFormat::parse(&value()?)?,
                "--threads" => cfg.load_threads = parse_threads(&value()?)?,
                other => return Err(anyhow!("unknown argument: {other}\n{USAGE}")),
            }
            idx += 1;
        }

        Ok(cfg)
    }
}

fn env_non_empty(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty_value(flag: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty value for {flag}"));
    }
    Ok(trimmed.to_string())
}

fn parse_threads(raw: &str) -> Result<usize> {
    let threads = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| anyhow!("invalid thread count: {raw}"))?;
    Ok(threads.clamp(1, 32))
}
