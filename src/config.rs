use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::aggregate::MonteCarloConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    Terminal,
    Text,
    None,
}

impl ChartMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "terminal" | "tui" => Some(Self::Terminal),
            "text" | "plain" => Some(Self::Text),
            "none" | "off" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub teams_path: PathBuf,
    pub fixtures_path: PathBuf,
    pub output_path: PathBuf,
    pub simulations_path: Option<PathBuf>,
    pub xlsx_path: Option<PathBuf>,
    pub runs: u32,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub chart: ChartMode,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            teams_path: PathBuf::from("premStats24_25.csv"),
            fixtures_path: PathBuf::from("fixtures.csv"),
            output_path: PathBuf::from("average_premier_league_standings.csv"),
            simulations_path: Some(PathBuf::from("simulations.csv")),
            xlsx_path: None,
            runs: 11,
            seed: None,
            parallel: true,
            chart: ChartMode::Terminal,
        }
    }
}

impl SimConfig {
    /// Defaults, then `--config` file, then `SIM_*` env, then flags.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut cfg = match arg_value(args, "--config") {
            Some(path) => Self::load_file(Path::new(&path))?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.apply_args(args)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = get("SIM_RUNS") {
            match raw.trim().parse::<u32>() {
                Ok(runs) => self.runs = runs,
                Err(_) => log::warn!("ignoring SIM_RUNS={raw}"),
            }
        }
        if let Some(raw) = get("SIM_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => log::warn!("ignoring SIM_SEED={raw}"),
            }
        }
    }

    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        if let Some(path) = arg_value(args, "--teams") {
            self.teams_path = PathBuf::from(path);
        }
        if let Some(path) = arg_value(args, "--fixtures") {
            self.fixtures_path = PathBuf::from(path);
        }
        if let Some(path) = arg_value(args, "--out") {
            self.output_path = PathBuf::from(path);
        }
        if let Some(path) = arg_value(args, "--simulations") {
            self.simulations_path = Some(PathBuf::from(path));
        }
        if has_flag(args, "--no-simulations") {
            self.simulations_path = None;
        }
        if let Some(path) = arg_value(args, "--xlsx") {
            self.xlsx_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = arg_value(args, "--runs") {
            self.runs = raw
                .parse()
                .map_err(|_| anyhow!("--runs expects a positive integer, got '{raw}'"))?;
        }
        if let Some(raw) = arg_value(args, "--seed") {
            self.seed = Some(
                raw.parse()
                    .map_err(|_| anyhow!("--seed expects an unsigned integer, got '{raw}'"))?,
            );
        }
        if has_flag(args, "--sequential") {
            self.parallel = false;
        }
        if let Some(raw) = arg_value(args, "--chart") {
            self.chart = ChartMode::parse(&raw)
                .ok_or_else(|| anyhow!("--chart expects terminal, text or none, got '{raw}'"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            bail!("run count must be at least 1");
        }
        Ok(())
    }

    pub fn monte_carlo(&self) -> MonteCarloConfig {
        MonteCarloConfig {
            runs: self.runs,
            seed: self.seed,
            parallel: self.parallel,
        }
    }
}

/// Value of `--flag value` or `--flag=value`. Blank values are skipped.
pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}
