use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};

use league_sim::brownian::{self, ExperimentConfig};
use league_sim::charts::{ChartRenderer, NullRenderer, TextRenderer};
use league_sim::config::{ChartMode, arg_value};
use league_sim::terminal::TerminalRenderer;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let mut cfg = ExperimentConfig::default();
    if let Some(raw) = arg_value(args, "--dt") {
        cfg.delta_ts = raw
            .split(',')
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| anyhow!("--dt expects comma-separated numbers, got '{s}'"))
            })
            .collect::<Result<Vec<_>>>()?;
    }
    if let Some(raw) = arg_value(args, "--trials") {
        cfg.trials = raw
            .parse()
            .map_err(|_| anyhow!("--trials expects a positive integer, got '{raw}'"))?;
    }
    if let Some(raw) = arg_value(args, "--bins") {
        cfg.bins = raw
            .parse()
            .map_err(|_| anyhow!("--bins expects a positive integer, got '{raw}'"))?;
    }
    if let Some(raw) = arg_value(args, "--seed") {
        cfg.seed = Some(
            raw.parse()
                .map_err(|_| anyhow!("--seed expects an unsigned integer, got '{raw}'"))?,
        );
    }
    let mode = match arg_value(args, "--chart") {
        Some(raw) => ChartMode::parse(&raw).context("--chart expects terminal, text or none")?,
        None => ChartMode::Terminal,
    };

    let series = brownian::run_experiment(&cfg)?;
    for s in &series {
        let n = s.trials.len() as f64;
        let mean_p = s.trials.iter().map(|t| t.p).sum::<f64>() / n;
        let mean_t = s.trials.iter().map(|t| t.t_max).sum::<f64>() / n;
        println!(
            "dt={:<8} trials={} mean P={mean_p:.4} mean Tmax={mean_t:.4}",
            s.delta_t,
            s.trials.len()
        );
    }

    let mut renderer: Box<dyn ChartRenderer> = match mode {
        ChartMode::Terminal => Box::new(TerminalRenderer::default()),
        ChartMode::Text => Box::new(TextRenderer::new(std::io::stdout())),
        ChartMode::None => Box::new(NullRenderer),
    };
    renderer.render(&brownian::p_distribution_chart(&series, cfg.bins))?;
    renderer.render(&brownian::t_max_distribution_chart(&series, cfg.bins))?;
    Ok(())
}
