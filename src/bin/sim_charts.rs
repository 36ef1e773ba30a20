use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use league_sim::aggregate;
use league_sim::charts::{self, ChartRenderer, NullRenderer, TextRenderer};
use league_sim::config::{ChartMode, arg_value};
use league_sim::export::load_simulations;
use league_sim::terminal::TerminalRenderer;

const DEFAULT_TEAM: &str = "Manchester City";

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
    let path = arg_value(args, "--simulations")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("simulations.csv"));
    let team = arg_value(args, "--team").unwrap_or_else(|| DEFAULT_TEAM.to_string());
    let mode = match arg_value(args, "--chart") {
        Some(raw) => ChartMode::parse(&raw).context("--chart expects terminal, text or none")?,
        None => ChartMode::Terminal,
    };

    let runs = load_simulations(&path)?;
    let standings = aggregate::aggregate(&runs).context("average simulations")?;
    println!(
        "Loaded {} simulations covering {} teams from {}",
        runs.len(),
        standings.len(),
        path.display()
    );

    let mut renderer: Box<dyn ChartRenderer> = match mode {
        ChartMode::Terminal => Box::new(TerminalRenderer::default()),
        ChartMode::Text => Box::new(TextRenderer::new(std::io::stdout())),
        ChartMode::None => Box::new(NullRenderer),
    };

    let chart_set = [
        charts::average_points_chart(&standings),
        charts::points_distribution_chart(&runs),
        charts::positions_distribution_chart(&runs),
        charts::points_vs_goal_difference_chart(&runs),
        charts::correlation_chart(&runs),
        charts::team_evolution_chart(&runs, &team)?,
    ];
    for chart in &chart_set {
        renderer
            .render(chart)
            .with_context(|| format!("render '{}'", chart.title))?;
    }
    Ok(())
}
