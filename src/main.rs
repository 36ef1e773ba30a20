use std::process::ExitCode;

use anyhow::{Context, Result};

use league_sim::aggregate::{self, AggregateReport};
use league_sim::charts::{ChartRenderer, NullRenderer, TextRenderer};
use league_sim::config::{ChartMode, SimConfig, has_flag};
use league_sim::export::{CsvExporter, ExportSet, XlsxExporter};
use league_sim::fixtures::load_fixtures;
use league_sim::team_profile::load_team_profiles;
use league_sim::terminal::TerminalRenderer;

const USAGE: &str = "\
league_sim [--config FILE] [--teams CSV] [--fixtures CSV] [--out CSV]
           [--simulations CSV | --no-simulations] [--xlsx FILE]
           [--runs N] [--seed N] [--sequential] [--chart terminal|text|none]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let cfg = SimConfig::from_args(args)?;

    let profiles = load_team_profiles(&cfg.teams_path)?;
    let fixtures = load_fixtures(&cfg.fixtures_path, &profiles)?;
    let report = aggregate::run_simulations(&profiles, &fixtures, cfg.monte_carlo())
        .context("simulate league")?;

    print_table(&report);

    let mut exporters = ExportSet::default();
    exporters.push(CsvExporter {
        standings_path: cfg.output_path.clone(),
        simulations_path: cfg.simulations_path.clone(),
    });
    if let Some(path) = &cfg.xlsx_path {
        exporters.push(XlsxExporter {
            path: path.clone(),
            seed: Some(report.seed),
        });
    }

    let mut renderer: Box<dyn ChartRenderer> = match cfg.chart {
        ChartMode::Terminal => Box::new(TerminalRenderer::default()),
        ChartMode::Text => Box::new(TextRenderer::new(std::io::stdout())),
        ChartMode::None => Box::new(NullRenderer),
    };
    report.publish(&mut exporters, renderer.as_mut())
}

fn print_table(report: &AggregateReport) {
    println!(
        "Average standings over {} simulations (seed {})",
        report.runs.len(),
        report.seed
    );
    println!(
        "{:>3}  {:<24} {:>6} {:>5} {:>5} {:>5} {:>6} {:>6} {:>5} {:>6}",
        "Pos", "Team", "Pts", "W", "D", "L", "GF", "GA", "CS", "GD"
    );
    for row in &report.standings {
        println!(
            "{:>3}  {:<24} {:>6.2} {:>5.2} {:>5.2} {:>5.2} {:>6.2} {:>6.2} {:>5.2} {:>+6.2}",
            row.position,
            row.team,
            row.points,
            row.won,
            row.drawn,
            row.lost,
            row.goals_scored,
            row.goals_conceded,
            row.clean_sheets,
            row.goal_difference
        );
    }
}
