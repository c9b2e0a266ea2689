use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{LevelFilter, info};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use tqr_io::{Report, ReportSink, TextReporter, load_json, save_json, write_time_series_csv};
use tqr_solver::report::{displacement_series, eigen_summary, modal_summary, study_rows};
use tqr_solver::{
    ConvergenceStudy, InitialCondition, ModalSimulator, SimulationConfig, SolverConfig, TimeGrid,
    build_tridiagonal, solve_with_config,
};

mod args;

use args::{Cli, Command, SimulateArgs, SolveArgs, StudyArgs};

fn init_logging(level: LevelFilter) -> Result<()> {
    let pattern = "[{d(%Y-%m-%d %H:%M:%S)}] {l} {m}{n}";
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|err| anyhow!("invalid logging configuration: {err}"))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn run_solve(args: SolveArgs, sink: &mut dyn ReportSink) -> Result<()> {
    let a = build_tridiagonal(args.diagonal, args.off_diagonal, args.dimension)
        .context("cannot build the tridiagonal matrix")?;
    let config = SolverConfig {
        epsilon: args.epsilon,
        shifted: !args.unshifted,
        max_iterations: args.max_iterations,
    };

    let result = solve_with_config(&a, &config)?;
    let summary = eigen_summary(&result, &config);
    sink.eigen(&summary)?;

    if let Some(path) = args.json {
        save_json(&path, &Report::new("eigen-decomposition", &summary))
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_study(args: StudyArgs, sink: &mut dyn ReportSink) -> Result<()> {
    let report = ConvergenceStudy::new(args.epsilon, args.sizes).run()?;
    let rows = study_rows(&report);
    sink.study(&rows)?;

    if let Some(path) = args.json {
        save_json(&path, &Report::new("convergence-study", &rows))
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn simulation_config(args: &SimulateArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => load_json::<SimulationConfig>(path)
            .with_context(|| format!("cannot load simulation settings from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(epsilon) = args.epsilon {
        config = config.with_epsilon(epsilon);
    }
    if args.shifted {
        config = config.with_shifted(true);
    }
    if let Some(mass) = args.mass {
        config = config.with_mass(mass);
    }
    if args.t_end.is_some() || args.dt.is_some() {
        let time = TimeGrid::new(
            config.time.start,
            args.t_end.unwrap_or(config.time.end),
            args.dt.unwrap_or(config.time.step),
        );
        config = config.with_time_grid(time);
    }
    Ok(config)
}

fn initial_condition(args: &SimulateArgs) -> Result<InitialCondition> {
    if let Some(preset) = args.preset {
        let presets = args.rule.preset_displacements();
        let Some(x0) = preset.checked_sub(1).and_then(|i| presets.get(i)) else {
            bail!(
                "rule {} has presets 1..={}, got {}",
                args.rule,
                presets.len(),
                preset
            );
        };
        return Ok(InitialCondition::Displacement(x0.clone()));
    }
    Ok(InitialCondition::from_options(
        args.x0.clone(),
        args.dimension,
    )?)
}

fn run_simulate(args: SimulateArgs, sink: &mut dyn ReportSink) -> Result<()> {
    let config = simulation_config(&args)?;
    let initial = initial_condition(&args)?;

    let results = ModalSimulator::new(args.rule, config).run(&initial)?;
    let summary = modal_summary(&results);
    let series = displacement_series(&results);
    sink.modal(&summary, &series)?;

    if let Some(path) = &args.csv {
        write_time_series_csv(path, &series)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("wrote {} samples to {}", series.num_samples(), path.display());
    }
    if let Some(path) = &args.json {
        save_json(path, &Report::new("modal-simulation", &summary))
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn run(command: Command, sink: &mut dyn ReportSink) -> Result<()> {
    match command {
        Command::Solve(args) => run_solve(args, sink),
        Command::Study(args) => run_study(args, sink),
        Command::Simulate(args) => run_simulate(args, sink),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.log_level.into()) {
        eprintln!("logging disabled: {err}");
    }

    let mut reporter = TextReporter::new(io::stdout().lock());
    match run(cli.command, &mut reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}
