use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use tqr_solver::{DEFAULT_EPSILON, DEFAULT_SIZES, Entries, StiffnessRule};

#[derive(Parser, Debug)]
#[command(
    name = "tqr",
    version,
    about = "Shifted QR eigen-solver for symmetric tridiagonal matrices"
)]
pub struct Cli {
    /// Verbosity of the log written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Eigen-decomposition of one tridiagonal matrix
    Solve(SolveArgs),
    /// Shifted vs unshifted iteration counts on the second-difference matrix
    Study(StudyArgs),
    /// Free vibration of a spring-mass chain
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Diagonal: one value, or a comma-separated list
    #[arg(long, allow_hyphen_values = true, value_parser = parse_entries)]
    pub diagonal: Entries,

    /// Off-diagonal: one value, or a comma-separated list one shorter than the diagonal
    #[arg(long, allow_hyphen_values = true, value_parser = parse_entries)]
    pub off_diagonal: Entries,

    /// Matrix size (required when both bands are single values)
    #[arg(long)]
    pub dimension: Option<usize>,

    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    pub epsilon: f64,

    /// Disable the Wilkinson shift
    #[arg(long)]
    pub unshifted: bool,

    /// Fail after this many QR sweeps
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Write the result as a JSON report
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StudyArgs {
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    pub epsilon: f64,

    /// Matrix sizes, comma-separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SIZES)]
    pub sizes: Vec<usize>,

    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("initial")
        .required(true)
        .args(["x0", "dimension", "preset"])
))]
pub struct SimulateArgs {
    /// Spring constant law: a (40 + 2i) or b (40 + 2(-1)^i)
    #[arg(long, value_parser = parse_rule)]
    pub rule: StiffnessRule,

    /// Initial displacement of every mass, comma-separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub x0: Option<Vec<f64>>,

    /// Start from the highest-frequency mode of a chain of this many masses
    #[arg(long)]
    pub dimension: Option<usize>,

    /// Reference initial displacement of the rule (1 or 2)
    #[arg(long)]
    pub preset: Option<usize>,

    /// Overrides the configured epsilon
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Enable the Wilkinson shift
    #[arg(long)]
    pub shifted: bool,

    #[arg(long)]
    pub mass: Option<f64>,

    /// End of the time grid in seconds
    #[arg(long)]
    pub t_end: Option<f64>,

    /// Time step in seconds
    #[arg(long)]
    pub dt: Option<f64>,

    /// JSON file with simulation settings; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the displacement history as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    #[arg(long)]
    pub json: Option<PathBuf>,
}

/// `"2"` is a scalar, `"1,2,3"` a list. An empty string or a trailing comma
/// forces list form, e.g. `""` for the empty off-diagonal of a 1×1 matrix.
pub fn parse_entries(s: &str) -> Result<Entries, String> {
    let s = s.trim();
    if !s.is_empty() && !s.contains(',') {
        return s
            .parse::<f64>()
            .map(Entries::Scalar)
            .map_err(|e| format!("'{s}': {e}"));
    }

    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().map_err(|e| format!("'{part}': {e}")))
        .collect::<Result<Vec<f64>, String>>()
        .map(Entries::Vector)
}

fn parse_rule(s: &str) -> Result<StiffnessRule, String> {
    s.parse().map_err(|e: tqr_solver::SolverError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_scalar_and_list() {
        assert_eq!(parse_entries("2").unwrap(), Entries::Scalar(2.0));
        assert_eq!(parse_entries("-1.5").unwrap(), Entries::Scalar(-1.5));
        assert_eq!(
            parse_entries("1, -2,3").unwrap(),
            Entries::Vector(vec![1.0, -2.0, 3.0])
        );
        assert_eq!(parse_entries("5,").unwrap(), Entries::Vector(vec![5.0]));
        assert_eq!(parse_entries("").unwrap(), Entries::Vector(Vec::new()));
        assert!(parse_entries("1,x").is_err());
    }

    #[test]
    fn solve_accepts_negative_values() {
        let cli = Cli::try_parse_from([
            "tqr",
            "solve",
            "--diagonal",
            "2",
            "--off-diagonal",
            "-1",
            "--dimension",
            "4",
        ])
        .unwrap();
        match cli.command {
            Command::Solve(args) => {
                assert_eq!(args.off_diagonal, Entries::Scalar(-1.0));
                assert_eq!(args.dimension, Some(4));
                assert!(!args.unshifted);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn study_defaults() {
        let cli = Cli::try_parse_from(["tqr", "--log-level", "debug", "study"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        match cli.command {
            Command::Study(args) => {
                assert_eq!(args.sizes, vec![2, 4, 8, 16, 32, 64]);
                assert_eq!(args.epsilon, 1e-6);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn simulate_needs_exactly_one_initial_condition() {
        assert!(Cli::try_parse_from(["tqr", "simulate", "--rule", "a"]).is_err());
        assert!(
            Cli::try_parse_from([
                "tqr", "simulate", "--rule", "a", "--x0", "1,2", "--dimension", "2"
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from(["tqr", "simulate", "--rule", "b", "--x0", "-2,-3,-1"])
            .unwrap();
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.rule, StiffnessRule::RuleB);
                assert_eq!(args.x0, Some(vec![-2.0, -3.0, -1.0]));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_rule_is_a_usage_error() {
        assert!(Cli::try_parse_from(["tqr", "simulate", "--rule", "c", "--dimension", "3"]).is_err());
    }
}
