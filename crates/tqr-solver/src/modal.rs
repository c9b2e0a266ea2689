//! Free vibration of a fixed-fixed spring-mass chain by modal decomposition.
//!
//! `n` equal masses `m` are joined by `n + 1` springs. With spring constants
//! `k(1) … k(n+1)` the equation of motion is `X'' + A·X = 0` with
//!
//! ```text
//! A = K / m,   K[i,i] = k(i) + k(i+1),   K[i,i+1] = K[i+1,i] = -k(i+1)
//! ```
//!
//! Diagonalizing `A = Q·Λ·Qᵗ` decouples the system: with `Y = Qᵗ·X` each
//! modal coordinate oscillates as `Y_j(t) = Y_j(0)·cos(ω_j t)`, `ω_j = √λ_j`,
//! for a chain released from rest. The physical response is `X(t) = Q·Y(t)`.
//!
//! # Example
//! ```
//! use tqr_solver::{InitialCondition, ModalSimulator, SimulationConfig, StiffnessRule};
//!
//! let simulator = ModalSimulator::new(StiffnessRule::RuleA, SimulationConfig::default());
//! let results = simulator
//!     .run(&InitialCondition::Displacement(vec![-2.0, -3.0, -1.0, -3.0, -1.0]))
//!     .unwrap();
//! assert_eq!(results.num_samples(), 1001);
//! ```

use std::fmt;
use std::str::FromStr;

use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::eigen::{DEFAULT_EPSILON, SolverConfig, solve_with_config};
use crate::error::{Result, SolverError};
use crate::tridiagonal::build_tridiagonal;

/// Mass of every body in the chain (kg).
pub const DEFAULT_MASS: f64 = 2.0;

/// Reference initial displacements for the five-mass chain with [`StiffnessRule::RuleA`].
pub const RULE_A_DISPLACEMENTS: [[f64; 5]; 2] = [
    [-2.0, -3.0, -1.0, -3.0, -1.0],
    [1.0, 10.0, -4.0, 3.0, -2.0],
];

/// Reference initial displacements for the ten-mass chain with [`StiffnessRule::RuleB`].
pub const RULE_B_DISPLACEMENTS: [[f64; 10]; 2] = [
    [-2.0, -3.0, -1.0, -3.0, -1.0, -2.0, -3.0, -1.0, -3.0, -1.0],
    [1.0, 10.0, -4.0, 3.0, -2.0, 1.0, 10.0, -4.0, 3.0, -2.0],
];

/// Upper bound on the samples of a [`TimeGrid`].
pub const MAX_TIME_SAMPLES: usize = 10_000_000;

/// Spring constant law along the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StiffnessRule {
    /// `k(i) = 40 + 2i`
    #[serde(rename = "a")]
    RuleA,
    /// `k(i) = 40 + 2(-1)^i`
    #[serde(rename = "b")]
    RuleB,
}

impl StiffnessRule {
    /// Constant of spring `i` (1-based).
    pub fn spring_constant(self, i: usize) -> f64 {
        match self {
            StiffnessRule::RuleA => 40.0 + 2.0 * i as f64,
            StiffnessRule::RuleB => {
                if i % 2 == 0 {
                    42.0
                } else {
                    38.0
                }
            }
        }
    }

    /// `k(1) … k(n+1)` for a chain of `n` masses.
    pub fn spring_constants(self, n: usize) -> Vec<f64> {
        (1..=n + 1).map(|i| self.spring_constant(i)).collect()
    }

    /// Chain length of the reference case for this rule.
    pub fn reference_dimension(self) -> usize {
        match self {
            StiffnessRule::RuleA => 5,
            StiffnessRule::RuleB => 10,
        }
    }

    pub fn preset_displacements(self) -> Vec<Vec<f64>> {
        match self {
            StiffnessRule::RuleA => RULE_A_DISPLACEMENTS.iter().map(|x| x.to_vec()).collect(),
            StiffnessRule::RuleB => RULE_B_DISPLACEMENTS.iter().map(|x| x.to_vec()).collect(),
        }
    }
}

impl fmt::Display for StiffnessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StiffnessRule::RuleA => write!(f, "A"),
            StiffnessRule::RuleB => write!(f, "B"),
        }
    }
}

impl FromStr for StiffnessRule {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "rule-a" | "rulea" => Ok(StiffnessRule::RuleA),
            "b" | "rule-b" | "ruleb" => Ok(StiffnessRule::RuleB),
            other => Err(SolverError::InvalidSpec(format!(
                "unknown stiffness rule '{other}', expected 'a' or 'b'"
            ))),
        }
    }
}

/// `A = K / mass` for a chain of `n` masses.
pub fn stiffness_matrix(rule: StiffnessRule, n: usize, mass: f64) -> Result<DMatrix<f64>> {
    if n == 0 {
        return Err(SolverError::InvalidSpec(
            "chain needs at least one mass".to_string(),
        ));
    }
    validate_mass(mass)?;

    let k = rule.spring_constants(n);
    let diagonal: Vec<f64> = k.windows(2).map(|pair| pair[0] + pair[1]).collect();
    let off_diagonal: Vec<f64> = k[1..n].iter().map(|&ki| -ki).collect();

    Ok(build_tridiagonal(diagonal, off_diagonal, None)? / mass)
}

fn validate_mass(mass: f64) -> Result<()> {
    if !mass.is_finite() || mass <= 0.0 {
        return Err(SolverError::InvalidConfig(format!(
            "mass must be finite and positive, got {mass}"
        )));
    }
    Ok(())
}

/// Raise `epsilon` to machine precision when it asks for more than `f64` can deliver.
pub fn clamp_epsilon(epsilon: f64) -> f64 {
    if epsilon < f64::EPSILON {
        warn!(
            "epsilon {:e} is below machine precision, using {:e}",
            epsilon,
            f64::EPSILON
        );
        f64::EPSILON
    } else {
        epsilon
    }
}

/// Uniform sampling `start, start + step, …` up to and including `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeGrid {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 10.0,
            step: 0.01,
        }
    }
}

impl TimeGrid {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.start.is_finite() && self.end.is_finite() && self.step.is_finite()) {
            return Err(SolverError::InvalidConfig(
                "time grid bounds must be finite".to_string(),
            ));
        }
        if self.step <= 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "time step must be positive, got {}",
                self.step
            )));
        }
        if self.end < self.start {
            return Err(SolverError::InvalidConfig(format!(
                "time grid ends ({}) before it starts ({})",
                self.end, self.start
            )));
        }
        let intervals = self.intervals();
        if !intervals.is_finite() || intervals >= MAX_TIME_SAMPLES as f64 {
            return Err(SolverError::InvalidConfig(format!(
                "time grid {}..={} with step {} exceeds {} samples",
                self.start, self.end, self.step, MAX_TIME_SAMPLES
            )));
        }
        Ok(())
    }

    fn intervals(&self) -> f64 {
        // The small slack keeps `end` when (end - start) / step lands just below an integer.
        ((self.end - self.start) / self.step + 1e-9).floor()
    }

    /// Number of samples, saturating at [`MAX_TIME_SAMPLES`] for grids that fail validation.
    pub fn num_samples(&self) -> usize {
        let intervals = self.intervals();
        if intervals.is_nan() {
            return 1;
        }
        (intervals.clamp(0.0, (MAX_TIME_SAMPLES - 1) as f64) as usize).saturating_add(1)
    }

    pub fn samples(&self) -> Vec<f64> {
        (0..self.num_samples())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}

/// Settings for a modal simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub mass: f64,
    pub solver: SolverConfig,
    pub time: TimeGrid,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            solver: SolverConfig::new(DEFAULT_EPSILON, false),
            time: TimeGrid::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.solver.epsilon = epsilon;
        self
    }

    pub fn with_shifted(mut self, shifted: bool) -> Self {
        self.solver.shifted = shifted;
        self
    }

    pub fn with_time_grid(mut self, time: TimeGrid) -> Self {
        self.time = time;
        self
    }

    /// Validated copy with epsilon clamped to machine precision.
    pub fn normalized(&self) -> Result<Self> {
        if self.solver.epsilon.is_nan() {
            return Err(SolverError::InvalidConfig("epsilon is NaN".to_string()));
        }
        let mut config = *self;
        config.solver.epsilon = clamp_epsilon(self.solver.epsilon);

        validate_mass(config.mass)?;
        config.time.validate()?;
        config.solver.validate()?;
        Ok(config)
    }
}

/// Where the chain starts from. Exactly one of the two is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialCondition {
    /// Explicit displacement of every mass; its length fixes the chain size
    Displacement(Vec<f64>),
    /// Start from the mode shape with the highest frequency
    HighestFrequencyMode { dimension: usize },
}

impl InitialCondition {
    pub fn from_options(displacement: Option<Vec<f64>>, dimension: Option<usize>) -> Result<Self> {
        match (displacement, dimension) {
            (Some(x0), None) => Ok(InitialCondition::Displacement(x0)),
            (None, Some(dimension)) => Ok(InitialCondition::HighestFrequencyMode { dimension }),
            (Some(_), Some(_)) => Err(SolverError::InvalidSpec(
                "give either an initial displacement or a dimension, not both".to_string(),
            )),
            (None, None) => Err(SolverError::InvalidSpec(
                "an initial displacement or a dimension is required".to_string(),
            )),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            InitialCondition::Displacement(x0) => x0.len(),
            InitialCondition::HighestFrequencyMode { dimension } => *dimension,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dimension() == 0 {
            return Err(SolverError::InvalidSpec(
                "chain needs at least one mass".to_string(),
            ));
        }
        if let InitialCondition::Displacement(x0) = self
            && x0.iter().any(|x| !x.is_finite())
        {
            return Err(SolverError::InvalidSpec(
                "initial displacement must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a modal simulation.
#[derive(Debug, Clone)]
pub struct ModalResults {
    pub rule: StiffnessRule,
    pub mass: f64,
    /// Eigenvalues of `A` in solver order
    pub eigenvalues: DVector<f64>,
    /// Angular frequencies `ω = √λ` (rad/s); negative round-off is clamped to 0
    pub frequencies: DVector<f64>,
    /// Mode shapes as columns, matching `frequencies`
    pub mode_shapes: DMatrix<f64>,
    pub initial_displacement: DVector<f64>,
    /// `Y(0) = Qᵗ·X(0)`
    pub modal_amplitudes: DVector<f64>,
    pub time: Vec<f64>,
    /// `X(t)`: one row per mass, one column per time sample
    pub displacements: DMatrix<f64>,
    /// QR sweeps used for the eigen-decomposition
    pub iterations: usize,
}

impl ModalResults {
    pub fn dimension(&self) -> usize {
        self.frequencies.len()
    }

    pub fn num_samples(&self) -> usize {
        self.time.len()
    }

    /// Positions of all masses at a time sample.
    pub fn displacement_at(&self, step: usize) -> Option<DVector<f64>> {
        if step >= self.num_samples() {
            return None;
        }
        Some(self.displacements.column(step).into())
    }

    /// Trajectory of mass `i` (0-based) over the time grid.
    pub fn mass_history(&self, i: usize) -> Option<Vec<f64>> {
        if i >= self.dimension() {
            return None;
        }
        Some(self.displacements.row(i).iter().copied().collect())
    }

    /// Index of the highest frequency (first one on ties).
    pub fn highest_frequency_mode(&self) -> usize {
        highest_frequency_index(&self.frequencies)
    }

    pub fn mode_shape(&self, j: usize) -> Option<DVector<f64>> {
        if j >= self.dimension() {
            return None;
        }
        Some(self.mode_shapes.column(j).into())
    }
}

fn highest_frequency_index(frequencies: &DVector<f64>) -> usize {
    let mut best = 0;
    for (j, &w) in frequencies.iter().enumerate() {
        if w > frequencies[best] {
            best = j;
        }
    }
    best
}

/// Modal simulation of one chain configuration.
pub struct ModalSimulator {
    rule: StiffnessRule,
    config: SimulationConfig,
}

impl ModalSimulator {
    pub fn new(rule: StiffnessRule, config: SimulationConfig) -> Self {
        Self { rule, config }
    }

    pub fn rule(&self) -> StiffnessRule {
        self.rule
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self, initial: &InitialCondition) -> Result<ModalResults> {
        let config = self.config.normalized()?;
        initial.validate()?;

        let n = initial.dimension();
        let a = stiffness_matrix(self.rule, n, config.mass)?;
        let decomposition = solve_with_config(&a, &config.solver)?;
        let iterations = decomposition.iterations();
        let (q, lambda, _) = decomposition.into_parts();

        let eigenvalues = lambda.diagonal();
        let frequencies = eigenvalues.map(|value| value.max(0.0).sqrt());

        let x0 = match initial {
            InitialCondition::Displacement(x0) => DVector::from_column_slice(x0),
            InitialCondition::HighestFrequencyMode { .. } => {
                q.column(highest_frequency_index(&frequencies)).into()
            }
        };

        let modal_amplitudes = q.transpose() * &x0;
        let time = config.time.samples();
        let modal_response = DMatrix::from_fn(n, time.len(), |j, s| {
            modal_amplitudes[j] * (frequencies[j] * time[s]).cos()
        });
        let displacements = &q * modal_response;

        info!(
            "modal simulation (rule {}): {} masses, {} samples, {} QR sweeps",
            self.rule,
            n,
            time.len(),
            iterations
        );

        Ok(ModalResults {
            rule: self.rule,
            mass: config.mass,
            eigenvalues,
            frequencies,
            mode_shapes: q,
            initial_displacement: x0,
            modal_amplitudes,
            time,
            displacements,
            iterations,
        })
    }
}

/// Simulate with the default mass and time grid.
///
/// Exactly one of `initial_displacement` and `dimension` must be given.
pub fn simulate(
    rule: StiffnessRule,
    epsilon: f64,
    shifted: bool,
    initial_displacement: Option<Vec<f64>>,
    dimension: Option<usize>,
) -> Result<ModalResults> {
    let initial = InitialCondition::from_options(initial_displacement, dimension)?;
    let config = SimulationConfig::default()
        .with_epsilon(epsilon)
        .with_shifted(shifted);
    ModalSimulator::new(rule, config).run(&initial)
}
