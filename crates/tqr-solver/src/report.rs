//! Conversion of solver results into `tqr-io` report records.

use nalgebra::DMatrix;
use tqr_io::{Channel, EigenSummary, ModalSummary, StudyRow, TimeSeries};

use crate::eigen::{EigenDecomposition, SolverConfig};
use crate::modal::ModalResults;
use crate::study::StudyReport;

fn columns(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.column_iter()
        .map(|column| column.iter().copied().collect())
        .collect()
}

pub fn eigen_summary(result: &EigenDecomposition, config: &SolverConfig) -> EigenSummary {
    EigenSummary {
        dimension: result.dimension(),
        epsilon: config.epsilon,
        shifted: config.shifted,
        iterations: result.iterations(),
        eigenvalues: result.eigenvalues().iter().copied().collect(),
        eigenvectors: columns(result.eigenvectors()),
    }
}

pub fn modal_summary(results: &ModalResults) -> ModalSummary {
    ModalSummary {
        rule: results.rule.to_string(),
        mass: results.mass,
        iterations: results.iterations,
        frequencies: results.frequencies.iter().copied().collect(),
        mode_shapes: columns(&results.mode_shapes),
        initial_displacement: results.initial_displacement.iter().copied().collect(),
    }
}

/// Displacement histories labelled `x1 … xn`.
pub fn displacement_series(results: &ModalResults) -> TimeSeries {
    let channels = results
        .displacements
        .row_iter()
        .enumerate()
        .map(|(i, row)| Channel {
            label: format!("x{}", i + 1),
            values: row.iter().copied().collect(),
        })
        .collect();
    TimeSeries {
        time: results.time.clone(),
        channels,
    }
}

pub fn study_rows(report: &StudyReport) -> Vec<StudyRow> {
    report
        .records
        .iter()
        .map(|record| StudyRow {
            test_id: record.test_id,
            shifted: record.shifted,
            dimension: record.dimension,
            iterations: record.iterations,
            eigenvalue_error: record.eigenvalue_error,
            eigenvector_error: record.eigenvector_error,
        })
        .collect()
}
