use std::fmt::Write as _;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoError, Result};

/// Minimum cell width used by the text tables.
const MIN_CELL_WIDTH: usize = 10;

/// One run of a shifted-vs-unshifted convergence study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRow {
    pub test_id: usize,
    pub shifted: bool,
    pub dimension: usize,
    pub iterations: usize,
    /// Largest deviation from the analytic eigenvalues
    pub eigenvalue_error: f64,
    /// Largest deviation from the analytic eigenvectors (sign ignored)
    pub eigenvector_error: f64,
}

/// Outcome of a single eigen-decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigenSummary {
    pub dimension: usize,
    pub epsilon: f64,
    pub shifted: bool,
    pub iterations: usize,
    pub eigenvalues: Vec<f64>,
    /// Eigenvectors, one entry per column of V
    pub eigenvectors: Vec<Vec<f64>>,
}

/// Frequencies and mode shapes of a spring-mass chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalSummary {
    pub rule: String,
    pub mass: f64,
    pub iterations: usize,
    /// Natural frequencies in rad/s, in solver order
    pub frequencies: Vec<f64>,
    /// Mode shapes, one entry per mode
    pub mode_shapes: Vec<Vec<f64>>,
    pub initial_displacement: Vec<f64>,
}

/// A named sequence of samples aligned with `TimeSeries::time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub label: String,
    pub values: Vec<f64>,
}

/// Sampled trajectories sharing one time axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub time: Vec<f64>,
    pub channels: Vec<Channel>,
}

impl TimeSeries {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            channels: Vec::new(),
        }
    }

    /// Append a channel; its length must match the time axis.
    pub fn push_channel(&mut self, label: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let label = label.into();
        if values.len() != self.time.len() {
            return Err(IoError::InvalidData(format!(
                "channel '{}' has {} samples, time axis has {}",
                label,
                values.len(),
                self.time.len()
            )));
        }
        self.channels.push(Channel { label, values });
        Ok(())
    }

    pub fn num_samples(&self) -> usize {
        self.time.len()
    }

    pub fn channel(&self, label: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.label == label)
    }

    /// Fails on the first channel whose length differs from the time axis.
    ///
    /// Channels built through `push_channel` always pass; this guards series
    /// assembled field by field or deserialized from disk.
    pub fn check_aligned(&self) -> Result<()> {
        match self
            .channels
            .iter()
            .find(|c| c.values.len() != self.time.len())
        {
            Some(channel) => Err(IoError::InvalidData(format!(
                "channel '{}' is not aligned with the time axis",
                channel.label
            ))),
            None => Ok(()),
        }
    }
}

/// Render rows as a left-aligned `| cell | cell |` table with an `=` rule under the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|h| h.chars().count().max(MIN_CELL_WIDTH))
        .collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = format_row(headers.iter().copied(), &widths);
    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"=".repeat(header.chars().count()));
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

pub fn render_study_table(rows: &[StudyRow]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.test_id.to_string(),
                row.shifted.to_string(),
                row.dimension.to_string(),
                row.iterations.to_string(),
                format!("{:.3e}", row.eigenvalue_error),
                format!("{:.3e}", row.eigenvector_error),
            ]
        })
        .collect();
    render_table(
        &["Test", "Shifted", "n", "k", "max |dλ|", "max |dv|"],
        &body,
    )
}

pub fn render_eigen_summary(summary: &EigenSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "dimension: {}", summary.dimension);
    let _ = writeln!(out, "epsilon: {:e}", summary.epsilon);
    let _ = writeln!(out, "shifted: {}", summary.shifted);
    let _ = writeln!(out, "iterations: {}", summary.iterations);
    out.push('\n');

    let rows: Vec<Vec<String>> = summary
        .eigenvalues
        .iter()
        .enumerate()
        .map(|(j, value)| vec![(j + 1).to_string(), format!("{:.10}", value)])
        .collect();
    out.push_str(&render_table(&["Mode", "Eigenvalue"], &rows));
    out.push('\n');
    out.push_str("eigenvectors (columns):\n");
    out.push_str(&render_columns(&summary.eigenvectors));
    out
}

pub fn render_modal_summary(summary: &ModalSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "stiffness rule: {}", summary.rule);
    let _ = writeln!(out, "mass: {}", summary.mass);
    let _ = writeln!(out, "iterations: {}", summary.iterations);
    let _ = writeln!(
        out,
        "initial displacement: {}",
        format_vector(&summary.initial_displacement)
    );
    out.push('\n');

    let rows: Vec<Vec<String>> = summary
        .frequencies
        .iter()
        .enumerate()
        .map(|(j, w)| vec![(j + 1).to_string(), format!("{:.8}", w)])
        .collect();
    out.push_str(&render_table(&["Mode", "ω (rad/s)"], &rows));
    out.push('\n');
    out.push_str("mode shapes (columns):\n");
    out.push_str(&render_columns(&summary.mode_shapes));
    out
}

/// Write a time series as CSV: a `t` column followed by one column per channel.
pub fn write_time_series_csv(path: impl AsRef<Path>, series: &TimeSeries) -> Result<()> {
    let path = path.as_ref();
    series.check_aligned()?;

    ensure_parent_dir(path)?;
    let mut file = BufWriter::new(fs::File::create(path)?);

    write!(file, "t")?;
    for channel in &series.channels {
        write!(file, ",{}", channel.label)?;
    }
    writeln!(file)?;

    for (step, t) in series.time.iter().enumerate() {
        write!(file, "{}", t)?;
        for channel in &series.channels {
            write!(file, ",{}", channel.values[step])?;
        }
        writeln!(file)?;
    }
    file.flush()?;
    Ok(())
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.zip(widths) {
        let _ = write!(line, "| {:<width$} ", cell, width = width);
    }
    line.push('|');
    line
}

fn render_columns(columns: &[Vec<f64>]) -> String {
    let rows = columns.first().map_or(0, Vec::len);
    let mut out = String::new();
    for i in 0..rows {
        for column in columns {
            let _ = write!(out, "{:>13.6}", column.get(i).copied().unwrap_or(f64::NAN));
        }
        out.push('\n');
    }
    out
}

fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
