//! Rendering targets for solver output.
//!
//! The solver hands over plain records; a `ReportSink` decides how they are shown.

use std::io::Write;

use crate::error::Result;
use crate::output::{
    EigenSummary, ModalSummary, StudyRow, TimeSeries, render_eigen_summary, render_modal_summary,
    render_study_table,
};

/// Receives solver results as plain data.
pub trait ReportSink {
    fn study(&mut self, rows: &[StudyRow]) -> Result<()>;

    fn eigen(&mut self, summary: &EigenSummary) -> Result<()>;

    fn modal(&mut self, summary: &ModalSummary, series: &TimeSeries) -> Result<()>;
}

/// Writes human-readable text tables to any `Write` target.
pub struct TextReporter<W: Write> {
    out: W,
    /// Number of time samples echoed per channel; the full series goes to CSV.
    preview_samples: usize,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            preview_samples: 5,
        }
    }

    pub fn with_preview_samples(mut self, samples: usize) -> Self {
        self.preview_samples = samples;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReporter<W> {
    fn study(&mut self, rows: &[StudyRow]) -> Result<()> {
        write!(self.out, "{}", render_study_table(rows))?;
        Ok(())
    }

    fn eigen(&mut self, summary: &EigenSummary) -> Result<()> {
        write!(self.out, "{}", render_eigen_summary(summary))?;
        Ok(())
    }

    fn modal(&mut self, summary: &ModalSummary, series: &TimeSeries) -> Result<()> {
        series.check_aligned()?;
        write!(self.out, "{}", render_modal_summary(summary))?;
        if self.preview_samples == 0 || series.num_samples() == 0 {
            return Ok(());
        }

        writeln!(
            self.out,
            "\ndisplacement (first {} of {} samples):",
            self.preview_samples.min(series.num_samples()),
            series.num_samples()
        )?;
        write!(self.out, "{:>10}", "t")?;
        for channel in &series.channels {
            write!(self.out, "{:>13}", channel.label)?;
        }
        writeln!(self.out)?;
        for (step, t) in series.time.iter().take(self.preview_samples).enumerate() {
            write!(self.out, "{:>10.3}", t)?;
            for channel in &series.channels {
                write!(self.out, "{:>13.6}", channel.values[step])?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }
}
