//! Console reporter.

use std::io::{self, Write};

use console::style;

use sit4onnx_core::{BenchReport, InputBank, ProviderDescriptor, TensorSummary};

/// What the reporter writes for a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Nothing.
    Quiet,
    /// Coloured `INFO:` lines as the run progresses.
    Text,
    /// One JSON document once the run is finished.
    Json,
}

/// Writes the run report to `out`.
pub struct Reporter<W: Write> {
    out: W,
    mode: ReportMode,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, mode: ReportMode) -> Self {
        Self { out, mode }
    }

    fn text(&self) -> bool {
        self.mode == ReportMode::Text
    }

    pub fn providers(&mut self, providers: &[String]) -> io::Result<()> {
        if !self.text() {
            return Ok(());
        }
        writeln!(
            self.out,
            "{} {} {:?}",
            style("INFO:").green(),
            style("providers:").blue(),
            providers
        )
    }

    pub fn provider_options(&mut self, descriptor: &ProviderDescriptor) -> io::Result<()> {
        let pairs = descriptor.option_pairs();
        if !self.text() || pairs.is_empty() {
            return Ok(());
        }
        let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        writeln!(
            self.out,
            "{} {} {}",
            style("INFO:").green(),
            style("provider_options:").blue(),
            rendered.join(", ")
        )
    }

    pub fn inputs(&mut self, bank: &InputBank) -> io::Result<()> {
        if !self.text() {
            return Ok(());
        }
        for (idx, input) in TensorSummary::from_inputs(bank).iter().enumerate() {
            self.tensor("input_name", idx + 1, input)?;
        }
        Ok(())
    }

    /// Timing, outputs and saved files; the whole report in JSON mode.
    pub fn results(&mut self, report: &BenchReport) -> io::Result<()> {
        match self.mode {
            ReportMode::Quiet => return Ok(()),
            ReportMode::Json => {
                serde_json::to_writer_pretty(&mut self.out, report)?;
                return writeln!(self.out);
            }
            ReportMode::Text => {}
        }

        writeln!(
            self.out,
            "{} {} {}",
            style("INFO:").green(),
            style("test_loop_count:").blue(),
            report.test_loop_count
        )?;
        writeln!(
            self.out,
            "{} {} {} ms",
            style("INFO:").green(),
            style("avg elapsed time per pred:").blue(),
            report.avg_elapsed_ms
        )?;
        for (idx, output) in report.outputs.iter().enumerate() {
            self.tensor("output_name", idx + 1, output)?;
        }
        for path in &report.saved_files {
            writeln!(
                self.out,
                "{} {} {}",
                style("INFO:").green(),
                style("saved:").blue(),
                path.display()
            )?;
        }
        Ok(())
    }

    fn tensor(&mut self, label: &str, idx: usize, tensor: &TensorSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "{} {} {}, {} {:?}, {} {}",
            style("INFO:").green(),
            style(format!("{}.{}:", label, idx)).blue(),
            tensor.name,
            style("shape:").blue(),
            tensor.shape,
            style("dtype:").blue(),
            tensor.dtype
        )
    }
}
