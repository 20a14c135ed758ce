//! Write-only scalar telemetry.
//!
//! The trainer pushes `reward`, `reward_mean_100`, `loss` and `epsilon` series
//! into a [`TelemetrySink`] and never reads them back.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::Result;

pub trait TelemetrySink {
    fn record_scalar(&mut self, tag: &str, step: usize, value: f32) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record_scalar(&mut self, _tag: &str, _step: usize, _value: f32) -> Result<()> {
        Ok(())
    }
}

/// One recorded scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRecord {
    pub tag: String,
    pub step: usize,
    pub value: f32,
}

/// Keeps every scalar in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub records: Vec<ScalarRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(step, value)` pairs of one series, in recording order.
    pub fn series(&self, tag: &str) -> Vec<(usize, f32)> {
        self.records
            .iter()
            .filter(|r| r.tag == tag)
            .map(|r| (r.step, r.value))
            .collect()
    }
}

impl TelemetrySink for MemorySink {
    fn record_scalar(&mut self, tag: &str, step: usize, value: f32) -> Result<()> {
        self.records.push(ScalarRecord { tag: tag.to_string(), step, value });
        Ok(())
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for Box<S> {
    fn record_scalar(&mut self, tag: &str, step: usize, value: f32) -> Result<()> {
        (**self).record_scalar(tag, step, value)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Appends `step,tag,value,wall_time` rows to `<log_dir>/<run_name>/scalars.csv`.
pub struct CsvScalarWriter {
    log_dir: PathBuf,
    start: Instant,
    writer: BufWriter<File>,
}

impl CsvScalarWriter {
    /// Create the run directory and the CSV file with its header.
    pub fn new<P: AsRef<Path>>(log_dir: P, run_name: &str) -> Result<Self> {
        let log_path = log_dir.as_ref().join(run_name);
        create_dir_all(&log_path)?;

        let mut writer = BufWriter::new(File::create(log_path.join("scalars.csv"))?);
        writeln!(writer, "step,tag,value,wall_time")?;

        Ok(CsvScalarWriter {
            log_dir: log_path,
            start: Instant::now(),
            writer,
        })
    }

    /// Directory holding `scalars.csv`.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

impl TelemetrySink for CsvScalarWriter {
    fn record_scalar(&mut self, tag: &str, step: usize, value: f32) -> Result<()> {
        let wall_time = self.start.elapsed().as_secs_f64();
        writeln!(self.writer, "{},{},{},{:.3}", step, tag, value, wall_time)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for CsvScalarWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_series() {
        let mut sink = MemorySink::new();
        sink.record_scalar("reward", 1, 3.0).unwrap();
        sink.record_scalar("loss", 7, 0.5).unwrap();
        sink.record_scalar("reward", 2, 4.0).unwrap();
        assert_eq!(sink.series("reward"), vec![(1, 3.0), (2, 4.0)]);
    }

    #[test]
    fn test_csv_writer_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvScalarWriter::new(dir.path(), "run").unwrap();
        writer.record_scalar("reward", 1, 12.5).unwrap();
        writer.flush().unwrap();
        let contents = std::fs::read_to_string(writer.log_dir().join("scalars.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "step,tag,value,wall_time");
        assert!(lines[1].starts_with("1,reward,12.5,"));
    }
}
