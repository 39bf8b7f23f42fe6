//! Directory and single-file stacking runs.
//!
//! A [`BatchRunner`] loads each light curve, stacks it with a shared
//! [`StackingPipeline`] and writes the result under the output directory
//! with the input file name. A file that fails at any step is recorded in
//! the unread report and the run carries on.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BatchConfig;
use crate::io::{write_stacked_file, LightCurveLoader};
use crate::preprocessing::StackingPipeline;

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Light curve files considered
    pub found: usize,
    /// Files stacked and written
    pub processed: usize,
    /// Names of files that could not be processed, in sorted order
    pub unreadable: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.unreadable.is_empty()
    }
}

/// Runs the stacking pipeline over a file or a directory of files
pub struct BatchRunner {
    pipeline: StackingPipeline,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(pipeline: StackingPipeline, config: BatchConfig) -> Self {
        Self { pipeline, config }
    }

    pub fn pipeline(&self) -> &StackingPipeline {
        &self.pipeline
    }

    /// Stack every light curve found at `source` into `out_dir`
    ///
    /// # Errors
    /// Fails when the output directory cannot be created, when `source` is
    /// neither a directory nor a light curve file, or when the unread report
    /// cannot be written. A directory without light curves gives an empty
    /// report.
    /// Failures of individual files only appear in the report.
    pub fn run(&self, source: &Path, out_dir: &Path) -> Result<BatchReport> {
        if out_dir.exists() && !out_dir.is_dir() {
            bail!("Output path is not a directory: {}", out_dir.display());
        }
        fs::create_dir_all(out_dir).with_context(|| {
            format!("Failed to create output directory: {}", out_dir.display())
        })?;

        let files = self.collect_files(source)?;
        info!("Found {} light curves in {}", files.len(), source.display());

        let outcomes: Vec<(String, Result<()>)> = if self.config.parallel {
            files
                .par_iter()
                .map(|path| (file_name(path), self.process_file(path, out_dir)))
                .collect()
        } else {
            files
                .iter()
                .map(|path| (file_name(path), self.process_file(path, out_dir)))
                .collect()
        };

        let mut report = BatchReport {
            found: files.len(),
            ..BatchReport::default()
        };
        for (name, outcome) in outcomes {
            match outcome {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    warn!("Skipping {}: {:#}", name, e);
                    report.unreadable.push(name);
                }
            }
        }

        if !report.is_clean() {
            let report_path = out_dir.join(&self.config.unread_report);
            let mut content = report.unreadable.join("\n");
            content.push('\n');
            fs::write(&report_path, content).with_context(|| {
                format!("Failed to write unread report: {}", report_path.display())
            })?;
        }

        info!(
            "Stacked {} of {} light curves ({} unreadable)",
            report.processed,
            report.found,
            report.unreadable.len()
        );
        Ok(report)
    }

    /// Load, stack and write one light curve
    pub fn process_file(&self, path: &Path, out_dir: &Path) -> Result<()> {
        let lightcurve = LightCurveLoader::load_from_file(path)?;
        let stacked = self
            .pipeline
            .stack(&lightcurve)
            .with_context(|| format!("Failed to stack {}", path.display()))?;

        let out_path = out_dir.join(file_name(path));
        write_stacked_file(&stacked, &out_path)?;
        info!(
            "{}: {} epochs -> {} stacked points",
            file_name(path),
            lightcurve.len(),
            stacked.len()
        );
        Ok(())
    }

    fn collect_files(&self, source: &Path) -> Result<Vec<PathBuf>> {
        if source.is_dir() {
            let mut files = Vec::new();
            for entry in fs::read_dir(source)
                .with_context(|| format!("Failed to list directory: {}", source.display()))?
            {
                let path = entry?.path();
                if path.is_file() && self.has_extension(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else if source.is_file() && self.has_extension(source) {
            Ok(vec![source.to_path_buf()])
        } else {
            bail!("no light curve found at {}", source.display())
        }
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.config.extension)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackConfig;
    use crate::time::ReferenceEpochs;
    use tempfile::TempDir;

    const GOOD_LC: &str = "\
###MJD uJy duJy F RA Dec
58400.1 100 5 o 10.0 20.0
58400.2 102 5 o 10.0 20.0
58401.1 98 5 o 10.0 20.0
";

    fn runner(parallel: bool) -> BatchRunner {
        let pipeline = StackingPipeline::new(
            StackConfig::default(),
            ReferenceEpochs::new(vec![58400.0, 58430.0]),
        )
        .unwrap();
        BatchRunner::new(
            pipeline,
            BatchConfig {
                parallel,
                ..BatchConfig::default()
            },
        )
    }

    #[test]
    fn test_directory_run_records_unreadable() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("a.lc"), GOOD_LC).unwrap();
        fs::write(input.path().join("b.lc"), "###MJD uJy F RA Dec\n58400 1 o 0 0\n").unwrap();
        fs::write(input.path().join("notes.txt"), "ignored").unwrap();

        for parallel in [true, false] {
            let report = runner(parallel).run(input.path(), output.path()).unwrap();
            assert_eq!(report.found, 2);
            assert_eq!(report.processed, 1);
            assert_eq!(report.unreadable, vec!["b.lc".to_string()]);

            let written = fs::read_to_string(output.path().join("a.lc")).unwrap();
            assert!(written.starts_with("###MJD uJy duJy"));
            assert_eq!(written.lines().count(), 2);

            let unread = fs::read_to_string(output.path().join("unread.txt")).unwrap();
            assert_eq!(unread, "b.lc\n");
        }
    }

    #[test]
    fn test_single_file_run() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = input.path().join("single.lc");
        fs::write(&path, GOOD_LC).unwrap();

        let out_dir = output.path().join("nested");
        let report = runner(false).run(&path, &out_dir).unwrap();
        assert_eq!(report.processed, 1);
        assert!(report.is_clean());
        assert!(out_dir.join("single.lc").is_file());
        assert!(!out_dir.join("unread.txt").exists());
    }

    #[test]
    fn test_directory_without_light_curves() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("notes.txt"), "ignored").unwrap();

        let report = runner(true).run(input.path(), output.path()).unwrap();
        assert_eq!(report, BatchReport::default());
        assert!(!output.path().join("unread.txt").exists());
    }

    #[test]
    fn test_no_light_curve_found() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let notes = input.path().join("notes.txt");
        fs::write(&notes, "ignored").unwrap();

        let err = runner(true).run(&notes, output.path()).unwrap_err();
        assert!(err.to_string().contains("no light curve found"));

        let err = runner(true)
            .run(&input.path().join("missing.lc"), output.path())
            .unwrap_err();
        assert!(err.to_string().contains("no light curve found"));
    }

    #[test]
    fn test_non_numeric_file_is_unreadable() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("a.lc"), GOOD_LC).unwrap();
        fs::write(
            input.path().join("corrupt.lc"),
            "###MJD uJy duJy F RA Dec\n58400.1 100 5 o 1 1\n58400.2 garbage 5 o 1 1\n58400.3 101 5 o 1 1\n58400.4 99 5 o 1 1\n",
        )
        .unwrap();

        let report = runner(false).run(input.path(), output.path()).unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.unreadable, vec!["corrupt.lc".to_string()]);
        assert!(!output.path().join("corrupt.lc").exists());
        assert_eq!(
            fs::read_to_string(output.path().join("unread.txt")).unwrap(),
            "corrupt.lc\n"
        );
    }

    #[test]
    fn test_output_path_is_a_file() {
        let input = TempDir::new().unwrap();
        let path = input.path().join("a.lc");
        fs::write(&path, GOOD_LC).unwrap();

        assert!(runner(false).run(&path, &path).is_err());
    }
}
