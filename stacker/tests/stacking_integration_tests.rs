//! End-to-end tests: light curve files on disk through the batch runner.

use atlas_stacker::config::{BatchConfig, StackConfig};
use atlas_stacker::io::{LightCurveLoader, ReferenceEpochLoader};
use atlas_stacker::{Band, BatchRunner, ReferenceEpochs, StackingPipeline};
use std::fs;
use tempfile::TempDir;

// ==================== Fixtures ====================

/// Orange epochs on two nights plus one outlier, cyan epochs around two new moons
const OBJECT_LC: &str = "\
###MJD            m      dm    uJy  duJy F err chi/N      RA        Dec
58400.10000  17.50  0.020    100     5 o   0  1.10  150.00000  2.50000
58400.20000  17.49  0.020    102     5 o   0  1.00  150.00000  2.50000
58401.10000  17.51  0.020     98     5 o   0  0.90  150.00000  2.50000
58402.30000  16.00  0.010    500     6 o   0  3.00  150.00000  2.50000
58405.00000  17.50  0.090     90   120 o   0  1.00  150.00000  2.50000
58412.00000  18.20  0.040     60     4 c   0  1.00  150.00000  2.50000
58413.00000  18.25  0.040     58     4 c   0  1.00  150.00000  2.50000
58414.00000  18.18  0.040     62     4 c   0  1.00  150.00000  2.50000
58428.00000  18.30  0.040     55     4 c   0  1.00  150.00000  2.50000
58429.00000  18.30  0.040     56     4 c   0  1.00  150.00000  2.50000
";

const MISSING_COLUMN_LC: &str = "\
###MJD     uJy  F      RA     Dec
58400.1    100  o  150.0    2.5
";

fn write_new_moons(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("new_moons.txt");
    fs::write(&path, "# MJD of new moons\n58400.0\n58430.0\n58459.5\n").unwrap();
    path
}

fn runner(reference_epochs: ReferenceEpochs) -> BatchRunner {
    let pipeline = StackingPipeline::new(StackConfig::default(), reference_epochs).unwrap();
    BatchRunner::new(pipeline, BatchConfig::default())
}

// ==================== Tests ====================

#[test]
fn test_directory_end_to_end() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(input.path().join("object.lc"), OBJECT_LC).unwrap();
    fs::write(input.path().join("broken.lc"), MISSING_COLUMN_LC).unwrap();

    let refs = ReferenceEpochLoader::load_from_file(&write_new_moons(&input)).unwrap();
    assert_eq!(refs.len(), 3);

    let report = runner(refs).run(input.path(), output.path()).unwrap();
    assert_eq!(report.found, 2);
    assert_eq!(report.processed, 1);
    assert_eq!(report.unreadable, vec!["broken.lc".to_string()]);
    assert_eq!(
        fs::read_to_string(output.path().join("unread.txt")).unwrap(),
        "broken.lc\n"
    );

    // Stacked output reads back as a light curve table
    let stacked = LightCurveLoader::load_from_file(&output.path().join("object.lc")).unwrap();
    let rows: Vec<(Band, f64)> = stacked.epochs.iter().map(|e| (e.band, e.mjd)).collect();
    assert_eq!(rows, vec![(Band::Orange, 58401.0), (Band::Cyan, 58400.0)]);

    // Orange bin: the 500 uJy outlier is rejected, the 120 uJy epoch never enters
    let orange = &stacked.epochs[0];
    assert!((orange.flux - 100.0).abs() < 1e-9);
    assert_eq!(orange.flux_err, 5.0);
    assert_eq!(orange.position.ra, 150.0);

    // Cyan epochs at 58428/58429 share the 58430 bin but are only two
    let cyan = &stacked.epochs[1];
    assert_eq!(cyan.flux, 60.0);
    assert_eq!(cyan.flux_err, 4.0);
}

#[test]
fn test_stacking_is_independent_of_parallelism() {
    let input = TempDir::new().unwrap();
    for i in 0..4 {
        fs::write(input.path().join(format!("object_{}.lc", i)), OBJECT_LC).unwrap();
    }
    let refs = ReferenceEpochs::new(vec![58400.0, 58430.0]);

    let parallel_out = TempDir::new().unwrap();
    let serial_out = TempDir::new().unwrap();
    let parallel = runner(refs.clone())
        .run(input.path(), parallel_out.path())
        .unwrap();

    let pipeline = StackingPipeline::new(StackConfig::default(), refs).unwrap();
    let serial = BatchRunner::new(
        pipeline,
        BatchConfig {
            parallel: false,
            ..BatchConfig::default()
        },
    )
    .run(input.path(), serial_out.path())
    .unwrap();

    assert_eq!(parallel, serial);
    for i in 0..4 {
        let name = format!("object_{}.lc", i);
        assert_eq!(
            fs::read_to_string(parallel_out.path().join(&name)).unwrap(),
            fs::read_to_string(serial_out.path().join(&name)).unwrap()
        );
    }
}

#[test]
fn test_all_epochs_cut_writes_header_only() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let path = input.path().join("faint.lc");
    fs::write(
        &path,
        "###MJD uJy duJy F RA Dec\n58400.1 10 80 o 1 1\n58400.2 12 90 o 1 1\n58400.3 11 99 o 1 1\n",
    )
    .unwrap();

    let report = runner(ReferenceEpochs::new(vec![58400.0]))
        .run(&path, output.path())
        .unwrap();
    assert_eq!(report.processed, 1);
    let written = fs::read_to_string(output.path().join("faint.lc")).unwrap();
    assert_eq!(written.lines().count(), 1);
}
