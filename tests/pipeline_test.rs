//! End-to-end tests: files on disk -> aggregation -> matching -> report files

use std::fs;
use std::path::Path;

use mzspot::aggregate::{aggregate, EmptyRegionPolicy, Statistic};
use mzspot::annotation::{AnnotationTable, IonKey};
use mzspot::export::{ParquetExportConfig, ReportExporter, ReportNaming};
use mzspot::grid::{GridParams, RegionMask};
use mzspot::image::ImageStack;
use mzspot::matcher::{match_targets, read_targets_file, MatchError};
use tempfile::tempdir;

const EPS: f64 = 1e-3;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// The two-well example: mask [[0,0,1],[0,1,1]], one glucose ion
fn write_example(dir: &Path) {
    fs::create_dir_all(dir.join("images")).unwrap();
    write(dir, "grid_mask.tsv", "0\t0\t1\n0\t1\t1\n");
    write(
        dir,
        "grid_params.json",
        r#"[[[0.5, 0.5], [1.0, 2.0]], [], 1, 2, 1.0, 1.0, ["A", "B"]]"#,
    );
    write(dir, "images/glucose.tsv", "2\t0\t5\n0\t3\t4\n");
    write(dir, "images/glucose_k.tsv", "1\t0\t0\n1\t0\t0\n");
    write(dir, "images/palmitate.tsv", "0\t0\t0\n0\t9\t9\n");
    write(
        dir,
        "images.csv",
        "formula,adduct,path\n\
         C6H12O6,+,images/glucose.tsv\n\
         C6H12O6,+K,images/glucose_k.tsv\n\
         C16H32O2,+H,images/palmitate.tsv\n",
    );
    write(
        dir,
        "Molecules.csv",
        "A,Glucose,C6H12O6\nB,Palmitic acid,C16H32O2\nB,Cholesterol,C27H46O\n",
    );
}

#[test]
fn test_worked_example_from_files() {
    let dir = tempdir().unwrap();
    write_example(dir.path());

    let mask = RegionMask::from_file(dir.path().join("grid_mask.tsv")).unwrap();
    let params = GridParams::from_json_file(dir.path().join("grid_params.json")).unwrap();
    let names = params.region_names().unwrap();
    let images = ImageStack::from_manifest(dir.path().join("images.csv")).unwrap();
    assert_eq!(images.len(), 3);

    let table = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan).unwrap();
    assert_eq!(table.len(), names.len() * images.len());

    let targets = read_targets_file(dir.path().join("Molecules.csv")).unwrap();
    let report = match_targets(&targets, &table).unwrap();

    let glucose = report.get("A", "C6H12O6", "Glucose").unwrap();
    // "+" and "+K" both sum to 2 in well A; the first in key order wins
    assert_eq!(glucose.matched, Some(IonKey::new("C6H12O6", "+")));
    assert_eq!(glucose.stats.sum, 2.0);
    assert!((glucose.stats.mean - 0.667).abs() < EPS);
    assert!((glucose.stats.std - 0.943).abs() < EPS);
    assert!((glucose.stats.occupancy - 33.3).abs() < 0.1);

    let palmitate = report.get("B", "C16H32O2", "Palmitic acid").unwrap();
    assert_eq!(palmitate.stats.sum, 18.0);

    let cholesterol = report.get("B", "C27H46O", "Cholesterol").unwrap();
    assert!(cholesterol.matched.is_none());
    assert_eq!(cholesterol.stats.sum, 0.0);
}

#[test]
fn test_report_files_written() {
    let dir = tempdir().unwrap();
    write_example(dir.path());
    let out = dir.path().join("out");

    let mask = RegionMask::from_file(dir.path().join("grid_mask.tsv")).unwrap();
    let names = vec!["A".to_string(), "B".to_string()];
    let images = ImageStack::from_manifest(dir.path().join("images.csv")).unwrap();
    let table = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan).unwrap();
    let targets = read_targets_file(dir.path().join("Molecules.csv")).unwrap();
    let report = match_targets(&targets, &table).unwrap();

    let naming = ReportNaming::new("2020-03-12_17h55m21s", 0.5, "SwissLipids-2018-02-02");
    let exporter = ReportExporter::new(naming.clone()).with_parquet(ParquetExportConfig::default());
    let summary = exporter.export_all(&out, &table, &report).unwrap();
    assert_eq!(summary.targets, 3);
    assert_eq!(summary.matched_targets, 2);

    let occupancy = fs::read_to_string(naming.statistic_path(&out, Statistic::Occupancy)).unwrap();
    let lines: Vec<&str> = occupancy.lines().collect();
    assert_eq!(lines[0], "ion,A,B");
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().any(|l| l.starts_with("C16H32O2+H,0,")));

    let report_csv = fs::read_to_string(naming.report_path(&out)).unwrap();
    assert!(report_csv.contains("B,C27H46O,Cholesterol,,0,0,0,0"));
    assert!(naming.parquet_path(&out).exists());
}

#[test]
fn test_rasterised_grid_matches_explicit_mask() {
    let params = GridParams::from_json(
        r#"{"positions": [[1.0, 1.0], [1.0, 4.0]], "n_rows": 1, "n_cols": 2,
            "spot_h": 2.0, "spot_w": 2.0}"#,
    )
    .unwrap();
    let mask = params.rasterize(2, 6);
    let expected =
        RegionMask::from_rows(&[vec![0, 0, -1, 1, 1, -1], vec![0, 0, -1, 1, 1, -1]]).unwrap();
    assert_eq!(mask, expected);
    assert_eq!(params.region_names().unwrap(), vec!["A1", "A2"]);
}

#[test]
fn test_annotation_table_restricts_images() {
    let dir = tempdir().unwrap();
    write_example(dir.path());
    write(
        dir.path(),
        "annotations.csv",
        "formula,adduct,fdr\nC6H12O6,+,0.05\nC6H12O6,+K,0.5\nC27H46O,+H,0.05\n",
    );

    let table = AnnotationTable::from_csv_file(dir.path().join("annotations.csv"))
        .unwrap()
        .filter_by_fdr(0.1)
        .dedup_by_ion();
    let mut images = ImageStack::from_manifest(dir.path().join("images.csv")).unwrap();
    images.retain_keys(&table.keys());

    let keys: Vec<String> = images.keys().map(IonKey::ion).collect();
    assert_eq!(keys, vec!["C6H12O6+"]);
}

#[test]
fn test_mismatched_target_file_is_fatal() {
    let dir = tempdir().unwrap();
    write_example(dir.path());
    write(dir.path(), "Molecules.csv", "A,Glucose,C6H12O6\nC7,Adenine,C5H5N5\n");

    let mask = RegionMask::from_file(dir.path().join("grid_mask.tsv")).unwrap();
    let names = vec!["A".to_string(), "B".to_string()];
    let images = ImageStack::from_manifest(dir.path().join("images.csv")).unwrap();
    let table = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan).unwrap();
    let targets = read_targets_file(dir.path().join("Molecules.csv")).unwrap();

    let err = match_targets(&targets, &table).unwrap_err();
    assert!(matches!(err, MatchError::MissingRegion { ref well, .. } if well == "C7"));
    assert!(err.to_string().contains("C7"));
}
