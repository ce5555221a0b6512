use anyhow::{Context, Result};
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use mzspot::annotation::IonKey;
use mzspot::grid::{well_names, GridParams};

const N_ROWS: usize = 2;
const N_COLS: usize = 3;
const PITCH: usize = 10;
const SPOT: f64 = 6.0;

/// Ions written by the demo: `(formula, adduct, molecule, wells it was spotted in)`
const DEMO_IONS: &[(&str, &str, &str, &[&str])] = &[
    ("C6H12O6", "+Na", "Glucose", &["A1", "B2"]),
    ("C6H12O6", "+K", "Glucose", &["A1"]),
    ("C16H32O2", "+H", "Palmitic acid", &["A2"]),
    ("C18H36O2", "+Na", "Stearic acid", &["A3", "B3"]),
    ("C5H5N5", "+H", "Adenine", &["B1"]),
];

/// Generate a small synthetic plate dataset with a ready-to-run config
pub fn run(output: PathBuf) -> Result<()> {
    info!("mzspot - Demo Dataset");
    info!("=====================");
    info!("Output directory: {}", output.display());

    fs::create_dir_all(output.join("images"))
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let height = N_ROWS * PITCH;
    let width = N_COLS * PITCH;
    let names = well_names(N_ROWS, N_COLS);

    let params = GridParams {
        positions: (0..N_ROWS)
            .flat_map(|r| (0..N_COLS).map(move |c| [centre(r), centre(c)]))
            .collect(),
        grid_coords: (0..N_ROWS)
            .flat_map(|r| (0..N_COLS).map(move |c| [r as f64, c as f64]))
            .collect(),
        n_rows: N_ROWS,
        n_cols: N_COLS,
        spot_h: SPOT,
        spot_w: SPOT,
        mask_names: names.clone(),
    };
    let params_file = File::create(output.join("grid_params.json"))?;
    serde_json::to_writer_pretty(params_file, &params)?;

    let mut manifest = csv::Writer::from_path(output.join("images.csv"))?;
    manifest.write_record(["formula", "adduct", "path"])?;
    let mut annotations = csv::Writer::from_path(output.join("annotations.csv"))?;
    annotations.write_record(["formula", "adduct", "fdr", "msm", "moleculeNames"])?;

    for (idx, (formula, adduct, molecule, wells)) in DEMO_IONS.iter().enumerate() {
        let key = IonKey::new(*formula, *adduct);
        let file_name = format!("images/ion_{}.tsv", idx);
        let pixels = demo_image(&params, &names, wells, idx, height, width);
        write_matrix(&output.join(&file_name), &pixels, width)?;

        manifest.write_record([*formula, *adduct, file_name.as_str()])?;
        annotations.write_record([
            *formula,
            *adduct,
            if idx % 2 == 0 { "0.05" } else { "0.1" },
            "0.9",
            *molecule,
        ])?;
        info!("  {} spotted in {}", key, wells.join(", "));
    }
    manifest.flush()?;
    annotations.flush()?;

    let mut targets = BufWriter::new(File::create(output.join("Molecules.csv"))?);
    for (formula, _, molecule, wells) in DEMO_IONS {
        for well in wells.iter() {
            writeln!(targets, "{},{},{}", well, molecule, formula)?;
        }
    }
    // A target that was spotted but never annotated
    writeln!(targets, "B1,Cholesterol,C27H46O")?;
    targets.flush()?;

    fs::write(
        output.join("run.toml"),
        r#"[dataset]
id = "demo_plate"
fdr = 0.1
database = "DemoDB"

[inputs]
grid_params = "grid_params.json"
images = "images.csv"
targets = "Molecules.csv"
annotations = "annotations.csv"

[aggregation]
empty_region = "nan"

[output]
dir = "out"
parquet = true
"#,
    )?;

    println!("Demo dataset written to {}", output.display());
    println!(
        "Run: mzspot report --config {}",
        output.join("run.toml").display()
    );
    Ok(())
}

fn centre(index: usize) -> f64 {
    (index * PITCH) as f64 + PITCH as f64 / 2.0
}

/// Signal inside the spots of `wells`, weaker toward spot edges, with a
/// sparse low background elsewhere
fn demo_image(
    params: &GridParams,
    names: &[String],
    wells: &[&str],
    seed: usize,
    height: usize,
    width: usize,
) -> Vec<f64> {
    let mut pixels = vec![0.0; height * width];
    for (label, name) in names.iter().enumerate() {
        if !wells.contains(&name.as_str()) {
            continue;
        }
        let [cr, cc] = params.positions[label];
        for r in 0..height {
            for c in 0..width {
                let dr = (r as f64 + 0.5 - cr).abs();
                let dc = (c as f64 + 0.5 - cc).abs();
                if dr <= SPOT / 2.0 && dc <= SPOT / 2.0 {
                    pixels[r * width + c] = 1000.0 * (seed + 1) as f64 / (1.0 + dr + dc);
                }
            }
        }
    }
    for (idx, value) in pixels.iter_mut().enumerate() {
        if *value == 0.0 && (idx + seed) % 17 == 0 {
            *value = 5.0;
        }
    }
    pixels
}

fn write_matrix(path: &Path, pixels: &[f64], width: usize) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in pixels.chunks(width) {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
