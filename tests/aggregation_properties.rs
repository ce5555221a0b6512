//! Property tests for region aggregation and target matching

use mzspot::aggregate::{aggregate, EmptyRegionPolicy, RegionStats};
use mzspot::annotation::IonKey;
use mzspot::grid::RegionMask;
use mzspot::image::{ImageStack, IntensityImage};
use mzspot::matcher::{match_targets, Target};
use proptest::prelude::*;

const FORMULAS: [&str; 3] = ["C6H12O6", "C16H32O2", "C5H5N5"];
const ADDUCTS: [&str; 4] = ["+H", "+Na", "+K", "-H"];

/// Mask with labels in `-1..n_regions` plus one image per ion, all `h x w`
fn plate_strategy() -> impl Strategy<Value = (RegionMask, Vec<String>, ImageStack)> {
    (1usize..6, 1usize..6, 1usize..4, 1usize..5).prop_flat_map(|(h, w, n_regions, n_ions)| {
        let labels = prop::collection::vec(-1i64..n_regions as i64, h * w);
        let images = prop::collection::vec(
            (
                0..FORMULAS.len(),
                0..ADDUCTS.len(),
                prop::collection::vec(prop_oneof![Just(0.0), 0.0f64..1000.0], h * w),
            ),
            n_ions,
        );
        (labels, images).prop_map(move |(labels, images)| {
            let mask = RegionMask::new(h, w, labels).unwrap();
            let names: Vec<String> = (0..n_regions).map(|i| format!("R{}", i)).collect();
            let stack: ImageStack = images
                .into_iter()
                .map(|(f, a, pixels)| {
                    (
                        IonKey::new(FORMULAS[f], ADDUCTS[a]),
                        IntensityImage::new(h, w, pixels).unwrap(),
                    )
                })
                .collect();
            (mask, names, stack)
        })
    })
}

proptest! {
    /// Occupancy stays within 0-100 and hits the bounds exactly when it should
    #[test]
    fn test_occupancy_bounds(values in prop::collection::vec(prop_oneof![Just(0.0), 0.001f64..100.0], 1..50)) {
        let stats = RegionStats::from_values(&values);
        prop_assert!((0.0..=100.0).contains(&stats.occupancy));
        prop_assert_eq!(stats.occupancy == 100.0, values.iter().all(|&v| v > 0.0));
        prop_assert_eq!(stats.occupancy == 0.0, values.iter().all(|&v| v == 0.0));
    }

    /// Sum equals mean times pixel count, and std is never negative
    #[test]
    fn test_sum_matches_mean(values in prop::collection::vec(0.0f64..1e6, 1..50)) {
        let stats = RegionStats::from_values(&values);
        let n = values.len() as f64;
        prop_assert!((stats.sum - stats.mean * n).abs() <= 1e-6 * stats.sum.max(1.0));
        prop_assert!(stats.std >= 0.0);
    }

    /// Every ion gets one cell per region, and repeated runs agree
    #[test]
    fn test_table_shape_and_idempotence((mask, names, images) in plate_strategy()) {
        let first = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan).unwrap();
        let second = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan).unwrap();

        prop_assert_eq!(first.len(), names.len() * images.len());
        prop_assert_eq!(first.ion_count(), images.len());
        for ((k1, r1), (k2, r2)) in first.rows().zip(second.rows()) {
            prop_assert_eq!(k1, k2);
            for (a, b) in r1.iter().zip(r2) {
                prop_assert_eq!(a.sum.to_bits(), b.sum.to_bits());
                prop_assert_eq!(a.mean.to_bits(), b.mean.to_bits());
                prop_assert_eq!(a.occupancy.to_bits(), b.occupancy.to_bits());
            }
        }
    }

    /// Background pixels never contribute to any region
    #[test]
    fn test_region_sums_cover_labeled_pixels((mask, names, images) in plate_strategy()) {
        let table = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan).unwrap();
        let n = names.len() as i64;

        for (key, image) in images.iter() {
            let labeled: f64 = mask
                .labels()
                .iter()
                .zip(image.pixels())
                .filter(|(label, _)| (0..n).contains(*label))
                .map(|(_, v)| v)
                .sum();
            let row = table.row(key).unwrap();
            let total: f64 = row.iter().map(|s| s.sum).sum();
            prop_assert!((labeled - total).abs() <= 1e-6 * labeled.max(1.0));
        }
    }

    /// A match always shares the target's formula, carries the largest sum
    /// among that formula's ions, and is the first such ion in key order
    #[test]
    fn test_best_match((mask, names, images) in plate_strategy(), formula_idx in 0..FORMULAS.len()) {
        let table = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan).unwrap();
        let formula = FORMULAS[formula_idx];
        let targets: Vec<Target> = names
            .iter()
            .map(|well| Target::new(well.as_str(), formula, "molecule"))
            .collect();

        let report = match_targets(&targets, &table).unwrap();
        prop_assert_eq!(report.rows.len(), targets.len());

        for row in &report.rows {
            let candidates: Vec<(&IonKey, f64)> = table
                .rows()
                .filter(|(key, _)| key.base_formula() == formula)
                .map(|(key, _)| (key, table.get(key, &row.target.well).unwrap().sum))
                .collect();
            let best = candidates.iter().map(|(_, s)| *s).fold(0.0, f64::max);

            match &row.matched {
                Some(key) => {
                    prop_assert_eq!(key.base_formula(), formula);
                    prop_assert_eq!(row.stats.sum, best);
                    let first = candidates.iter().find(|(_, s)| *s == best).map(|(k, _)| *k);
                    prop_assert_eq!(Some(key), first);
                }
                None => {
                    prop_assert_eq!(best, 0.0);
                    prop_assert_eq!(row.stats, RegionStats::ZERO);
                }
            }
        }
    }
}
