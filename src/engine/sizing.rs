//! Discrete equipment selection from demand figures.

use tracing::debug;

use super::aggregate::report_ceil;
use crate::error::{EngineError, Result};
use crate::guideline::GuidelineSnapshot;
use crate::inventory::ProjectType;
use crate::report::{StorageRecommendation, TransformerSelection};

/// Selects the smallest transformer rating covering the given max demand.
///
/// The table is ordered ascending and filtered by project type before
/// selection, so the first qualifying entry is the answer.
///
/// # Errors
///
/// `NoSuitableRating` when no rating in the (filtered) table covers the
/// demand. The largest available rating is reported for diagnosis; it is
/// never silently selected.
pub(crate) fn select_transformer(
    snapshot: &GuidelineSnapshot,
    project_type: ProjectType,
    max_demand_w: f64,
) -> Result<TransformerSelection> {
    let demand_kva = max_demand_w / snapshot.power_factor() / 1000.0;

    let mut largest = 0.0_f64;
    for rating in snapshot.ratings_for(project_type) {
        if rating.rating_kva >= demand_kva {
            debug!(
                guideline = snapshot.label(),
                demand_kva,
                rating_kva = rating.rating_kva,
                "selected transformer rating"
            );
            return Ok(TransformerSelection {
                rating_kva: report_ceil(rating.rating_kva),
                demand_kva: report_ceil(demand_kva),
            });
        }
        largest = rating.rating_kva;
    }

    Err(EngineError::NoSuitableRating {
        demand_kva: report_ceil(demand_kva),
        largest_kva: report_ceil(largest),
    })
}

/// Sizes the potable-water storage tank.
///
/// Volume is one day's total demand plus the policy buffer fraction. The
/// footprint divides the volume by the caller-supplied depth; the square
/// side length is advisory only.
///
/// # Errors
///
/// `InvalidInventory` when the tank depth is not a finite positive number.
pub(crate) fn size_storage(
    total_daily_lpd: f64,
    buffer_fraction: f64,
    tank_depth_m: f64,
) -> Result<StorageRecommendation> {
    if !tank_depth_m.is_finite() || tank_depth_m <= 0.0 {
        return Err(EngineError::InvalidInventory {
            reason: format!("tank depth must be a finite positive number, got {tank_depth_m}"),
        });
    }

    let volume_l = total_daily_lpd * (1.0 + buffer_fraction);
    let volume_m3 = volume_l / 1000.0;
    let footprint_m2 = volume_m3 / tank_depth_m;
    let side_m = footprint_m2.sqrt();

    Ok(StorageRecommendation {
        volume_l: report_ceil(volume_l),
        footprint_m2: report_ceil(footprint_m2),
        side_m: report_ceil(side_m),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guideline::{Guideline, GuidelineCatalog, TransformerRating};

    fn snapshot_with_ratings(ratings_kva: &[f64]) -> GuidelineSnapshot {
        let mut guideline = Guideline::new(0.9);
        for &rating_kva in ratings_kva {
            guideline.push_rating(TransformerRating {
                rating_kva,
                project_types: Vec::new(),
            });
        }
        let mut catalog = GuidelineCatalog::new();
        catalog.insert("STD", guideline);
        catalog.snapshot("STD").unwrap()
    }

    #[test]
    fn smallest_covering_rating_wins() {
        let snapshot = snapshot_with_ratings(&[250.0, 400.0, 630.0, 1000.0]);
        // 315 kW at pf 0.9 is 350 kVA; 400 covers it, 250 does not.
        let selection =
            select_transformer(&snapshot, ProjectType::Residential, 315_000.0).unwrap();
        assert_eq!(selection.rating_kva, 400);
        assert_eq!(selection.demand_kva, 350);
    }

    #[test]
    fn exhausted_table_is_surfaced_not_capped() {
        let snapshot = snapshot_with_ratings(&[250.0, 400.0]);
        let err =
            select_transformer(&snapshot, ProjectType::Residential, 900_000.0).unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoSuitableRating {
                demand_kva: 1000,
                largest_kva: 400,
            }
        ));
    }

    #[test]
    fn selection_is_monotone_in_demand() {
        let snapshot = snapshot_with_ratings(&[250.0, 400.0, 630.0, 1000.0, 1600.0]);
        let mut previous = 0;
        for demand_w in [50_000.0, 200_000.0, 350_000.0, 500_000.0, 900_000.0, 1_400_000.0] {
            let selection =
                select_transformer(&snapshot, ProjectType::Residential, demand_w).unwrap();
            assert!(selection.rating_kva >= previous);
            previous = selection.rating_kva;
        }
    }

    #[test]
    fn storage_scales_with_buffer_fraction() {
        let with_buffer = size_storage(73_410.0, 0.2, 3.0).unwrap();
        let without_buffer = size_storage(73_410.0, 0.0, 3.0).unwrap();
        assert_eq!(with_buffer.volume_l, 88_092);
        assert_eq!(without_buffer.volume_l, 73_410);
        assert!(without_buffer.volume_l <= with_buffer.volume_l);
    }

    #[test]
    fn footprint_divides_volume_by_depth() {
        // 88 092 l = 88.092 m³; at 3 m depth the footprint is 29.364 m².
        let storage = size_storage(73_410.0, 0.2, 3.0).unwrap();
        assert_eq!(storage.footprint_m2, 30);
        assert_eq!(storage.side_m, 6);
    }

    #[test]
    fn non_positive_depth_is_rejected() {
        assert!(size_storage(1000.0, 0.2, 0.0).is_err());
        assert!(size_storage(1000.0, 0.2, -2.0).is_err());
        assert!(size_storage(1000.0, 0.2, f64::NAN).is_err());
    }
}
