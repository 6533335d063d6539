//! Roll-ups from raw lines to building and project figures.
//!
//! Aggregation always sums raw `f64` intermediates; [`report_ceil`] is the
//! single point where a figure becomes a reported whole unit. Summing
//! already-rounded figures would compound rounding error across levels.

use super::unit_load::{RawElectricalLine, RawEquipmentLine, RawMechanicalLine, RawWaterLine};

/// Rounds a raw figure up to the next whole reported unit.
///
/// Applied exactly once per reported figure, at the point it enters a
/// report. Inputs are screened upstream, so the value is always finite and
/// non-negative here.
pub(crate) fn report_ceil(raw: f64) -> u64 {
    debug_assert!(raw.is_finite() && raw >= 0.0);
    raw.ceil() as u64
}

/// Accumulated raw electrical figures for one aggregation level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ElectricalRollup {
    pub connected_w: f64,
    pub max_demand_w: f64,
    pub essential_w: f64,
    pub fire_w: f64,
}

impl ElectricalRollup {
    fn add(&mut self, connected_w: f64, mdf: f64, edf: f64, fdf: f64) {
        self.connected_w += connected_w;
        self.max_demand_w += connected_w * mdf;
        self.essential_w += connected_w * edf;
        self.fire_w += connected_w * fdf;
    }

    /// Folds a lower-level rollup into this one. Plain addition; diversity
    /// was already applied per line.
    pub fn absorb(&mut self, other: &Self) {
        self.connected_w += other.connected_w;
        self.max_demand_w += other.max_demand_w;
        self.essential_w += other.essential_w;
        self.fire_w += other.fire_w;
    }
}

/// Sums one building's unit lines. Each line carries its own demand
/// factors, so two unit types in the same building may diversify
/// differently.
pub(crate) fn rollup_electrical(lines: &[RawElectricalLine]) -> ElectricalRollup {
    let mut rollup = ElectricalRollup::default();
    for line in lines {
        rollup.add(
            line.connected_w,
            line.max_demand_factor,
            line.essential_demand_factor,
            line.fire_demand_factor,
        );
    }
    rollup
}

/// Sums the project-level equipment lines.
pub(crate) fn rollup_equipment(lines: &[RawEquipmentLine]) -> ElectricalRollup {
    let mut rollup = ElectricalRollup::default();
    for line in lines {
        rollup.add(
            line.connected_w,
            line.max_demand_factor,
            line.essential_demand_factor,
            line.fire_demand_factor,
        );
    }
    rollup
}

/// Accumulated raw water figures for one aggregation level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct WaterRollup {
    pub occupancy: f64,
    pub daily_lpd: f64,
    pub max_demand_lpd: f64,
}

impl WaterRollup {
    pub fn absorb(&mut self, other: &Self) {
        self.occupancy += other.occupancy;
        self.daily_lpd += other.daily_lpd;
        self.max_demand_lpd += other.max_demand_lpd;
    }
}

/// Sums one building's water lines. Mechanical lines carry no diversity;
/// their full daily figure enters max demand.
pub(crate) fn rollup_water(
    lines: &[RawWaterLine],
    mechanical: &[RawMechanicalLine],
) -> WaterRollup {
    let mut rollup = WaterRollup::default();
    for line in lines {
        let daily = line.daily_lpd();
        rollup.occupancy += line.occupancy;
        rollup.daily_lpd += daily;
        rollup.max_demand_lpd += daily * line.demand_factor;
    }
    for line in mechanical {
        rollup.daily_lpd += line.demand_lpd;
        rollup.max_demand_lpd += line.demand_lpd;
    }
    rollup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::UnitType;

    fn line(connected_w: f64, mdf: f64) -> RawElectricalLine {
        RawElectricalLine {
            unit_type: UnitType::Bhk2,
            count: 1,
            unit_w: connected_w,
            connected_w,
            max_demand_factor: mdf,
            essential_demand_factor: 0.0,
            fire_demand_factor: 0.0,
        }
    }

    #[test]
    fn rounding_happens_after_summation_not_before() {
        // ceil(10.2 + 10.3) = 21; rounding each line first would give 22.
        let lines = vec![line(10.2, 1.0), line(10.3, 1.0)];
        let rollup = rollup_electrical(&lines);
        assert_eq!(report_ceil(rollup.connected_w), 21);
    }

    #[test]
    fn per_line_factors_diversify_independently() {
        let lines = vec![line(100.0, 0.8), line(200.0, 0.5)];
        let rollup = rollup_electrical(&lines);
        assert!((rollup.connected_w - 300.0).abs() < 1e-9);
        assert!((rollup.max_demand_w - 180.0).abs() < 1e-9);
    }

    #[test]
    fn max_demand_never_exceeds_connected_for_unit_factors() {
        let lines = vec![line(123.4, 1.0), line(56.7, 0.93)];
        let rollup = rollup_electrical(&lines);
        assert!(rollup.max_demand_w <= rollup.connected_w);
    }

    #[test]
    fn mechanical_lines_enter_max_demand_undiversified() {
        use crate::report::MechanicalUse;

        let unit_lines = vec![RawWaterLine {
            unit_type: UnitType::Bhk2,
            count: 10,
            occupancy: 40.0,
            occupant_lpd: 5400.0,
            visitors: 0.0,
            visitor_lpd: 0.0,
            demand_factor: 0.9,
        }];
        let mech = vec![RawMechanicalLine {
            usage: MechanicalUse::PoolEvaporation,
            demand_lpd: 960.0,
        }];
        let rollup = rollup_water(&unit_lines, &mech);
        assert!((rollup.daily_lpd - 6360.0).abs() < 1e-9);
        assert!((rollup.max_demand_lpd - (5400.0 * 0.9 + 960.0)).abs() < 1e-9);
        assert!((rollup.occupancy - 40.0).abs() < 1e-9);
    }
}
