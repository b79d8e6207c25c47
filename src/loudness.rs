//! Equal-loudness contours, hearing thresholds and hearing-aid gain.
//!
//! The contour table is a simplified ISO 226:2003 set sampled on a fixed
//! frequency axis; audiometric thresholds convert from dB HL to dB SPL via
//! RETSPL constants, and the half-gain rule seeds a hearing-aid gain
//! prescription that can be applied back onto a contour.

use crate::error::{EchoLabError, Result};
use crate::math::interpolate;

/// Frequency axis shared by all contour rows, Hz.
pub const CONTOUR_FREQUENCIES: [f32; 11] = [
    20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 12000.0, 16000.0,
];

/// (phon level, dB SPL per frequency in [`CONTOUR_FREQUENCIES`]).
const CONTOURS: [(f32, [f32; 11]); 5] = [
    (
        20.0,
        [90.0, 65.0, 45.0, 30.0, 22.0, 20.0, 20.0, 25.0, 40.0, 60.0, 80.0],
    ),
    (
        40.0,
        [95.0, 70.0, 50.0, 35.0, 30.0, 40.0, 40.0, 45.0, 55.0, 70.0, 90.0],
    ),
    (
        60.0,
        [100.0, 75.0, 55.0, 40.0, 45.0, 60.0, 60.0, 60.0, 70.0, 80.0, 100.0],
    ),
    (
        80.0,
        [105.0, 80.0, 60.0, 45.0, 55.0, 80.0, 80.0, 75.0, 80.0, 90.0, 100.0],
    ),
    (
        90.0,
        [110.0, 85.0, 65.0, 50.0, 65.0, 90.0, 90.0, 85.0, 88.0, 95.0, 105.0],
    ),
];

/// RETSPL corrections (audiometric dB HL to dB SPL) per audiometric
/// frequency.
const RETSPL: [(f32, f32); 4] = [(500.0, 11.5), (1000.0, 7.0), (2000.0, 9.0), (4000.0, 10.5)];

/// Edges used when extending threshold and gain curves across the audible
/// band.
const EDGE_LOW_HZ: f32 = 20.0;
const EDGE_HIGH_HZ: f32 = 20000.0;

/// One (frequency, level) sample of a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub frequency_hz: f32,
    pub level_db: f32,
}

impl CurvePoint {
    pub fn new(frequency_hz: f32, level_db: f32) -> Self {
        Self {
            frequency_hz,
            level_db,
        }
    }
}

/// Equal-loudness contour at `phon`: the exact table row when available,
/// otherwise a linear interpolation between the bracketing rows, clamped to
/// the outermost rows outside the tabulated range.
pub fn contour_at(phon: f32) -> Vec<CurvePoint> {
    if let Some((_, row)) = CONTOURS.iter().find(|(level, _)| *level == phon) {
        return row_to_points(row);
    }

    let mut lower = &CONTOURS[0];
    let mut upper = &CONTOURS[CONTOURS.len() - 1];
    for entry in &CONTOURS {
        if entry.0 < phon {
            lower = entry;
        } else if entry.0 > phon {
            upper = entry;
            break;
        }
    }
    if lower.0 == upper.0 {
        return row_to_points(&lower.1);
    }

    CONTOUR_FREQUENCIES
        .iter()
        .enumerate()
        .map(|(i, &frequency_hz)| CurvePoint {
            frequency_hz,
            level_db: interpolate(phon, lower.0, lower.1[i], upper.0, upper.1[i]),
        })
        .collect()
}

fn row_to_points(row: &[f32; 11]) -> Vec<CurvePoint> {
    CONTOUR_FREQUENCIES
        .iter()
        .zip(row.iter())
        .map(|(&frequency_hz, &level_db)| CurvePoint {
            frequency_hz,
            level_db,
        })
        .collect()
}

fn retspl_for(frequency_hz: f32) -> Result<f32> {
    RETSPL
        .iter()
        .find(|(frequency, _)| *frequency == frequency_hz)
        .map(|(_, correction)| *correction)
        .ok_or_else(|| {
            EchoLabError::Configuration(format!(
                "no RETSPL constant for {} Hz; audiometric frequencies are 500/1000/2000/4000",
                frequency_hz
            ))
        })
}

/// Converts an audiogram of (frequency, dB HL) pairs into a dB SPL threshold
/// curve (`SPL = HL + RETSPL`), sorted by frequency and extended with flat
/// edge points at 20 Hz and 20 kHz.
pub fn hearing_threshold(audiogram: &[(f32, f32)]) -> Result<Vec<CurvePoint>> {
    if audiogram.is_empty() {
        return Ok(Vec::new());
    }
    let mut points = Vec::with_capacity(audiogram.len() + 2);
    for &(frequency_hz, db_hl) in audiogram {
        points.push(CurvePoint::new(frequency_hz, db_hl + retspl_for(frequency_hz)?));
    }
    points.sort_by(|a, b| a.frequency_hz.total_cmp(&b.frequency_hz));
    Ok(extend_edges(points))
}

fn extend_edges(mut points: Vec<CurvePoint>) -> Vec<CurvePoint> {
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        points.insert(0, CurvePoint::new(EDGE_LOW_HZ, first.level_db));
        points.push(CurvePoint::new(EDGE_HIGH_HZ, last.level_db));
    }
    points
}

/// The half-gain rule: prescribe half the hearing loss as gain.
pub fn half_gain_db(db_hl: f32) -> f32 {
    db_hl * 0.5
}

/// A hearing-aid gain curve over frequency, queried with piecewise-linear
/// interpolation and clamped at the edges.
#[derive(Debug, Clone, Default)]
pub struct GainProfile {
    points: Vec<CurvePoint>,
}

impl GainProfile {
    pub fn new(mut points: Vec<CurvePoint>) -> Self {
        points.sort_by(|a, b| a.frequency_hz.total_cmp(&b.frequency_hz));
        Self { points }
    }

    /// Seeds a profile from an audiogram via the half-gain rule.
    pub fn from_audiogram(audiogram: &[(f32, f32)]) -> Self {
        Self::new(
            audiogram
                .iter()
                .map(|&(frequency_hz, db_hl)| CurvePoint::new(frequency_hz, half_gain_db(db_hl)))
                .collect(),
        )
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// The profile extended with flat edge points, for rendering alongside
    /// threshold curves.
    pub fn curve(&self) -> Vec<CurvePoint> {
        extend_edges(self.points.clone())
    }

    /// Gain at `frequency_hz`: clamped outside the profiled range,
    /// piecewise-linear inside it. An empty profile contributes nothing.
    pub fn gain_at(&self, frequency_hz: f32) -> f32 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if frequency_hz <= first.frequency_hz {
            return first.level_db;
        }
        if frequency_hz >= last.frequency_hz {
            return last.level_db;
        }
        for pair in self.points.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            if frequency_hz >= lower.frequency_hz && frequency_hz <= upper.frequency_hz {
                return interpolate(
                    frequency_hz,
                    lower.frequency_hz,
                    lower.level_db,
                    upper.frequency_hz,
                    upper.level_db,
                );
            }
        }
        last.level_db
    }

    /// Applies the profile to a contour: `SPL_comp = SPL - gain`.
    pub fn compensate(&self, contour: &[CurvePoint]) -> Vec<CurvePoint> {
        contour
            .iter()
            .map(|point| {
                CurvePoint::new(
                    point.frequency_hz,
                    point.level_db - self.gain_at(point.frequency_hz),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_at(points: &[CurvePoint], frequency_hz: f32) -> f32 {
        points
            .iter()
            .find(|p| p.frequency_hz == frequency_hz)
            .expect("frequency present")
            .level_db
    }

    #[test]
    fn exact_rows_round_trip() {
        let contour = contour_at(40.0);
        assert_eq!(contour.len(), 11);
        assert_eq!(level_at(&contour, 1000.0), 40.0);
        assert_eq!(level_at(&contour, 20.0), 95.0);
        assert_eq!(level_at(&contour, 16000.0), 90.0);
    }

    #[test]
    fn intermediate_phon_interpolates() {
        let contour = contour_at(50.0);
        // midway between the 40 and 60 phon rows at every frequency
        assert_eq!(level_at(&contour, 1000.0), 50.0);
        assert_eq!(level_at(&contour, 500.0), 37.5);
        assert_eq!(level_at(&contour, 20.0), 97.5);
    }

    #[test]
    fn out_of_range_phon_clamps() {
        assert_eq!(contour_at(5.0), contour_at(20.0));
        assert_eq!(contour_at(120.0), contour_at(90.0));
    }

    #[test]
    fn thresholds_add_retspl_and_extend_edges() {
        let curve = hearing_threshold(&[(1000.0, 30.0), (500.0, 20.0)]).unwrap();
        // sorted, with 20 Hz and 20 kHz edge points cloned from the ends
        assert_eq!(curve.len(), 4);
        assert_eq!(curve[0], CurvePoint::new(20.0, 31.5));
        assert_eq!(curve[1], CurvePoint::new(500.0, 31.5));
        assert_eq!(curve[2], CurvePoint::new(1000.0, 37.0));
        assert_eq!(curve[3], CurvePoint::new(20000.0, 37.0));
    }

    #[test]
    fn unknown_audiometric_frequency_is_refused() {
        assert!(hearing_threshold(&[(300.0, 30.0)]).is_err());
        assert!(hearing_threshold(&[]).unwrap().is_empty());
    }

    #[test]
    fn half_gain_rule() {
        assert_eq!(half_gain_db(40.0), 20.0);
        let profile = GainProfile::from_audiogram(&[(1000.0, 40.0), (4000.0, 60.0)]);
        assert_eq!(profile.gain_at(1000.0), 20.0);
        assert_eq!(profile.gain_at(4000.0), 30.0);
    }

    #[test]
    fn gain_lookup_interpolates_and_clamps() {
        let profile = GainProfile::new(vec![
            CurvePoint::new(500.0, 10.0),
            CurvePoint::new(2000.0, 30.0),
        ]);
        assert_eq!(profile.gain_at(100.0), 10.0);
        assert_eq!(profile.gain_at(8000.0), 30.0);
        assert_eq!(profile.gain_at(1250.0), 20.0);
        assert_eq!(GainProfile::default().gain_at(1000.0), 0.0);
    }

    #[test]
    fn compensation_subtracts_gain_pointwise() {
        let profile = GainProfile::new(vec![CurvePoint::new(1000.0, 15.0)]);
        let compensated = profile.compensate(&contour_at(60.0));
        assert_eq!(level_at(&compensated, 1000.0), 45.0);
        // flat profile: every frequency gets the same 15 dB
        assert_eq!(level_at(&compensated, 20.0), 85.0);
    }
}
