use super::axis::Axis;
use super::table::StructuredPolar;
use super::table_errors::{TableError, TableResult};
use ndarray::Array3;
use tracing::debug;

/// Behaviour for flight conditions outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Hold the boundary value
    #[default]
    Clamp,
    /// Extend the edge segment
    Linear,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
}

impl PolarPoint {
    pub fn lift_to_drag(&self) -> f64 {
        self.lift_coefficient / self.drag_coefficient
    }
}

/// Lower/upper grid index and the weight of the upper one.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    lower: usize,
    upper: usize,
    t: f64,
}

/// Trilinear lookup of CL/CD on a structured polar.
#[derive(Debug, Clone)]
pub struct PolarInterpolator {
    table: StructuredPolar,
    extrapolation: Extrapolation,
}

impl PolarInterpolator {
    pub fn new(table: StructuredPolar) -> Self {
        Self::with_extrapolation(table, Extrapolation::default())
    }

    pub fn with_extrapolation(table: StructuredPolar, extrapolation: Extrapolation) -> Self {
        Self {
            table,
            extrapolation,
        }
    }

    pub fn table(&self) -> &StructuredPolar {
        &self.table
    }

    pub fn lookup(&self, altitude: f64, mach: f64, angle_of_attack: f64) -> TableResult<PolarPoint> {
        let brackets = [
            self.bracket(Axis::Altitude, altitude)?,
            self.bracket(Axis::Mach, mach)?,
            self.bracket(Axis::AngleOfAttack, angle_of_attack)?,
        ];

        Ok(PolarPoint {
            lift_coefficient: blend(self.table.lift(), &brackets),
            drag_coefficient: blend(self.table.drag(), &brackets),
        })
    }

    fn bracket(&self, axis: Axis, value: f64) -> TableResult<Bracket> {
        let breakpoints = self.table.axes().values(axis);
        let n = breakpoints.len();
        let (min, max) = (breakpoints[0], breakpoints[n - 1]);
        if !value.is_finite() {
            return Err(TableError::OutOfBounds { axis, value, min, max });
        }
        if n == 1 {
            // Constant along this axis
            return Ok(Bracket {
                lower: 0,
                upper: 0,
                t: 0.0,
            });
        }

        let mut value = value;
        if value < min || value > max {
            debug!(%axis, value, min, max, mode = ?self.extrapolation, "Polar lookup outside table");
            match self.extrapolation {
                Extrapolation::Error => {
                    return Err(TableError::OutOfBounds {
                        axis,
                        value,
                        min,
                        max,
                    })
                }
                Extrapolation::Clamp => value = value.clamp(min, max),
                Extrapolation::Linear => {}
            }
        }

        let lower = breakpoints
            .partition_point(|b| *b <= value)
            .saturating_sub(1)
            .min(n - 2);
        let t = (value - breakpoints[lower]) / (breakpoints[lower + 1] - breakpoints[lower]);

        Ok(Bracket {
            lower,
            upper: lower + 1,
            t,
        })
    }
}

fn blend(values: &Array3<f64>, brackets: &[Bracket; 3]) -> f64 {
    let [a, m, k] = brackets;
    let mut acc = 0.0;
    for (i, wa) in [(a.lower, 1.0 - a.t), (a.upper, a.t)] {
        for (j, wm) in [(m.lower, 1.0 - m.t), (m.upper, m.t)] {
            for (l, wk) in [(k.lower, 1.0 - k.t), (k.upper, k.t)] {
                acc += wa * wm * wk * values[[i, j, l]];
            }
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    // CL = 1e-5 h + M + 0.1 alpha, CD = 0.02 + 0.01 alpha: trilinear is exact
    fn linear_table() -> StructuredPolar {
        let altitude = vec![0.0, 10_000.0, 20_000.0];
        let mach = vec![0.3, 0.6, 0.8];
        let aoa = vec![-2.0, 0.0, 2.0, 4.0];
        let mut lift = Vec::new();
        let mut drag = Vec::new();
        for h in &altitude {
            for m in &mach {
                for a in &aoa {
                    lift.push(1e-5 * h + m + 0.1 * a);
                    drag.push(0.02 + 0.01 * a);
                }
            }
        }
        StructuredPolar::new(altitude, mach, aoa, lift, drag).unwrap()
    }

    #[test_case(0.0, 0.3, -2.0, 0.1; "grid corner")]
    #[test_case(15_000.0, 0.45, 1.0, 0.7; "interior point")]
    #[test_case(20_000.0, 0.8, 4.0, 1.4; "upper corner")]
    fn test_lookup_interior(altitude: f64, mach: f64, aoa: f64, expected_cl: f64) {
        let interp = PolarInterpolator::new(linear_table());
        let point = interp.lookup(altitude, mach, aoa).unwrap();
        assert_abs_diff_eq!(point.lift_coefficient, expected_cl, epsilon = 1e-12);
        assert_abs_diff_eq!(point.drag_coefficient, 0.02 + 0.01 * aoa, epsilon = 1e-12);
    }

    #[test]
    fn test_extrapolation_modes() {
        let clamp = PolarInterpolator::with_extrapolation(linear_table(), Extrapolation::Clamp);
        let linear = PolarInterpolator::with_extrapolation(linear_table(), Extrapolation::Linear);
        let strict = PolarInterpolator::with_extrapolation(linear_table(), Extrapolation::Error);

        let clamped = clamp.lookup(0.0, 0.3, 6.0).unwrap();
        assert_abs_diff_eq!(clamped.lift_coefficient, 0.7, epsilon = 1e-12);

        let extended = linear.lookup(0.0, 0.3, 6.0).unwrap();
        assert_abs_diff_eq!(extended.lift_coefficient, 0.9, epsilon = 1e-12);

        assert!(matches!(
            strict.lookup(0.0, 0.9, 0.0),
            Err(TableError::OutOfBounds { axis: Axis::Mach, .. })
        ));
    }

    #[test]
    fn test_single_point_axis() {
        let table = StructuredPolar::new(
            vec![0.0],
            vec![0.3, 0.6],
            vec![0.0, 4.0],
            vec![0.1, 0.5, 0.2, 0.6],
            vec![0.01, 0.03, 0.02, 0.04],
        )
        .unwrap();
        let interp = PolarInterpolator::with_extrapolation(table, Extrapolation::Error);

        let point = interp.lookup(35_000.0, 0.45, 2.0).unwrap();
        assert_abs_diff_eq!(point.lift_coefficient, 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(point.drag_coefficient, 0.025, epsilon = 1e-12);
    }

    #[test_case(Extrapolation::Clamp)]
    #[test_case(Extrapolation::Linear)]
    #[test_case(Extrapolation::Error)]
    fn test_non_finite_query_rejected(mode: Extrapolation) {
        let interp = PolarInterpolator::with_extrapolation(linear_table(), mode);
        assert!(matches!(
            interp.lookup(f64::NAN, 0.3, 0.0),
            Err(TableError::OutOfBounds { axis: Axis::Altitude, .. })
        ));
        assert!(matches!(
            interp.lookup(0.0, 0.3, f64::INFINITY),
            Err(TableError::OutOfBounds { axis: Axis::AngleOfAttack, .. })
        ));
    }
}
