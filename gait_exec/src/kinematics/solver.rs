//! Closed-form inverse and iterative forward kinematics for one leg

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::JointAngles;
use log::{trace, warn};
use nalgebra::{Matrix2, Vector2};
use std::f64::consts::PI;
use util::maths::{deg_to_rad, rad_to_deg};

use super::{FkError, IkError, LegGeometry};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Joint angles the solver assumes before it has produced any solution.
pub const INITIAL_IK_DEG: (f64, f64) = (45.0, 135.0);

/// Maximum number of Newton-Raphson iterations in the forward solution.
const FK_MAX_ITERS: usize = 50;

/// Step size below which the forward solution is considered converged.
///
/// Units: millimeters
const FK_TOLERANCE_MM: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A leg solver that remembers its previous results.
///
/// The last good inverse solution is kept so that callers can explicitly choose to hold position
/// when a target is unreachable, and the last forward estimate seeds the next forward solve.
#[derive(Debug, Clone)]
pub struct LegSolver {
    geometry: LegGeometry,
    last_ik: JointAngles,
    last_fk_est: (f64, f64),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Solve the inverse kinematics for a foot at `(x, y)` in the leg's motor frame.
///
/// The foot, the two motor axes and the two elbow joints form two triangles sharing the base `d`.
/// The law of cosines is applied to each, giving the angle of each upper link measured from the
/// positive x axis.
pub fn solve_ik(geometry: &LegGeometry, x: f64, y: f64) -> Result<JointAngles, IkError> {
    let LegGeometry { d, l1, l2, l1p, l2p } = *geometry;

    // Distance from each motor to the foot
    let c1 = ((x - d).powi(2) + y.powi(2)).sqrt();
    let c2 = (x.powi(2) + y.powi(2)).sqrt();

    if c1 == 0.0 || c2 == 0.0 || d == 0.0 {
        return Err(IkError::Unreachable(x, y));
    }

    let acos = |arg: f64| -> Result<f64, IkError> {
        if (-1.0..=1.0).contains(&arg) {
            Ok(arg.acos())
        } else {
            Err(IkError::Unreachable(x, y))
        }
    };

    let a1 = acos((c1.powi(2) + d.powi(2) - c2.powi(2)) / (2.0 * c1 * d))?;
    let a2 = acos((c2.powi(2) + d.powi(2) - c1.powi(2)) / (2.0 * c2 * d))?;
    let b1 = acos((c1.powi(2) + l1.powi(2) - l2.powi(2)) / (2.0 * c1 * l1))?;
    let b2 = acos((c2.powi(2) + l1p.powi(2) - l2p.powi(2)) / (2.0 * c2 * l1p))?;

    Ok(JointAngles::new(rad_to_deg(PI - a1 - b1), rad_to_deg(a2 + b2)))
}

/// Solve the forward kinematics for the given joint angles, starting from `seed`.
///
/// The foot lies on a circle of radius `l2` around the q1 elbow and on a circle of radius `l2p`
/// around the q2 elbow. The intersection closest to the seed is found by Newton-Raphson.
pub fn solve_fk(
    geometry: &LegGeometry,
    angles: JointAngles,
    seed: (f64, f64),
) -> Result<(f64, f64), FkError> {
    let LegGeometry { d, l1, l2, l1p, l2p } = *geometry;

    let q1 = deg_to_rad(angles.q1_deg);
    let q2 = deg_to_rad(angles.q2_deg);

    // Elbow positions
    let xa = l1 * q1.cos() + d;
    let ya = l1 * q1.sin();
    let xb = l1p * q2.cos();
    let yb = l1p * q2.sin();

    let mut est = Vector2::new(seed.0, seed.1);

    for i in 0..FK_MAX_ITERS {
        let (x, y) = (est[0], est[1]);

        let f = Vector2::new(
            (x - xa).powi(2) + (y - ya).powi(2) - l2.powi(2),
            (x - xb).powi(2) + (y - yb).powi(2) - l2p.powi(2),
        );
        let jac = Matrix2::new(
            2.0 * (x - xa),
            2.0 * (y - ya),
            2.0 * (x - xb),
            2.0 * (y - yb),
        );

        let step = jac.try_inverse().ok_or(FkError::Singular)? * f;
        est -= step;

        if !(est[0].is_finite() && est[1].is_finite()) {
            return Err(FkError::Singular);
        }

        if step.norm() < FK_TOLERANCE_MM {
            trace!("FK converged after {} iterations", i + 1);
            return Ok((est[0], est[1]));
        }
    }

    Err(FkError::NotConverged(FK_MAX_ITERS))
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl LegSolver {
    pub fn new(geometry: LegGeometry) -> Self {
        Self {
            geometry,
            last_ik: JointAngles::new(INITIAL_IK_DEG.0, INITIAL_IK_DEG.1),
            last_fk_est: (geometry.mid_x(), geometry.l1 + geometry.l2),
        }
    }

    pub fn geometry(&self) -> &LegGeometry {
        &self.geometry
    }

    /// The most recent successful inverse solution.
    pub fn last_ik(&self) -> JointAngles {
        self.last_ik
    }

    /// Solve the inverse kinematics, remembering the solution on success.
    pub fn solve_ik(&mut self, x: f64, y: f64) -> Result<JointAngles, IkError> {
        let angles = solve_ik(&self.geometry, x, y)?;
        self.last_ik = angles;
        Ok(angles)
    }

    /// Solve the inverse kinematics, holding the previous solution if the target is unreachable.
    pub fn solve_ik_or_last(&mut self, x: f64, y: f64) -> JointAngles {
        match self.solve_ik(x, y) {
            Ok(a) => a,
            Err(e) => {
                warn!("{}, holding previous joint angles {:?}", e, self.last_ik);
                self.last_ik
            }
        }
    }

    /// Solve the forward kinematics seeded from the previous estimate.
    ///
    /// The estimate is only updated on success.
    pub fn solve_fk(&mut self, angles: JointAngles) -> Result<(f64, f64), FkError> {
        let pos = solve_fk(&self.geometry, angles, self.last_fk_est)?;
        self.last_fk_est = pos;
        Ok(pos)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ik_neutral() {
        let geom = LegGeometry::default();
        let (x, y) = geom.neutral_pose();

        assert_eq!((x, y), (9.75, 43.36));

        // The neutral pose is symmetric about the motor midpoint, so q1 + q2 = 180
        let a = solve_ik(&geom, x, y).unwrap();
        assert!((a.q1_deg - 39.422).abs() < 1e-3);
        assert!((a.q2_deg - 140.578).abs() < 1e-3);
        assert!((a.q1_deg + a.q2_deg - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_ik_unreachable() {
        let geom = LegGeometry::default();

        // Beyond full extension
        assert!(matches!(
            solve_ik(&geom, 9.75, 65.0),
            Err(IkError::Unreachable(_, _))
        ));
        // On a motor axis
        assert!(solve_ik(&geom, 0.0, 0.0).is_err());
        assert!(solve_ik(&geom, 19.5, 0.0).is_err());
    }

    #[test]
    fn test_ik_fk_roundtrip() {
        let geom = LegGeometry::default();
        let mut solver = LegSolver::new(geom);

        let targets = [
            (9.75, 43.36),
            (0.0, 30.0),
            (20.0, 50.0),
            (-10.0, 40.0),
            (30.0, 35.0),
            (9.75, 60.0),
            (9.75, 25.0),
        ];

        for (x, y) in targets.iter() {
            let angles = solver.solve_ik(*x, *y).unwrap();
            let (fx, fy) = solver.solve_fk(angles).unwrap();

            assert!((fx - x).abs() < 1e-6, "x: {} != {}", fx, x);
            assert!((fy - y).abs() < 1e-6, "y: {} != {}", fy, y);
        }
    }

    #[test]
    fn test_fk_failures() {
        let geom = LegGeometry::default();

        // With q1 at 0 the q1 elbow sits at (d + l1, 0), starting there leaves no gradient
        assert_eq!(
            solve_fk(&geom, JointAngles::new(0.0, 180.0), (44.5, 0.0)),
            Err(FkError::Singular)
        );

        // Short lower links can't bridge elbows pushed out to either side
        let short = LegGeometry {
            l2: 10.0,
            l2p: 10.0,
            ..geom
        };
        assert_eq!(
            solve_fk(&short, JointAngles::new(0.0, 180.0), (9.75, 5.0)),
            Err(FkError::NotConverged(FK_MAX_ITERS))
        );
    }

    #[test]
    fn test_solve_ik_or_last() {
        let mut solver = LegSolver::new(LegGeometry::default());

        assert_eq!(
            solver.solve_ik_or_last(9.75, 100.0),
            JointAngles::new(INITIAL_IK_DEG.0, INITIAL_IK_DEG.1)
        );

        let good = solver.solve_ik_or_last(9.75, 43.36);
        assert_eq!(solver.last_ik(), good);
        assert_eq!(solver.solve_ik_or_last(9.75, 100.0), good);
    }
}
