//! Single-leg stride cycle generation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::JointAngles;
use log::debug;
use std::f64::consts::PI;
use util::maths::round_dp;

use super::{GaitParams, GenError, MIN_LIFT_HEIGHT_MM};
use crate::kinematics::{solve_ik, LegGeometry};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of times the ranges are shrunk before giving up.
const MAX_SHRINK_ATTEMPTS: usize = 1000;

/// Amount both ranges are shrunk by on each retry.
///
/// Units: millimeters
const SHRINK_STEP_MM: f64 = 1.0;

/// Number of decimal places the generated angles are rounded to, matching the controller's
/// command resolution.
const ANGLE_DECIMALS: i32 = 1;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate the joint angles for one full cycle of a single leg.
///
/// The foot sweeps `x_range * stride_scale` forwards along a half-sine arc `y_range_lift` high
/// during the `s1` lift samples, then back along a half-sine push `y_range_stance` deep during the
/// `s2` stance samples. A negative `stride_scale` walks the cycle backwards.
///
/// If any sample has no valid solution both ranges are shrunk by 1 mm and the cycle is tried
/// again, until either range reaches zero.
pub fn generate_leg_cycle(
    geometry: &LegGeometry,
    params: &GaitParams,
    stride_scale: f64,
) -> Result<Vec<JointAngles>, GenError> {
    if params.s1 == 0 || params.s2 == 0 {
        return Err(GenError::InvalidStepCounts {
            s1: params.s1,
            s2: params.s2,
        });
    }

    if params.y0 - params.y_range_lift < MIN_LIFT_HEIGHT_MM {
        return Err(GenError::BelowPhysicalLimit {
            y0: params.y0,
            y_range_lift: params.y_range_lift,
        });
    }

    let mut x_range = params.x_range;
    let mut y_range_lift = params.y_range_lift;

    for attempt in 0..MAX_SHRINK_ATTEMPTS {
        if let Some(cycle) = sample_cycle(geometry, params, x_range, y_range_lift, stride_scale) {
            if attempt > 0 {
                debug!(
                    "Leg cycle at stride scale {} needed {} shrinks (x_range = {}, y_range_lift = {})",
                    stride_scale, attempt, x_range, y_range_lift
                );
            }
            return Ok(cycle);
        }

        x_range -= SHRINK_STEP_MM;
        y_range_lift -= SHRINK_STEP_MM;

        if x_range <= 0.0 || y_range_lift <= 0.0 {
            break;
        }
    }

    Err(GenError::Infeasible(stride_scale))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample the cycle with the given ranges, or `None` if any sample has no valid solution.
///
/// `solve_ik` already keeps q1 within [-180, 180] and q2 within [0, 360] degrees, so a sample is
/// only rejected when the foot is out of reach or the solution isn't finite.
fn sample_cycle(
    geometry: &LegGeometry,
    params: &GaitParams,
    x_range: f64,
    y_range_lift: f64,
    stride_scale: f64,
) -> Option<Vec<JointAngles>> {
    let (s1, s2) = (params.s1, params.s2);
    let stride = x_range * stride_scale;

    let mut cycle = Vec::with_capacity(s1 + s2);
    let mut x = params.x0 - stride / 2.0;

    for i in 0..(s1 + s2) {
        let y = if i < s1 {
            x += stride / s1 as f64;
            params.y0 - ((i + 1) as f64 * PI / s1 as f64).sin() * y_range_lift
        } else {
            x -= stride / s2 as f64;
            params.y0 + ((i - s1 + 1) as f64 * PI / s2 as f64).sin() * params.y_range_stance
        };

        let angles = solve_ik(geometry, x, y)
            .ok()
            .filter(JointAngles::is_finite)?;

        cycle.push(JointAngles::new(
            round_dp(angles.q1_deg, ANGLE_DECIMALS),
            round_dp(angles.q2_deg, ANGLE_DECIMALS),
        ));
    }

    Some(cycle)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
