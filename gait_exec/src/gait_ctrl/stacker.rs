//! # Gait stacker
//!
//! Combines single-leg cycles into whole-robot trajectories. Each pattern is described by a
//! layout: for every supported direction, which cycle each leg plays and how far that cycle is
//! phase shifted. The stacker generates the cycles a layout needs, then assembles one trajectory
//! per direction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{
    eqpt::mech::{JointAngles, JointFrame, NUM_LEGS},
    tc::{DirectionSymbol, TurnTier},
};
use log::debug;
use std::collections::BTreeMap;

use super::{generate_leg_cycle, GaitParams, GenError, PatternKind};
use crate::kinematics::LegGeometry;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A whole-robot trajectory: one frame per sample of the gait cycle.
pub type Trajectory = Vec<JointFrame>;

/// The trajectories of one gait, keyed by direction.
pub type TrajectoryTable = BTreeMap<DirectionSymbol, Trajectory>;

/// Single-leg cycles keyed by stride direction and stride reduction.
pub type CycleBank = BTreeMap<(Stride, TurnTier), Vec<JointAngles>>;

/// Which cycle one leg plays within a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegSource {
    /// Direction the foot sweeps during stance.
    pub stride: Stride,

    /// Stride reduction, `Full` for an unreduced stride.
    pub tier: TurnTier,

    /// Number of phase units this leg's cycle is rotated by.
    pub phase: usize,
}

/// One entry of a pattern layout: a direction and the leg sources in frame order.
pub type LayoutEntry = (DirectionSymbol, [LegSource; NUM_LEGS]);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The sign of a stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stride {
    Forward,
    Backward,
}

// ---------------------------------------------------------------------------
// LAYOUTS
// ---------------------------------------------------------------------------

const fn src(stride: Stride, tier: TurnTier, phase: usize) -> LegSource {
    LegSource {
        stride,
        tier,
        phase,
    }
}

// Shorthands used by the layouts below. `P`/`N` prefixes are forward/backward cycles shifted by
// one phase unit, the numeric suffix is the stride percentage.
const F: LegSource = src(Stride::Forward, TurnTier::Full, 0);
const F75: LegSource = src(Stride::Forward, TurnTier::ThreeQuarter, 0);
const F50: LegSource = src(Stride::Forward, TurnTier::Half, 0);
const PF: LegSource = src(Stride::Forward, TurnTier::Full, 1);
const PF75: LegSource = src(Stride::Forward, TurnTier::ThreeQuarter, 1);
const PF50: LegSource = src(Stride::Forward, TurnTier::Half, 1);
const B: LegSource = src(Stride::Backward, TurnTier::Full, 0);
const B75: LegSource = src(Stride::Backward, TurnTier::ThreeQuarter, 0);
const B50: LegSource = src(Stride::Backward, TurnTier::Half, 0);
const NB: LegSource = src(Stride::Backward, TurnTier::Full, 1);
const NB75: LegSource = src(Stride::Backward, TurnTier::ThreeQuarter, 1);
const NB50: LegSource = src(Stride::Backward, TurnTier::Half, 1);

/// Trot: FL+BR and FR+BL move together, half a cycle apart. Turns shorten the inside pair's
/// stride, spins reverse one side.
const TROT_LAYOUT: &[LayoutEntry] = {
    use DirectionSymbol::*;
    use TurnTier::*;

    &[
        (Forward, [F, PF, PF, F]),
        (Backward, [B, NB, NB, B]),
        (Left, [B, PF, NB, F]),
        (Right, [F, NB, PF, B]),
        (ForwardLeft(ThreeQuarter), [F75, PF, PF75, F]),
        (ForwardLeft(Half), [F50, PF, PF50, F]),
        (ForwardRight(ThreeQuarter), [F, PF75, PF, F75]),
        (ForwardRight(Half), [F, PF50, PF, F50]),
        (BackwardLeft(ThreeQuarter), [B75, NB, NB75, B]),
        (BackwardLeft(Half), [B50, NB, NB50, B]),
        (BackwardRight(ThreeQuarter), [B, NB75, NB, B75]),
        (BackwardRight(Half), [B, NB50, NB, B50]),
    ]
};

/// Walk: each leg a quarter cycle behind the one before it, FL, FR, BL, BR.
const WALK_LAYOUT: &[LayoutEntry] = {
    use DirectionSymbol::*;
    use Stride::Backward as Bwd;
    use Stride::Forward as Fwd;
    use TurnTier::Full;

    &[
        (
            Forward,
            [src(Fwd, Full, 0), src(Fwd, Full, 1), src(Fwd, Full, 2), src(Fwd, Full, 3)],
        ),
        (
            Backward,
            [src(Bwd, Full, 0), src(Bwd, Full, 1), src(Bwd, Full, 2), src(Bwd, Full, 3)],
        ),
        (
            Left,
            [src(Bwd, Full, 0), src(Fwd, Full, 1), src(Bwd, Full, 2), src(Fwd, Full, 3)],
        ),
        (
            Right,
            [src(Fwd, Full, 0), src(Bwd, Full, 1), src(Fwd, Full, 2), src(Bwd, Full, 3)],
        ),
    ]
};

/// Bound: the front pair together, the back pair a quarter cycle later.
const BOUND_LAYOUT: &[LayoutEntry] = &[
    (DirectionSymbol::Forward, [F, F, PF, PF]),
    (DirectionSymbol::Backward, [B, B, NB, NB]),
];

/// Pronk: all four legs together.
const PRONK_LAYOUT: &[LayoutEntry] = &[
    (DirectionSymbol::Forward, [F, F, F, F]),
    (DirectionSymbol::Backward, [B, B, B, B]),
];

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the trajectory of every direction supported by the gait.
///
/// Either every trajectory is built or an error is returned, a table is never partially filled.
pub fn build_trajectory_table(
    geometry: &LegGeometry,
    params: &GaitParams,
) -> Result<TrajectoryTable, GenError> {
    let layout = layout(params.kind);
    let bank = build_cycle_bank(geometry, params, layout)?;

    debug!(
        "Generated {} leg cycles for a {:?} gait of length {}",
        bank.len(),
        params.kind,
        params.cycle_len()
    );

    stack(layout, &bank, phase_unit(params.kind, params.cycle_len()))
}

/// The directions a pattern supports, with the leg sources of each.
pub fn layout(kind: PatternKind) -> &'static [LayoutEntry] {
    match kind {
        PatternKind::Trot => TROT_LAYOUT,
        PatternKind::Walk => WALK_LAYOUT,
        PatternKind::Bound => BOUND_LAYOUT,
        PatternKind::Pronk => PRONK_LAYOUT,
    }
}

/// Number of samples in one phase unit of the pattern, for a cycle of `n` samples.
pub fn phase_unit(kind: PatternKind, n: usize) -> usize {
    match kind {
        PatternKind::Trot => n / 2,
        PatternKind::Walk | PatternKind::Bound => n / 4,
        PatternKind::Pronk => 0,
    }
}

/// Generate every single-leg cycle the layout refers to.
pub fn build_cycle_bank(
    geometry: &LegGeometry,
    params: &GaitParams,
    layout: &[LayoutEntry],
) -> Result<CycleBank, GenError> {
    let mut bank = CycleBank::new();

    for (_, sources) in layout.iter() {
        for s in sources.iter() {
            let key = (s.stride, s.tier);

            if !bank.contains_key(&key) {
                let scale = match s.stride {
                    Stride::Forward => s.tier.stride_scale(),
                    Stride::Backward => -s.tier.stride_scale(),
                };
                bank.insert(key, generate_leg_cycle(geometry, params, scale)?);
            }
        }
    }

    Ok(bank)
}

/// Assemble the trajectories of a layout from a bank of cycles.
///
/// The bank must hold every cycle the layout refers to.
pub fn stack(
    layout: &[LayoutEntry],
    bank: &CycleBank,
    unit: usize,
) -> Result<TrajectoryTable, GenError> {
    let mut table = TrajectoryTable::new();

    for (dir, sources) in layout.iter() {
        let mut legs: Vec<Vec<JointAngles>> = Vec::with_capacity(NUM_LEGS);

        for s in sources.iter() {
            let cycle = bank
                .get(&(s.stride, s.tier))
                .ok_or(GenError::MissingCycle(*dir, s.stride, s.tier))?;
            legs.push(phase_shift(cycle, (s.phase * unit) as isize));
        }

        let n = legs.iter().map(|l| l.len()).min().unwrap_or(0);

        let traj: Trajectory = (0..n)
            .map(|i| JointFrame([legs[0][i], legs[1][i], legs[2][i], legs[3][i]]))
            .collect();

        table.insert(*dir, traj);
    }

    Ok(table)
}

/// Rotate a cycle left by `k` samples, so that the sample at index `k` comes first.
///
/// `k` is taken modulo the cycle length, negative values rotate right.
pub fn phase_shift<T: Clone>(cycle: &[T], k: isize) -> Vec<T> {
    if cycle.is_empty() {
        return Vec::new();
    }

    let k = k.rem_euclid(cycle.len() as isize) as usize;

    let mut shifted = Vec::with_capacity(cycle.len());
    shifted.extend_from_slice(&cycle[k..]);
    shifted.extend_from_slice(&cycle[..k]);
    shifted
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::gait_ctrl::GaitTable;

    /// Swap the forward and backward cycles of a bank.
    fn reverse_bank(bank: &CycleBank) -> CycleBank {
        bank.iter()
            .map(|((stride, tier), cycle)| {
                let reversed = match stride {
                    Stride::Forward => Stride::Backward,
                    Stride::Backward => Stride::Forward,
                };
                ((reversed, *tier), cycle.clone())
            })
            .collect()
    }

    #[test]
    fn test_phase_shift() {
        let seq: Vec<usize> = (0..7).collect();

        assert_eq!(phase_shift(&seq, 2), vec![2, 3, 4, 5, 6, 0, 1]);
        assert_eq!(phase_shift(&seq, 9), phase_shift(&seq, 2));
        assert_eq!(phase_shift(&seq, -2), vec![5, 6, 0, 1, 2, 3, 4]);
        assert_eq!(phase_shift(&seq, 0), seq);
        assert!(phase_shift::<usize>(&[], 3).is_empty());

        for k in 0..7isize {
            assert_eq!(phase_shift(&phase_shift(&seq, k), 7 - k), seq);
            assert_eq!(phase_shift(&phase_shift(&seq, k), -k), seq);
        }
    }

    #[test]
    fn test_supported_directions() {
        use DirectionSymbol::*;

        let geom = LegGeometry::default();
        let gaits = GaitTable::default();

        let keys = |name: &str| -> Vec<DirectionSymbol> {
            let params = gaits.get(name).unwrap();
            build_trajectory_table(&geom, params)
                .unwrap()
                .keys()
                .copied()
                .collect()
        };

        assert_eq!(keys("TROT").len(), 12);
        assert_eq!(keys("WALK"), vec![Forward, Backward, Left, Right]);
        assert_eq!(keys("BOUND"), vec![Forward, Backward]);
        assert_eq!(keys("PRONK"), vec![Forward, Backward]);
    }

    #[test]
    fn test_trajectory_lengths() {
        let geom = LegGeometry::default();

        for gait in GaitTable::default().0.iter() {
            let table = build_trajectory_table(&geom, &gait.params).unwrap();

            for (dir, traj) in table.iter() {
                assert_eq!(traj.len(), gait.params.cycle_len(), "{} {}", gait.name, dir);
            }
        }
    }

    #[test]
    fn test_trot_diagonals() {
        use comms_if::eqpt::mech::LegId;

        let geom = LegGeometry::default();
        let gaits = GaitTable::default();
        let params = gaits.get("TROT").unwrap();
        let table = build_trajectory_table(&geom, params).unwrap();
        let fwd = &table[&DirectionSymbol::Forward];

        let n = fwd.len();
        let half = phase_unit(PatternKind::Trot, n);
        assert_eq!(half, 22);

        for i in 0..n {
            // Diagonal pairs are in phase
            assert_eq!(fwd[i].leg(LegId::FrontLeft), fwd[i].leg(LegId::BackRight));
            assert_eq!(fwd[i].leg(LegId::FrontRight), fwd[i].leg(LegId::BackLeft));

            // The pairs are half a cycle apart
            assert_eq!(
                fwd[i].leg(LegId::FrontRight),
                fwd[(i + half) % n].leg(LegId::FrontLeft)
            );
        }
    }

    #[test]
    fn test_trot_reversal_symmetry() {
        use DirectionSymbol::*;
        use TurnTier::*;

        let geom = LegGeometry::default();
        let gaits = GaitTable::default();
        let params = gaits.get("TROT").unwrap();
        let unit = phase_unit(PatternKind::Trot, params.cycle_len());

        let bank = build_cycle_bank(&geom, params, TROT_LAYOUT).unwrap();
        let table = stack(TROT_LAYOUT, &bank, unit).unwrap();
        let swapped = stack(TROT_LAYOUT, &reverse_bank(&bank), unit).unwrap();

        let pairs = [
            (Forward, Backward),
            (Left, Right),
            (ForwardLeft(ThreeQuarter), BackwardLeft(ThreeQuarter)),
            (ForwardLeft(Half), BackwardLeft(Half)),
            (ForwardRight(ThreeQuarter), BackwardRight(ThreeQuarter)),
            (ForwardRight(Half), BackwardRight(Half)),
        ];

        for (a, b) in pairs.iter() {
            assert_eq!(swapped[a], table[b], "{} <-> {}", a, b);
            assert_eq!(swapped[b], table[a], "{} <-> {}", b, a);
        }
    }

    #[test]
    fn test_walk_quarters() {
        use comms_if::eqpt::mech::LegId;

        let geom = LegGeometry::default();
        let gaits = GaitTable::default();
        let params = gaits.get("WALK").unwrap();
        let table = build_trajectory_table(&geom, params).unwrap();
        let fwd = &table[&DirectionSymbol::Forward];
        let n = fwd.len();
        let quarter = n / 4;

        for i in 0..n {
            assert_eq!(
                fwd[i].leg(LegId::FrontRight),
                fwd[(i + quarter) % n].leg(LegId::FrontLeft)
            );
            assert_eq!(
                fwd[i].leg(LegId::BackRight),
                fwd[(i + 3 * quarter) % n].leg(LegId::FrontLeft)
            );
        }
    }

    #[test]
    fn test_build_failure() {
        let geom = LegGeometry::default();
        let mut params = *GaitTable::default().get("TROT").unwrap();
        params.y0 = 20.0;

        assert!(matches!(
            build_trajectory_table(&geom, &params),
            Err(GenError::BelowPhysicalLimit { .. })
        ));

        // A bank without the reduced strides can't make the turning trajectories
        let params = GaitTable::default().get("TROT").copied().unwrap();
        let mut bank = build_cycle_bank(&geom, &params, TROT_LAYOUT).unwrap();
        bank.retain(|(_, tier), _| *tier == TurnTier::Full);

        assert!(matches!(
            stack(TROT_LAYOUT, &bank, phase_unit(PatternKind::Trot, params.cycle_len())),
            Err(GenError::MissingCycle(_, _, TurnTier::ThreeQuarter))
        ));
    }
}
