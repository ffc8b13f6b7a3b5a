//! # Gait manager
//!
//! Owns the trajectory table of the loaded gait and plays the trajectory of the requested
//! direction back one frame per tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{
    eqpt::mech::JointFrame,
    tc::DirectionSymbol,
};
use log::{debug, info};

use super::{build_trajectory_table, GaitMgrError, GaitParams, GaitTable, TrajectoryTable};
use crate::kinematics::{LegGeometry, LegSolver};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gait manager state.
#[derive(Debug, Clone)]
pub struct GaitManager {
    solver: LegSolver,
    gaits: GaitTable,
    loaded: Option<LoadedGait>,
    state: MgrState,
    phase_index: usize,
}

/// A gait whose trajectories have been built.
#[derive(Debug, Clone)]
struct LoadedGait {
    name: String,
    params: GaitParams,
    table: TrajectoryTable,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether a trajectory is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MgrState {
    Idle,
    Moving {
        /// The direction the caller asked for.
        requested: DirectionSymbol,

        /// The direction whose trajectory is actually playing, which may be a fallback of the
        /// requested one.
        active: DirectionSymbol,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GaitManager {
    fn default() -> Self {
        Self::new(LegGeometry::default(), GaitTable::default())
    }
}

impl GaitManager {
    /// Create a new manager with no gait loaded.
    pub fn new(geometry: LegGeometry, gaits: GaitTable) -> Self {
        Self {
            solver: LegSolver::new(geometry),
            gaits,
            loaded: None,
            state: MgrState::Idle,
            phase_index: 0,
        }
    }

    /// Build the trajectories of the named gait and make it the active gait.
    ///
    /// On success the manager is left idle at phase 0. On failure the previously loaded gait, its
    /// trajectories and the current movement are all left untouched.
    pub fn load_gait(&mut self, name: &str) -> Result<(), GaitMgrError> {
        let params = *self
            .gaits
            .get(name)
            .ok_or_else(|| GaitMgrError::UnknownGait(name.to_string()))?;

        let table = build_trajectory_table(self.solver.geometry(), &params)
            .map_err(|e| GaitMgrError::GaitLoadFailed(name.to_string(), e))?;

        info!(
            "Loaded gait {} ({:?}, {} samples, {} directions)",
            name,
            params.kind,
            params.cycle_len(),
            table.len()
        );

        self.loaded = Some(LoadedGait {
            name: name.to_string(),
            params,
            table,
        });
        self.state = MgrState::Idle;
        self.phase_index = 0;

        Ok(())
    }

    /// Start moving in the given direction, or change direction if already moving.
    ///
    /// If the loaded gait doesn't support `direction` its fallbacks are tried in order. The phase
    /// index is kept so that changing direction mid-stride is continuous. Returns the direction
    /// whose trajectory will be played.
    pub fn start_movement(
        &mut self,
        direction: DirectionSymbol,
    ) -> Result<DirectionSymbol, GaitMgrError> {
        let loaded = self.loaded.as_ref().ok_or(GaitMgrError::NoGaitLoaded)?;

        let active = std::iter::once(&direction)
            .chain(direction.fallbacks().iter())
            .find(|d| loaded.table.contains_key(*d))
            .copied()
            .ok_or(GaitMgrError::DirectionUnsupported(direction))?;

        if active != direction {
            debug!("{} not available in {}, using {}", direction, loaded.name, active);
        }

        self.state = MgrState::Moving {
            requested: direction,
            active,
        };

        Ok(active)
    }

    /// Get the next frame of the active trajectory and advance the phase.
    pub fn tick(&mut self) -> Result<JointFrame, GaitMgrError> {
        let active = match self.state {
            MgrState::Moving { active, .. } => active,
            MgrState::Idle => return Err(GaitMgrError::NotMoving),
        };

        let traj = self
            .loaded
            .as_ref()
            .and_then(|l| l.table.get(&active))
            .filter(|t| !t.is_empty())
            .ok_or(GaitMgrError::DirectionUnsupported(active))?;

        let n = traj.len();
        let frame = traj[self.phase_index % n];
        self.phase_index = (self.phase_index + 1) % n;

        Ok(frame)
    }

    /// Stop moving and rewind the phase to the start of the cycle.
    pub fn stop(&mut self) {
        self.state = MgrState::Idle;
        self.phase_index = 0;
    }

    /// The frame holding every leg at the loaded gait's rest pose, or at the neutral pose if no
    /// gait is loaded.
    pub fn rest_frame(&mut self) -> JointFrame {
        let (x, y) = match self.loaded {
            Some(ref l) => l.params.rest_pose(),
            None => self.solver.geometry().neutral_pose(),
        };

        JointFrame::mirrored(self.solver.solve_ik_or_last(x, y))
    }

    /// The frame holding every leg at the neutral pose.
    pub fn neutral_frame(&mut self) -> JointFrame {
        let (x, y) = self.solver.geometry().neutral_pose();

        JointFrame::mirrored(self.solver.solve_ik_or_last(x, y))
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, MgrState::Moving { .. })
    }

    /// The most recently requested direction, if moving.
    pub fn current_direction(&self) -> Option<DirectionSymbol> {
        match self.state {
            MgrState::Moving { requested, .. } => Some(requested),
            MgrState::Idle => None,
        }
    }

    /// The direction whose trajectory is playing, if moving.
    pub fn active_direction(&self) -> Option<DirectionSymbol> {
        match self.state {
            MgrState::Moving { active, .. } => Some(active),
            MgrState::Idle => None,
        }
    }

    pub fn phase(&self) -> usize {
        self.phase_index
    }

    /// Name of the loaded gait.
    pub fn loaded_gait(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.name.as_str())
    }

    /// The gait after the loaded one in switching order.
    pub fn next_gait(&self) -> Option<String> {
        let current = self.loaded_gait().unwrap_or("");

        self.gaits.next_after(current).map(String::from)
    }

    #[cfg(test)]
    pub(crate) fn loaded_params(&self) -> Option<&GaitParams> {
        self.loaded.as_ref().map(|l| &l.params)
    }

    #[cfg(test)]
    pub(crate) fn trajectory_len(&self) -> Option<usize> {
        self.loaded.as_ref().map(|l| l.params.cycle_len())
    }

    /// Build a manager around a hand-made trajectory table.
    #[cfg(test)]
    pub(crate) fn with_table(name: &str, params: GaitParams, table: TrajectoryTable) -> Self {
        let mut mgr = Self::default();
        mgr.loaded = Some(LoadedGait {
            name: name.to_string(),
            params,
            table,
        });
        mgr
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
