//! Implementations for the GaitCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{GaitCtrlError, GaitManager, Params};
use crate::input::{self, Classified};
use comms_if::{
    eqpt::mech::{CtrlCmd, JointFrame, MechDems},
    tc::{Action, DirectionSymbol, Key, Tc},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Archive file for recorded frames, relative to the session archive root.
const FRAMES_ARCH_PATH: &str = "gait_ctrl/frames.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gait control module state
#[derive(Default)]
pub struct GaitCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    mgr: GaitManager,

    /// Set by a record request, cleared when the next movement finishes.
    record: bool,

    /// Keys pressed on the previous cycle, actions only fire on a new press.
    prev_keys: Vec<Key>,

    /// The frame to archive on the next `write`.
    pending_record: Option<FrameRecord>,
    arch_frames: Archiver,
}

/// Data required to initialise GaitCtrl.
#[derive(Debug, Clone)]
pub struct InitData {
    /// Path to the parameter file, relative to the params directory.
    pub params_path: String,

    /// Write recorded frames to the session archive.
    pub archive: bool,
}

/// Input data to Gait Control.
#[derive(Debug, Clone)]
pub struct InputData {
    /// The operator's current input. A held input should be passed on every cycle.
    pub tc: Tc,
}

/// Output of one Gait Control cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputData {
    /// Demands to send to the actuation side, `None` if the legs should not be moved.
    pub dems: Option<MechDems>,

    /// Requests for the collaborators outside gait control.
    pub requests: Vec<Request>,
}

/// Status report for GaitCtrl processing.
#[derive(Clone, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// True if a trajectory is playing at the end of the cycle.
    pub moving: bool,

    /// Name of the loaded gait.
    pub gait: Option<String>,

    /// The direction the operator asked for.
    pub requested: Option<DirectionSymbol>,

    /// The direction actually playing.
    pub active: Option<DirectionSymbol>,

    /// Phase index after this cycle's tick.
    pub phase: usize,

    /// The requested direction could not be played by the current gait.
    pub start_rejected: bool,

    /// A gait switch was requested but the next gait could not be built.
    pub gait_switch_failed: bool,

    /// The action handled this cycle.
    pub action: Option<Action>,

    /// The recording flag at the end of the cycle.
    pub recording: bool,
}

/// One row of the frames archive.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
struct FrameRecord {
    time_s: f64,
    phase: usize,
    dur_ms: u32,
    fl_q1_deg: f64,
    fl_q2_deg: f64,
    fr_q1_deg: f64,
    fr_q2_deg: f64,
    bl_q1_deg: f64,
    bl_q2_deg: f64,
    br_q1_deg: f64,
    br_q2_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Things gait control asks of the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Request {
    /// Run the greeting routine.
    Greet,

    /// Run the range-of-motion routine.
    ShowRange,

    /// Query the battery level.
    CheckBattery,

    /// Run the on-board jump routine.
    Jump,

    /// The recorded movement has finished.
    FinishRecording,

    /// Stop the executable.
    Exit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for InputData {
    fn default() -> Self {
        Self { tc: Tc::None }
    }
}

impl Request {
    /// The controller command that carries out this request, if the controller handles it
    /// directly.
    pub fn ctrl_cmd(&self) -> Option<CtrlCmd> {
        match self {
            Request::CheckBattery => Some(CtrlCmd::CheckBattery),
            Request::Jump => Some(CtrlCmd::Jump),
            _ => None,
        }
    }
}

impl FrameRecord {
    fn new(dems: &MechDems, phase: usize) -> Self {
        let [fl, fr, bl, br] = dems.frame.0;

        Self {
            time_s: session::get_elapsed_seconds(),
            phase,
            dur_ms: dems.dur_ms,
            fl_q1_deg: fl.q1_deg,
            fl_q2_deg: fl.q2_deg,
            fr_q1_deg: fr.q1_deg,
            fr_q2_deg: fr.q2_deg,
            bl_q1_deg: bl.q1_deg,
            bl_q2_deg: bl.q2_deg,
            br_q1_deg: br.q1_deg,
            br_q2_deg: br.q2_deg,
        }
    }
}

impl State for GaitCtrl {
    type InitData = InitData;
    type InitError = GaitCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = GaitCtrlError;

    /// Initialise the GaitCtrl module.
    ///
    /// Loads the parameters, builds the default gait and, if enabled, opens the frames archive.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params =
            params::load(&init_data.params_path).map_err(GaitCtrlError::ParamLoadError)?;

        *self = Self::with_params(params)?;

        if init_data.archive {
            session
                .arch_subdir("gait_ctrl")
                .map_err(|e| GaitCtrlError::ArchiveInitError(e.to_string()))?;

            self.arch_frames = Archiver::from_path(session, FRAMES_ARCH_PATH)
                .map_err(|e| GaitCtrlError::ArchiveInitError(e.to_string()))?;

            info!("GaitCtrl archiving frames to {}", FRAMES_ARCH_PATH);
        }

        Ok(())
    }

    /// Perform cyclic processing of Gait Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let classified =
            input::classify_tc(&input_data.tc, &self.params.classifier, self.params.joystick_mode);
        let action = self.new_action(&input_data.tc, &classified);

        let mut output = OutputData::default();

        if self.mgr.is_moving() {
            match classified.direction {
                Some(dir) => output.dems = self.step(dir)?,
                None => self.finish_movement(&mut output),
            }
        } else if let Some(dir) = classified.direction {
            output.dems = self.step(dir)?;
        } else if let Some(action) = action {
            self.handle_action(action, &mut output);
        }

        // Only moving frames are recorded
        self.pending_record = match output.dems {
            Some(ref d) if d.record && self.arch_frames.is_initialised() => {
                Some(FrameRecord::new(d, self.mgr.phase()))
            }
            _ => None,
        };

        self.report.moving = self.mgr.is_moving();
        self.report.gait = self.mgr.loaded_gait().map(String::from);
        self.report.requested = self.mgr.current_direction();
        self.report.active = self.mgr.active_direction();
        self.report.phase = self.mgr.phase();
        self.report.recording = self.record;

        trace!("GaitCtrl status: {:?}", self.report);

        Ok((output, self.report.clone()))
    }
}

impl Archived for GaitCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.pending_record.take() {
            Some(r) => self.arch_frames.serialise(r),
            None => Ok(()),
        }
    }
}

impl GaitCtrl {
    /// Create a module from already loaded parameters, with the default gait built.
    pub fn with_params(params: Params) -> Result<Self, GaitCtrlError> {
        let mut mgr = GaitManager::new(params.geometry, params.gaits.clone());

        mgr.load_gait(&params.default_gait)
            .map_err(GaitCtrlError::DefaultGaitError)?;

        info!(
            "GaitCtrl ready with gait {}, switching order: {}",
            params.default_gait,
            params.gaits.names().join(", ")
        );

        Ok(Self {
            params,
            mgr,
            ..Default::default()
        })
    }

    /// Read-only access to the gait manager.
    pub fn manager(&self) -> &GaitManager {
        &self.mgr
    }

    pub fn is_recording(&self) -> bool {
        self.record
    }

    /// Start (or keep) moving in `dir` and get the next frame.
    ///
    /// A direction the current gait can't play is ignored: no frame is sent and the manager's
    /// movement and phase are left as they were.
    fn step(&mut self, dir: DirectionSymbol) -> Result<Option<MechDems>, GaitCtrlError> {
        if let Err(e) = self.mgr.start_movement(dir) {
            warn!("{}", e);
            self.report.start_rejected = true;
            return Ok(None);
        }

        let frame = self.mgr.tick().map_err(GaitCtrlError::MgrError)?;

        Ok(Some(MechDems {
            frame,
            dur_ms: 0,
            record: self.record,
        }))
    }

    /// Return to the rest pose at the end of a movement.
    fn finish_movement(&mut self, output: &mut OutputData) {
        debug!("Movement finished, returning to rest");

        output.dems = Some(MechDems {
            frame: self.mgr.rest_frame(),
            dur_ms: 0,
            record: self.record,
        });
        output.requests.push(Request::FinishRecording);

        self.mgr.stop();
        self.record = false;
    }

    /// Handle one operator action while idle.
    fn handle_action(&mut self, action: Action, output: &mut OutputData) {
        info!("Action: {:?}", action);
        self.report.action = Some(action);

        match action {
            Action::Reset => {
                output.dems = Some(settled(self.mgr.rest_frame(), self.params.reset_dur_ms));
            }
            Action::Jump => {
                output.requests.push(Request::Jump);
                output.dems = Some(settled(self.mgr.neutral_frame(), self.params.reset_dur_ms));
            }
            Action::SwitchGait => self.switch_gait(output),
            Action::Battery => output.requests.push(Request::CheckBattery),
            Action::Record => {
                info!("Recording the next movement");
                self.record = true;
            }
            Action::ShowRange => output.requests.push(Request::ShowRange),
            Action::Greet => {
                output.requests.push(Request::Greet);
                output.dems = Some(settled(self.mgr.rest_frame(), self.params.reset_dur_ms));
            }
            Action::Exit => output.requests.push(Request::Exit),
        }
    }

    /// Load the next gait in table order, keeping the current one if it can't be built.
    fn switch_gait(&mut self, output: &mut OutputData) {
        let next = match self.mgr.next_gait() {
            Some(n) => n,
            None => {
                warn!("No gait to switch to");
                self.report.gait_switch_failed = true;
                return;
            }
        };

        match self.mgr.load_gait(&next) {
            Ok(()) => {
                info!("Switched to gait {}", next);
                output.dems = Some(settled(
                    self.mgr.rest_frame(),
                    self.params.switch_gait_dur_ms,
                ));
            }
            Err(e) => {
                warn!("{}", e);
                self.report.gait_switch_failed = true;
            }
        }
    }

    /// The highest priority action whose key was pressed this cycle.
    fn new_action(&mut self, tc: &Tc, classified: &Classified) -> Option<Action> {
        let keys = match tc {
            Tc::Keys(k) => k.clone(),
            _ => Vec::new(),
        };

        let fresh: Vec<Key> = keys
            .iter()
            .filter(|k| !self.prev_keys.contains(k))
            .copied()
            .collect();
        self.prev_keys = keys;

        let fresh_actions = input::actions_from_keys(&fresh);

        classified
            .actions
            .iter()
            .find(|a| fresh_actions.contains(a))
            .copied()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Demands that move to `frame` over `dur_ms` without recording.
fn settled(frame: JointFrame, dur_ms: u32) -> MechDems {
    MechDems {
        frame,
        dur_ms,
        record: false,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::gait_ctrl::{GaitTable, NamedGait};
    use comms_if::tc::TurnTier;

    fn ctrl() -> GaitCtrl {
        GaitCtrl::with_params(Params::default()).unwrap()
    }

    fn keys(k: &[Key]) -> InputData {
        InputData { tc: Tc::Keys(k.to_vec()) }
    }

    fn axes(horizontal: f64, vertical: f64) -> InputData {
        InputData {
            tc: Tc::Axes {
                horizontal,
                vertical,
            },
        }
    }

    #[test]
    fn test_start_same_cycle() {
        let mut gc = ctrl();

        let (out, rpt) = gc.proc(&axes(0.0, -1.0)).unwrap();

        assert!(rpt.moving);
        assert_eq!(rpt.requested, Some(DirectionSymbol::Forward));
        assert_eq!(rpt.phase, 1);
        assert_eq!(out.dems.map(|d| d.dur_ms), Some(0));
        assert!(out.requests.is_empty());
    }

    #[test]
    fn test_release_returns_to_rest() {
        let mut gc = ctrl();

        gc.proc(&axes(0.0, -1.0)).unwrap();
        gc.proc(&axes(0.0, -1.0)).unwrap();

        // Inside the deadzone counts as released
        let (out, rpt) = gc.proc(&axes(0.05, 0.0)).unwrap();

        assert!(!rpt.moving);
        assert_eq!(rpt.phase, 0);
        assert_eq!(out.requests, vec![Request::FinishRecording]);
        assert_eq!(
            out.dems.map(|d| d.frame),
            Some(gc.mgr.rest_frame())
        );

        // Nothing more while idle with no input
        let (out, _) = gc.proc(&InputData::default()).unwrap();
        assert_eq!(out, OutputData::default());
    }

    #[test]
    fn test_fallback_reported() {
        let mut params = Params::default();
        params.default_gait = "WALK".to_string();
        let mut gc = GaitCtrl::with_params(params).unwrap();

        let (_, rpt) = gc.proc(&axes(-0.9, -1.0)).unwrap();

        assert_eq!(
            rpt.requested,
            Some(DirectionSymbol::ForwardLeft(TurnTier::Half))
        );
        assert_eq!(rpt.active, Some(DirectionSymbol::Forward));
        assert!(!rpt.start_rejected);
    }

    #[test]
    fn test_rejected_direction_keeps_movement() {
        let mut params = Params::default();
        params.default_gait = "BOUND".to_string();
        let mut gc = GaitCtrl::with_params(params).unwrap();

        gc.proc(&keys(&[Key::Z])).unwrap();
        gc.proc(&keys(&[])).unwrap();
        for _ in 0..5 {
            gc.proc(&axes(0.0, -1.0)).unwrap();
        }

        // Bound can't turn on the spot
        let (out, rpt) = gc.proc(&axes(-1.0, 0.0)).unwrap();
        assert!(rpt.start_rejected);
        assert!(rpt.moving);
        assert_eq!(rpt.phase, 5);
        assert_eq!(rpt.requested, Some(DirectionSymbol::Forward));
        assert_eq!(out.dems, None);

        // Going forward again carries on from the same phase
        let (out, rpt) = gc.proc(&axes(0.0, -1.0)).unwrap();
        assert_eq!(rpt.phase, 6);
        assert_eq!(out.dems.map(|d| d.record), Some(true));

        // Releasing after a rejection still finishes the recorded movement
        gc.proc(&axes(-1.0, 0.0)).unwrap();
        let (out, rpt) = gc.proc(&axes(0.0, 0.0)).unwrap();
        assert!(!rpt.moving);
        assert!(!rpt.recording);
        assert_eq!(out.requests, vec![Request::FinishRecording]);
        assert_eq!(out.dems.map(|d| d.frame), Some(gc.mgr.rest_frame()));

        // The next movement starts from the beginning without recording
        let (out, rpt) = gc.proc(&axes(0.0, -1.0)).unwrap();
        assert_eq!(rpt.phase, 1);
        assert_eq!(out.dems.map(|d| d.record), Some(false));
    }

    #[test]
    fn test_rejected_direction_while_idle() {
        let mut params = Params::default();
        params.default_gait = "BOUND".to_string();
        let mut gc = GaitCtrl::with_params(params).unwrap();

        let (out, rpt) = gc.proc(&axes(1.0, 0.0)).unwrap();
        assert!(rpt.start_rejected);
        assert!(!rpt.moving);
        assert_eq!(rpt.phase, 0);
        assert_eq!(out, OutputData::default());
    }

    #[test]
    fn test_switch_gait() {
        let mut gc = ctrl();

        let (out, rpt) = gc.proc(&keys(&[Key::G])).unwrap();
        assert_eq!(rpt.gait.as_deref(), Some("TROT_HIGH"));
        assert_eq!(rpt.action, Some(Action::SwitchGait));
        assert_eq!(out.dems.map(|d| d.dur_ms), Some(500));

        // Holding the key doesn't switch again
        let (out, rpt) = gc.proc(&keys(&[Key::G])).unwrap();
        assert_eq!(rpt.gait.as_deref(), Some("TROT_HIGH"));
        assert_eq!(out, OutputData::default());

        // Release and press again
        gc.proc(&keys(&[])).unwrap();
        let (_, rpt) = gc.proc(&keys(&[Key::G])).unwrap();
        assert_eq!(rpt.gait.as_deref(), Some("TROT_LOW"));
    }

    #[test]
    fn test_failed_switch_keeps_gait() {
        let mut bad = GaitTable::default().0[0].clone();
        bad.name = "TOO_LOW".to_string();
        bad.params.y0 = 10.0;

        let mut params = Params::default();
        params.gaits = GaitTable(vec![GaitTable::default().0[0].clone(), bad]);
        let mut gc = GaitCtrl::with_params(params).unwrap();

        let (out, rpt) = gc.proc(&keys(&[Key::G])).unwrap();

        assert!(rpt.gait_switch_failed);
        assert_eq!(rpt.gait.as_deref(), Some("TROT"));
        assert_eq!(out.dems, None);
    }

    #[test]
    fn test_recording() {
        let mut gc = ctrl();

        let (out, rpt) = gc.proc(&keys(&[Key::Z])).unwrap();
        assert!(rpt.recording);
        assert_eq!(out.dems, None);

        let (out, _) = gc.proc(&keys(&[Key::Z, Key::W])).unwrap();
        assert_eq!(out.dems.map(|d| d.record), Some(true));

        let (out, rpt) = gc.proc(&keys(&[])).unwrap();
        assert!(!rpt.recording);
        assert!(!gc.is_recording());
        assert_eq!(out.requests, vec![Request::FinishRecording]);
    }

    #[test]
    fn test_actions_only_when_idle() {
        let mut gc = ctrl();

        // Moving and pressing exit together only moves
        let (out, rpt) = gc.proc(&keys(&[Key::W, Key::Escape])).unwrap();
        assert!(rpt.moving);
        assert!(out.requests.is_empty());

        // One action per cycle, highest priority first
        gc.proc(&keys(&[])).unwrap();
        let (out, rpt) = gc.proc(&keys(&[Key::Escape, Key::B])).unwrap();
        assert_eq!(rpt.action, Some(Action::Battery));
        assert_eq!(out.requests, vec![Request::CheckBattery]);
        assert_eq!(
            out.requests[0].ctrl_cmd(),
            Some(CtrlCmd::CheckBattery)
        );
    }

    #[test]
    fn test_routines() {
        let mut gc = ctrl();

        let (out, _) = gc.proc(&keys(&[Key::J])).unwrap();
        assert_eq!(out.requests, vec![Request::Jump]);
        assert_eq!(out.dems.map(|d| d.frame), Some(gc.mgr.neutral_frame()));

        gc.proc(&keys(&[])).unwrap();
        let (out, _) = gc.proc(&keys(&[Key::H])).unwrap();
        assert_eq!(out.requests, vec![Request::Greet]);
        assert_eq!(out.dems.map(|d| d.frame), Some(gc.mgr.rest_frame()));

        gc.proc(&keys(&[])).unwrap();
        let (out, _) = gc.proc(&keys(&[Key::C])).unwrap();
        assert_eq!(out.requests, vec![Request::ShowRange]);
        assert_eq!(out.dems, None);
        assert_eq!(Request::ShowRange.ctrl_cmd(), None);

        gc.proc(&keys(&[])).unwrap();
        let (out, _) = gc.proc(&keys(&[Key::R])).unwrap();
        assert_eq!(out.dems.map(|d| d.dur_ms), Some(500));
    }

    #[test]
    fn test_unknown_default_gait() {
        let mut params = Params::default();
        params.default_gait = "GALLOP".to_string();

        assert!(matches!(
            GaitCtrl::with_params(params),
            Err(GaitCtrlError::DefaultGaitError(_))
        ));

        // A table with a single gait switches to itself
        let mut params = Params::default();
        params.gaits = GaitTable(vec![NamedGait {
            name: "TROT".to_string(),
            params: GaitTable::default().0[0].params,
        }]);
        let mut gc = GaitCtrl::with_params(params).unwrap();
        let (_, rpt) = gc.proc(&keys(&[Key::G])).unwrap();
        assert_eq!(rpt.gait.as_deref(), Some("TROT"));
        assert!(!rpt.gait_switch_failed);
    }

    #[test]
    fn test_write_without_archive() {
        let mut gc = ctrl();

        gc.proc(&keys(&[Key::Z])).unwrap();
        gc.proc(&keys(&[Key::W])).unwrap();

        // No archive was opened so nothing is pending
        assert!(gc.pending_record.is_none());
        assert!(gc.write().is_ok());
    }
}
