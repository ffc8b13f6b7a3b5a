//! # Data Store

use log::info;

use crate::gait_ctrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Set once something has asked the executable to stop
    pub exit: bool,

    // Actuation
    /// True while the motors are energised
    pub torque_on: bool,

    // GaitCtrl
    pub gait_ctrl: gait_ctrl::GaitCtrl,
    pub gait_ctrl_input: gait_ctrl::InputData,
    pub gait_ctrl_output: gait_ctrl::OutputData,
    pub gait_ctrl_status_rpt: gait_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the previous cycle's outputs and sets the 1Hz cycle flag. The GaitCtrl input is kept,
    /// a held input stays active until a new one arrives.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.gait_ctrl_output = gait_ctrl::OutputData::default();
        self.gait_ctrl_status_rpt = gait_ctrl::StatusReport::default();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    /// Ask the executable to stop at the end of this cycle.
    pub fn request_exit(&mut self, reason: &str) {
        if !self.exit {
            info!("Exit requested: {}", reason);
            self.exit = true;
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::{eqpt::mech::MechDems, tc::Tc};

    #[test]
    fn test_cycle_bookkeeping() {
        let mut ds = DataStore::default();
        ds.gait_ctrl_input.tc = Tc::Keys(vec![comms_if::tc::Key::W]);

        ds.cycle_start(2.0);
        assert!(ds.is_1_hz_cycle);
        ds.gait_ctrl_output.dems = Some(MechDems {
            frame: Default::default(),
            dur_ms: 0,
            record: false,
        });
        ds.cycle_end();

        ds.cycle_start(2.0);
        assert!(!ds.is_1_hz_cycle);
        assert_eq!(ds.gait_ctrl_output.dems, None);
        assert_eq!(ds.num_cycles, 1);
        assert_eq!(ds.gait_ctrl_input.tc, Tc::Keys(vec![comms_if::tc::Key::W]));
        ds.cycle_end();

        ds.cycle_start(2.0);
        assert!(ds.is_1_hz_cycle);

        ds.request_exit("test");
        assert!(ds.exit);
    }
}
