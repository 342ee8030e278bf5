//! Power-board peripherals: the 12V/5V `Output` switches, the start
//! `Button`, and the `Buzzer`. Grounded on
//! `original_source/.../devices/power.py`'s `Output`/`BaseButton`/
//! `NullButton`/`BaseBuzzer`/`NullBuzzer`.

use crate::physics_host::{DeviceHandle, PhysicsHost};

/// A single power-board output switch. `current_handle` mirrors the
/// original's optional `downstream_current` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    enabled: bool,
    current_handle: Option<DeviceHandle>,
}

impl Output {
    pub fn new(current_handle: Option<DeviceHandle>) -> Self {
        Self { enabled: false, current_handle }
    }

    pub fn set_output(&mut self, enable: bool) {
        self.enabled = enable;
    }

    pub fn get_output(&self) -> bool {
        self.enabled
    }

    pub fn get_current(&self, host: &dyn PhysicsHost) -> i32 {
        match self.current_handle {
            Some(handle) => host.device_get_value(handle) as i32,
            None => 0,
        }
    }
}

/// The start button: `pressed` is derived live from the robot's `customData`
/// field equalling `"start"` (spec.md §3), not a stored/settable value like
/// the original's always-true `NullButton`.
#[derive(Debug, Clone)]
pub enum Button {
    /// No robot node wired up (e.g. a standalone board-engine test):
    /// always pressed, matching `original_source`'s `NullButton`.
    Null,
    Real { node_def: String },
}

impl Button {
    pub fn get_state(&self, host: &dyn PhysicsHost) -> bool {
        match self {
            Button::Null => true,
            Button::Real { node_def } => {
                host.custom_data_get(node_def).as_deref() == Some("start")
            }
        }
    }
}

/// The piezo buzzer. The original only ever instantiates `NullBuzzer`
/// (there is no physics-coupled buzzer implementation to port), so this is
/// a plain value type rather than a Null/Real enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buzzer {
    frequency: u16,
    duration: u32,
}

impl Buzzer {
    pub fn set_note(&mut self, freq: u16, dur: u32) {
        self.frequency = freq;
        self.duration = dur;
    }

    pub fn get_note(&self) -> (u16, u32) {
        (self.frequency, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_host::MockPhysicsHost;

    #[test]
    fn output_defaults_off() {
        let output = Output::new(None);
        assert!(!output.get_output());
    }

    #[test]
    fn button_null_always_pressed() {
        let host = MockPhysicsHost::new(32);
        assert!(Button::Null.get_state(&host));
    }

    #[test]
    fn button_real_follows_custom_data() {
        let mut host = MockPhysicsHost::new(32);
        let button = Button::Real { node_def: "ROBOT0".to_string() };
        assert!(!button.get_state(&host));
        host.custom_data_set("ROBOT0", "start");
        assert!(button.get_state(&host));
    }

    #[test]
    fn buzzer_note_roundtrip() {
        let mut buzzer = Buzzer::default();
        buzzer.set_note(440, 100);
        assert_eq!(buzzer.get_note(), (440, 100));
    }
}
