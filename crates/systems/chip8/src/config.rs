//! Machine configuration, loadable from JSON.
//!
//! ```json
//! { "machine": "xochip", "cycles_per_frame": 1000, "quirks": { "sprites_wrap": true } }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::Chip8SystemError;
use emu_core::cpu_chip8::{MachineProfile, Quirks};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CYCLES_PER_FRAME: u32 = 200;

/// Per-flag overrides applied on top of the machine preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuirkOverrides {
    pub shift_uses_vy: Option<bool>,
    pub load_store_increments_i: Option<bool>,
    pub clear_on_resolution_change: Option<bool>,
    pub sprites_wrap: Option<bool>,
}

impl QuirkOverrides {
    pub fn apply(&self, mut quirks: Quirks) -> Quirks {
        if let Some(flag) = self.shift_uses_vy {
            quirks.shift_uses_vy = flag;
        }
        if let Some(flag) = self.load_store_increments_i {
            quirks.load_store_increments_i = flag;
        }
        if let Some(flag) = self.clear_on_resolution_change {
            quirks.clear_on_resolution_change = flag;
        }
        if let Some(flag) = self.sprites_wrap {
            quirks.sprites_wrap = flag;
        }
        quirks
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chip8Config {
    pub machine: MachineProfile,
    /// Instructions executed per 60 Hz frame
    pub cycles_per_frame: u32,
    pub quirks: QuirkOverrides,
    /// Fixed RNG seed for reproducible CXNN results
    pub seed: Option<u64>,
}

impl Default for Chip8Config {
    fn default() -> Self {
        Self {
            machine: MachineProfile::default(),
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            quirks: QuirkOverrides::default(),
            seed: None,
        }
    }
}

impl Chip8Config {
    pub fn for_machine(machine: MachineProfile) -> Self {
        Self {
            machine,
            ..Self::default()
        }
    }

    /// Machine preset with any overrides applied
    pub fn effective_quirks(&self) -> Quirks {
        self.quirks.apply(self.machine.quirks())
    }

    pub fn validate(&self) -> Result<(), Chip8SystemError> {
        if self.cycles_per_frame == 0 {
            return Err(Chip8SystemError::InvalidConfig(
                "cycles_per_frame must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self, Chip8SystemError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Chip8SystemError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Chip8SystemError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
