//! Behaviour variants across the CHIP-8 interpreter lineages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opcode behaviours that differ between interpreter lineages.
///
/// Each flag describes what happens when it is `true`. The set is chosen once
/// per session, normally from a [`MachineProfile`] preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quirks {
    /// `8XY6`/`8XYE` shift VY into VX (COSMAC VIP). When false, VX is shifted in place.
    pub shift_uses_vy: bool,
    /// `FX55`/`FX65` leave I advanced by X+1. When false, I is untouched.
    pub load_store_increments_i: bool,
    /// `00FE`/`00FF` clear both bitplanes.
    pub clear_on_resolution_change: bool,
    /// Sprite pixels past a plane edge wrap to the opposite edge instead of being clipped.
    pub sprites_wrap: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        MachineProfile::Chip8.quirks()
    }
}

/// Named machine presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineProfile {
    /// Original COSMAC VIP CHIP-8
    #[default]
    Chip8,
    /// SUPER-CHIP 1.1
    #[serde(alias = "schip")]
    SuperChip,
    /// XO-CHIP (Octo)
    XoChip,
    /// XO-CHIP with SUPER-CHIP load/store, needed by the "Skyward" program
    Skyward,
}

impl MachineProfile {
    pub const ALL: [MachineProfile; 4] = [
        MachineProfile::Chip8,
        MachineProfile::SuperChip,
        MachineProfile::XoChip,
        MachineProfile::Skyward,
    ];

    /// Quirk preset for this machine
    pub fn quirks(self) -> Quirks {
        match self {
            MachineProfile::Chip8 => Quirks {
                shift_uses_vy: true,
                load_store_increments_i: true,
                clear_on_resolution_change: true,
                sprites_wrap: true,
            },
            MachineProfile::SuperChip => Quirks {
                shift_uses_vy: false,
                load_store_increments_i: false,
                clear_on_resolution_change: true,
                sprites_wrap: true,
            },
            MachineProfile::XoChip => Quirks {
                shift_uses_vy: true,
                load_store_increments_i: true,
                clear_on_resolution_change: false,
                sprites_wrap: false,
            },
            MachineProfile::Skyward => Quirks {
                shift_uses_vy: true,
                load_store_increments_i: false,
                clear_on_resolution_change: false,
                sprites_wrap: false,
            },
        }
    }

    /// XO-CHIP machines composite both planes into four colours; the older
    /// machines show any lit pixel in the foreground colour.
    pub fn full_color(self) -> bool {
        matches!(self, MachineProfile::XoChip | MachineProfile::Skyward)
    }

    /// Parse a machine name; "auto" selects the original CHIP-8.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" | "chip8" | "chip-8" => Some(MachineProfile::Chip8),
            "schip" | "superchip" | "super-chip" => Some(MachineProfile::SuperChip),
            "xochip" | "xo-chip" => Some(MachineProfile::XoChip),
            "skyward" => Some(MachineProfile::Skyward),
            _ => None,
        }
    }
}

impl fmt::Display for MachineProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MachineProfile::Chip8 => "CHIP-8",
            MachineProfile::SuperChip => "SUPER-CHIP",
            MachineProfile::XoChip => "XO-CHIP",
            MachineProfile::Skyward => "XO-CHIP (Skyward)",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quirks_are_chip8() {
        assert_eq!(Quirks::default(), MachineProfile::Chip8.quirks());
        assert_eq!(MachineProfile::default(), MachineProfile::Chip8);
    }

    #[test]
    fn test_superchip_shifts_in_place_and_keeps_i() {
        let q = MachineProfile::SuperChip.quirks();
        assert!(!q.shift_uses_vy);
        assert!(!q.load_store_increments_i);
        assert!(q.sprites_wrap);
    }

    #[test]
    fn test_xochip_clips_and_preserves_framebuffer() {
        let q = MachineProfile::XoChip.quirks();
        assert!(!q.sprites_wrap);
        assert!(!q.clear_on_resolution_change);
        assert!(q.load_store_increments_i);

        let sky = MachineProfile::Skyward.quirks();
        assert!(!sky.load_store_increments_i);
        assert!(!sky.sprites_wrap);
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(MachineProfile::from_str("AUTO"), Some(MachineProfile::Chip8));
        assert_eq!(MachineProfile::from_str("schip"), Some(MachineProfile::SuperChip));
        assert_eq!(MachineProfile::from_str("XOCHIP"), Some(MachineProfile::XoChip));
        assert_eq!(MachineProfile::from_str("skyward"), Some(MachineProfile::Skyward));
        assert_eq!(MachineProfile::from_str("megachip"), None);
    }

    #[test]
    fn test_full_color_only_on_xochip_lineage() {
        assert!(!MachineProfile::Chip8.full_color());
        assert!(!MachineProfile::SuperChip.full_color());
        assert!(MachineProfile::XoChip.full_color());
        assert!(MachineProfile::Skyward.full_color());
    }

    #[test]
    fn test_profile_serde_names() {
        let json = serde_json::to_string(&MachineProfile::SuperChip).expect("serialize");
        assert_eq!(json, "\"superchip\"");
        let parsed: MachineProfile = serde_json::from_str("\"schip\"").expect("alias");
        assert_eq!(parsed, MachineProfile::SuperChip);
    }
}
