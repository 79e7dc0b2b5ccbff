//! CHIP-8 system implementation
//!
//! Wraps the interpreter core with what a host needs: program mounting,
//! per-frame pacing (N instructions then one timer tick), palette
//! compositing into a 128x64 ARGB frame, and JSON save states.

use emu_core::cpu_chip8::{Chip8, Chip8Error, PLANE_HEIGHT, PLANE_WIDTH};
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{types::Frame, MountPointInfo, System};
use serde::de::Error as _;

mod config;
mod palette;

pub use config::{Chip8Config, QuirkOverrides, DEFAULT_CYCLES_PER_FRAME};
pub use palette::{Palette, PaletteError, DEFAULT_COLORS};

const MOUNT_PROGRAM: &str = "Program";
const STATE_VERSION: u64 = 1;

#[derive(thiserror::Error, Debug)]
pub enum Chip8SystemError {
    #[error(transparent)]
    Cpu(#[from] Chip8Error),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No program loaded")]
    NoProgram,
    #[error("Invalid mount point")]
    InvalidMountPoint,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub struct Chip8System {
    cpu: Chip8,
    config: Chip8Config,
    palette: Palette,
    /// Mounted image, kept so reset can restore self-modified code
    program: Option<Vec<u8>>,
}

impl Default for Chip8System {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8System {
    pub fn new() -> Self {
        let config = Chip8Config::default();
        Self {
            cpu: Self::make_cpu(&config),
            config,
            palette: Palette::default(),
            program: None,
        }
    }

    pub fn with_config(config: Chip8Config) -> Result<Self, Chip8SystemError> {
        config.validate()?;
        Ok(Self {
            cpu: Self::make_cpu(&config),
            config,
            palette: Palette::default(),
            program: None,
        })
    }

    fn make_cpu(config: &Chip8Config) -> Chip8 {
        let quirks = config.effective_quirks();
        match config.seed {
            Some(seed) => Chip8::with_seed(quirks, seed),
            None => Chip8::new(quirks),
        }
    }

    pub fn config(&self) -> &Chip8Config {
        &self.config
    }

    pub fn cpu(&self) -> &Chip8 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Chip8 {
        &mut self.cpu
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn load_program_from_path<P: AsRef<std::path::Path>>(
        &mut self,
        path: P,
    ) -> Result<usize, Chip8SystemError> {
        let data = std::fs::read(path)?;
        self.mount(MOUNT_PROGRAM, &data)?;
        Ok(data.len())
    }

    /// Host key input (0x0-0xF)
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.cpu.set_key(key, pressed);
    }

    /// The buzzer sounds while the sound timer is non-zero
    pub fn sound_active(&self) -> bool {
        self.cpu.sound_timer() > 0
    }

    pub fn audio_buffer(&self) -> &[u8; 16] {
        self.cpu.audio_buffer()
    }

    /// Whether the display changed since the last call
    pub fn frame_needs_redraw(&mut self) -> bool {
        self.cpu.take_redraw()
    }

    /// Like `step_frame`, reporting a disassembly line before each instruction.
    pub fn step_frame_traced<F>(&mut self, mut trace: F) -> Result<Frame, Chip8SystemError>
    where
        F: FnMut(String),
    {
        let trace: &mut dyn FnMut(String) = &mut trace;
        self.run_frame(Some(trace))
    }

    fn run_frame(&mut self, mut trace: Option<&mut dyn FnMut(String)>) -> Result<Frame, Chip8SystemError> {
        if self.program.is_none() {
            return Err(Chip8SystemError::NoProgram);
        }

        for _ in 0..self.config.cycles_per_frame {
            if self.cpu.is_stopped() {
                break;
            }
            if let Some(trace) = trace.as_mut() {
                trace(self.cpu.disassemble_at(self.cpu.pc()));
            }
            // Unknown opcodes and stack faults are logged by the core and do not halt
            self.cpu.step();
        }

        self.cpu.tick_timers();
        Ok(self.render_frame())
    }

    /// Composite both bitplanes through the palette.
    ///
    /// XO-CHIP machines use all four colours; the older machines draw any
    /// lit pixel in colour 3.
    pub fn render_frame(&self) -> Frame {
        let mut frame = Frame::new(PLANE_WIDTH as u32, PLANE_HEIGHT as u32);
        let display = self.cpu.display();
        let full_color = self.config.machine.full_color();

        for y in 0..PLANE_HEIGHT {
            for x in 0..PLANE_WIDTH {
                let index = display.color_index(x, y);
                let index = if full_color || index == 0 { index } else { 3 };
                frame.pixels[y * PLANE_WIDTH + x] = self.palette.argb(index);
            }
        }
        frame
    }
}

impl System for Chip8System {
    type Error = Chip8SystemError;

    fn reset(&mut self) {
        self.cpu.initialize();
        if let Some(program) = &self.program {
            // Size was checked when the program was mounted
            let _ = self.cpu.load_program(program);
        }
    }

    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        self.run_frame(None)
    }

    fn save_state(&self) -> serde_json::Value {
        serde_json::json!({
            "system": "chip8",
            "version": STATE_VERSION,
            "machine": self.config.machine,
            "cpu": serde_json::to_value(&self.cpu).unwrap_or(serde_json::Value::Null),
            "palette": self.palette,
        })
    }

    fn load_state(&mut self, v: &serde_json::Value) -> Result<(), serde_json::Error> {
        if v.get("system").and_then(|s| s.as_str()) != Some("chip8") {
            return Err(serde_json::Error::custom("save state is not for chip8"));
        }
        let version = v.get("version").and_then(|n| n.as_u64());
        if version != Some(STATE_VERSION) {
            return Err(serde_json::Error::custom(format!(
                "unsupported save state version {:?}",
                version
            )));
        }

        let cpu_state = v
            .get("cpu")
            .ok_or_else(|| serde_json::Error::missing_field("cpu"))?;
        let cpu: Chip8 = serde_json::from_value(cpu_state.clone())?;
        if !cpu.is_well_formed() {
            return Err(serde_json::Error::custom("malformed interpreter snapshot"));
        }

        if let Some(palette) = v.get("palette") {
            self.palette = serde_json::from_value(palette.clone())?;
        }
        if let Some(machine) = v.get("machine") {
            self.config.machine = serde_json::from_value(machine.clone())?;
        }
        self.cpu = cpu;

        log(LogCategory::CPU, LogLevel::Info, || {
            format!("CHIP-8: restored save state at pc 0x{:04X}", self.cpu.pc())
        });
        Ok(())
    }

    fn supports_save_states(&self) -> bool {
        true
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        vec![MountPointInfo {
            id: MOUNT_PROGRAM.to_string(),
            name: "Program".to_string(),
            extensions: vec!["ch8".to_string(), "sc8".to_string(), "xo8".to_string()],
            required: true,
        }]
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        if mount_point_id != MOUNT_PROGRAM {
            return Err(Chip8SystemError::InvalidMountPoint);
        }

        // Fresh machine so nothing from a previous program survives in memory
        let mut cpu = Self::make_cpu(&self.config);
        cpu.load_program(data)?;
        self.cpu = cpu;
        self.program = Some(data.to_vec());
        Ok(())
    }

    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error> {
        if mount_point_id != MOUNT_PROGRAM {
            return Err(Chip8SystemError::InvalidMountPoint);
        }

        self.program = None;
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        mount_point_id == MOUNT_PROGRAM && self.program.is_some()
    }
}
