//! CHIP-8 / SUPER-CHIP / XO-CHIP interpreter core
//!
//! [`Chip8`] owns the whole machine: memory, registers, call stack, timers,
//! key state and the two-plane [`Display`]. The host drives it by calling
//! [`Chip8::step`] once per instruction and [`Chip8::tick_timers`] at 60 Hz;
//! pacing is entirely up to the caller.
//!
//! ```
//! use emu_core::cpu_chip8::{Chip8, MachineProfile, Step};
//!
//! let mut cpu = Chip8::with_seed(MachineProfile::Chip8.quirks(), 1);
//! cpu.load_program(&[0x6A, 0x2A, 0x00, 0xFD]).unwrap();
//! cpu.step();
//! assert_eq!(cpu.v()[0xA], 0x2A);
//! cpu.step();
//! assert_eq!(cpu.step(), Step::Stopped);
//! ```

pub mod decode;
pub mod disasm;
pub mod font;
pub mod graphics;
pub mod quirks;


pub use decode::{Instruction, Opcode, LONG_LOAD_PREFIX};
pub use disasm::disassemble;
pub use graphics::{Display, PLANE_HEIGHT, PLANE_WIDTH};
pub use quirks::{MachineProfile, Quirks};

use crate::logging::{log, LogCategory, LogLevel};
use crate::Cpu;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;

/// Physical memory size; the XO-CHIP long load can address all of it
pub const MEMORY_SIZE: usize = 0x10000;
/// Programs are loaded and start executing here
pub const PROGRAM_START: u16 = 0x200;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;
/// SUPER-CHIP persistent flag registers (FX75/FX85)
pub const USER_FLAG_COUNT: usize = 8;
pub const AUDIO_BUFFER_LEN: usize = 16;

/// 12-bit address space of the classic opcodes
const ADDR_MASK: u16 = 0x0FFF;
const VF: usize = 0xF;

#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is {len} bytes but only {max} bytes fit above 0x200")]
    ProgramTooLarge { len: usize, max: usize },
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one [`Chip8::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Instruction),
    /// Word that did not decode; pc has already moved past it
    Unknown(u16),
    /// Halted by 00FD; nothing was executed
    Stopped,
    /// 2NNN with a full stack; the call was dropped
    StackOverflow,
    /// 00EE with an empty stack; execution continues after it
    StackUnderflow,
}

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Interpreter state. Serializes to a complete snapshot (RNG excluded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chip8 {
    memory: Vec<u8>,
    v: [u8; 16],
    i: u16,
    pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: u8,
    delay_timer: u8,
    sound_timer: u8,
    keys: [bool; KEY_COUNT],
    display: Display,
    user_flags: [u8; USER_FLAG_COUNT],
    audio_buffer: [u8; AUDIO_BUFFER_LEN],
    stopped: bool,
    /// Register receiving the next key release while FX0A is pending
    waiting: Option<u8>,
    quirks: Quirks,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

impl Chip8 {
    pub fn new(quirks: Quirks) -> Self {
        Self::with_rng(quirks, entropy_rng())
    }

    /// Interpreter whose CXNN sequence is reproducible
    pub fn with_seed(quirks: Quirks, seed: u64) -> Self {
        Self::with_rng(quirks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(quirks: Quirks, rng: StdRng) -> Self {
        let mut cpu = Self {
            memory: vec![0; MEMORY_SIZE],
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; KEY_COUNT],
            display: Display::new(),
            user_flags: [0; USER_FLAG_COUNT],
            audio_buffer: [0; AUDIO_BUFFER_LEN],
            stopped: false,
            waiting: None,
            quirks,
            rng,
        };
        cpu.initialize();
        cpu
    }

    /// Reset registers, stack, timers, keys and display, and reload the font.
    ///
    /// Memory above the font, the user flags and the quirks are kept, so a
    /// program must be reloaded only if it overwrote itself.
    pub fn initialize(&mut self) {
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keys = [false; KEY_COUNT];
        self.display.reset();
        self.stopped = false;
        self.waiting = None;
        self.memory[..font::FONT.len()].copy_from_slice(&font::FONT);
    }

    /// Whether a deserialized snapshot has the buffer sizes and indices the
    /// executor relies on.
    pub fn is_well_formed(&self) -> bool {
        self.memory.len() == MEMORY_SIZE
            && self.display.is_well_formed()
            && self.sp as usize <= STACK_DEPTH
            && self.waiting.map_or(true, |reg| (reg as usize) < self.v.len())
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn set_quirks(&mut self, quirks: Quirks) {
        self.quirks = quirks;
    }

    /// Copy a program image to 0x200. Returns the number of bytes loaded.
    pub fn load_program(&mut self, program: &[u8]) -> Result<usize, Chip8Error> {
        let start = PROGRAM_START as usize;
        let max = MEMORY_SIZE - start;
        if program.len() > max {
            return Err(Chip8Error::ProgramTooLarge {
                len: program.len(),
                max,
            });
        }

        self.memory[start..start + program.len()].copy_from_slice(program);
        log(LogCategory::Memory, LogLevel::Info, || {
            format!("CHIP-8: loaded {} byte program at 0x{:03X}", program.len(), start)
        });
        Ok(program.len())
    }

    /// Read an image until EOF and load it. Memory is untouched on failure.
    pub fn load_program_from_reader<R: Read>(&mut self, mut reader: R) -> Result<usize, Chip8Error> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    #[inline]
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    #[inline]
    pub fn write_byte(&mut self, addr: u16, val: u8) {
        self.memory[addr as usize] = val;
    }

    /// Big-endian word at `addr`
    #[inline]
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Register an FX0A is waiting to fill, if any
    pub fn waiting_register(&self) -> Option<u8> {
        self.waiting
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn is_hires(&self) -> bool {
        self.display.is_hires()
    }

    /// Bitplane `n` (0 or 1), 128x64 row-major
    pub fn plane(&self, n: usize) -> &[bool] {
        self.display.plane(n)
    }

    pub fn plane_select(&self) -> u8 {
        self.display.plane_select()
    }

    pub fn audio_buffer(&self) -> &[u8; AUDIO_BUFFER_LEN] {
        &self.audio_buffer
    }

    pub fn user_flags(&self) -> &[u8; USER_FLAG_COUNT] {
        &self.user_flags
    }

    /// True once per display change; clears the flag
    pub fn take_redraw(&mut self) -> bool {
        self.display.take_redraw()
    }

    /// 60 Hz tick: both timers count down to zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        if self.sound_timer == 1 {
            log(LogCategory::Timers, LogLevel::Trace, || "CHIP-8: sound timer expired".to_string());
        }
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Host key input. Releasing a held key while FX0A is pending stores the
    /// key in the waiting register and resumes after the FX0A.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        let Some(slot) = self.keys.get_mut(key as usize) else {
            log(LogCategory::Input, LogLevel::Warn, || {
                format!("CHIP-8: ignoring out of range key {}", key)
            });
            return;
        };
        let was_pressed = std::mem::replace(slot, pressed);

        if was_pressed && !pressed {
            if let Some(reg) = self.waiting.take() {
                self.v[reg as usize] = key;
                self.pc = self.pc.wrapping_add(2);
                log(LogCategory::Input, LogLevel::Debug, || {
                    format!("CHIP-8: key {:X} released, V{:X} = {:X}", key, reg, key)
                });
            }
        }
    }

    /// Trace line for the instruction at `addr`, resolving the F000 operand.
    pub fn disassemble_at(&self, addr: u16) -> String {
        let word = self.read_word(addr);
        if Instruction::decode(Opcode(word)) == Some(Instruction::LoadIndexLong) {
            let operand = self.read_word(addr.wrapping_add(2));
            format!("{:04X}: {:04X}  LD I, 0x{:04X}", addr, word, operand)
        } else {
            disassemble(word, addr)
        }
    }

    /// Fetch, decode and execute one instruction.
    pub fn step(&mut self) -> Step {
        if self.stopped {
            return Step::Stopped;
        }

        let addr = self.pc;
        let word = self.read_word(addr);
        self.pc = addr.wrapping_add(2);

        match Instruction::decode(Opcode(word)) {
            Some(instruction) => self.execute(instruction),
            None => {
                log(LogCategory::CPU, LogLevel::Warn, || {
                    format!("CHIP-8: unknown opcode 0x{:04X} at 0x{:04X}", word, addr)
                });
                Step::Unknown(word)
            }
        }
    }

    /// Skip the next instruction, two words if it is exactly `F000`.
    fn skip_if(&mut self, condition: bool) {
        if condition {
            let width = if self.read_word(self.pc) == LONG_LOAD_PREFIX { 4 } else { 2 };
            self.pc = self.pc.wrapping_add(width);
        }
    }

    fn key_down(&self, x: u8) -> bool {
        self.keys[(self.v[x as usize] & 0xF) as usize]
    }

    fn execute(&mut self, instruction: Instruction) -> Step {
        use Instruction::*;

        match instruction {
            ScrollDown(n) => self.display.scroll_down(n as usize),
            ScrollUp(n) => self.display.scroll_up(n as usize),
            ClearScreen => self.display.clear(),
            Return => {
                if self.sp == 0 {
                    log(LogCategory::CPU, LogLevel::Error, || {
                        format!("CHIP-8: return with empty stack at 0x{:04X}", self.pc.wrapping_sub(2))
                    });
                    return Step::StackUnderflow;
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp as usize];
            }
            ScrollRight => self.display.scroll_right(4),
            ScrollLeft => self.display.scroll_left(4),
            Exit => {
                self.stopped = true;
                self.pc = self.pc.wrapping_sub(2);
                log(LogCategory::CPU, LogLevel::Info, || {
                    format!("CHIP-8: stopped at 0x{:04X}", self.pc)
                });
            }
            LowRes | HighRes => {
                let hires = instruction == HighRes;
                self.display
                    .set_hires(hires, self.quirks.clear_on_resolution_change);
                log(LogCategory::Video, LogLevel::Debug, || {
                    format!("CHIP-8: {} resolution", if hires { "high" } else { "low" })
                });
            }
            Jump(nnn) => self.pc = nnn,
            Call(nnn) => {
                if self.sp as usize >= STACK_DEPTH {
                    log(LogCategory::CPU, LogLevel::Error, || {
                        format!("CHIP-8: stack overflow calling 0x{:03X}", nnn)
                    });
                    return Step::StackOverflow;
                }
                self.stack[self.sp as usize] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            SkipEqImm(x, nn) => self.skip_if(self.v[x as usize] == nn),
            SkipNeImm(x, nn) => self.skip_if(self.v[x as usize] != nn),
            SkipEqReg(x, y) => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            SaveRange(x, y) => {
                for offset in 0..=x.abs_diff(y) {
                    let reg = range_register(x, y, offset);
                    self.write_byte(self.i.wrapping_add(offset as u16), self.v[reg]);
                }
            }
            LoadRange(x, y) => {
                for offset in 0..=x.abs_diff(y) {
                    let reg = range_register(x, y, offset);
                    self.v[reg] = self.read_byte(self.i.wrapping_add(offset as u16));
                }
            }
            LoadImm(x, nn) => self.v[x as usize] = nn,
            AddImm(x, nn) => self.v[x as usize] = self.v[x as usize].wrapping_add(nn),
            Move(x, y) => self.v[x as usize] = self.v[y as usize],
            Or(x, y) => self.v[x as usize] |= self.v[y as usize],
            And(x, y) => self.v[x as usize] &= self.v[y as usize],
            Xor(x, y) => self.v[x as usize] ^= self.v[y as usize],
            Add(x, y) => {
                let (result, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
                self.v[x as usize] = result;
                self.v[VF] = carry as u8;
            }
            Sub(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vx.wrapping_sub(vy);
                self.v[VF] = (vx >= vy) as u8;
            }
            SubReverse(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vy.wrapping_sub(vx);
                self.v[VF] = (vy >= vx) as u8;
            }
            ShiftRight(x, y) => {
                let source = self.v[self.shift_source(x, y)];
                self.v[x as usize] = source >> 1;
                self.v[VF] = source & 0x01;
            }
            ShiftLeft(x, y) => {
                let source = self.v[self.shift_source(x, y)];
                self.v[x as usize] = source << 1;
                self.v[VF] = source >> 7;
            }
            SkipNeReg(x, y) => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            LoadIndex(nnn) => self.i = nnn,
            JumpV0(nnn) => self.pc = nnn.wrapping_add(self.v[0] as u16),
            Random(x, nn) => self.v[x as usize] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[VF] = 0;
                let start = self.i as usize;
                let end = (start + self.display.sprite_len(n)).min(MEMORY_SIZE);
                let collision = self.display.draw_sprite(
                    vx,
                    vy,
                    n,
                    &self.memory[start..end],
                    self.quirks.sprites_wrap,
                );
                self.v[VF] = collision as u8;
            }
            SkipKeyPressed(x) => self.skip_if(self.key_down(x)),
            SkipKeyNotPressed(x) => self.skip_if(!self.key_down(x)),
            LoadIndexLong => {
                self.i = self.read_word(self.pc);
                self.pc = self.pc.wrapping_add(2);
            }
            SelectPlane(n) => {
                self.display.select_planes(n);
                log(LogCategory::Video, LogLevel::Debug, || {
                    format!("CHIP-8: plane select = {}", n)
                });
            }
            StoreAudio => {
                for offset in 0..AUDIO_BUFFER_LEN {
                    self.audio_buffer[offset] = self.read_byte(self.i.wrapping_add(offset as u16));
                }
            }
            ReadDelay(x) => self.v[x as usize] = self.delay_timer,
            WaitKey(x) => {
                // Waits even when a key is already held; set_key commits on release
                if self.waiting.is_none() {
                    log(LogCategory::Input, LogLevel::Debug, || {
                        format!("CHIP-8: waiting for key into V{:X}", x)
                    });
                }
                self.waiting = Some(x);
                self.pc = self.pc.wrapping_sub(2);
            }
            SetDelay(x) => self.delay_timer = self.v[x as usize],
            SetSound(x) => self.sound_timer = self.v[x as usize],
            AddIndex(x) => {
                let sum = self.i as u32 + self.v[x as usize] as u32;
                self.v[VF] = (sum > ADDR_MASK as u32) as u8;
                self.i = sum as u16;
            }
            SmallGlyph(x) => {
                self.i = font::SMALL_FONT_ADDR + self.v[x as usize] as u16 * font::SMALL_GLYPH_BYTES;
            }
            LargeGlyph(x) => {
                self.i = font::LARGE_FONT_ADDR + self.v[x as usize] as u16 * font::LARGE_GLYPH_BYTES;
            }
            StoreBcd(x) => {
                let value = self.v[x as usize];
                self.write_byte(self.i, value / 100);
                self.write_byte(self.i.wrapping_add(1) & ADDR_MASK, value / 10 % 10);
                self.write_byte(self.i.wrapping_add(2) & ADDR_MASK, value % 10);
            }
            StoreRegs(x) => {
                for reg in 0..=x as usize {
                    self.write_byte(self.i.wrapping_add(reg as u16), self.v[reg]);
                }
                if self.quirks.load_store_increments_i {
                    self.i = self.i.wrapping_add(x as u16 + 1);
                }
            }
            LoadRegs(x) => {
                for reg in 0..=x as usize {
                    self.v[reg] = self.read_byte(self.i.wrapping_add(reg as u16));
                }
                if self.quirks.load_store_increments_i {
                    self.i = self.i.wrapping_add(x as u16 + 1);
                }
            }
            SaveFlags(x) => {
                let count = (x as usize + 1).min(USER_FLAG_COUNT);
                self.user_flags[..count].copy_from_slice(&self.v[..count]);
            }
            LoadFlags(x) => {
                let count = (x as usize + 1).min(USER_FLAG_COUNT);
                self.v[..count].copy_from_slice(&self.user_flags[..count]);
            }
        }

        Step::Executed(instruction)
    }

    fn shift_source(&self, x: u8, y: u8) -> usize {
        if self.quirks.shift_uses_vy {
            y as usize
        } else {
            x as usize
        }
    }
}

/// 5XY2/5XY3 register at `offset`: ascending from X to Y, or descending when Y < X
fn range_register(x: u8, y: u8, offset: u8) -> usize {
    if y >= x {
        (x + offset) as usize
    } else {
        (x - offset) as usize
    }
}

impl Cpu for Chip8 {
    fn reset(&mut self) {
        self.initialize();
    }

    fn step(&mut self) -> u32 {
        match Chip8::step(self) {
            Step::Stopped => 0,
            _ => 1,
        }
    }
}
