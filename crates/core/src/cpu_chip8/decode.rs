//! Instruction word decoding.
//!
//! Decoding is pure: a 16-bit word becomes an [`Instruction`] value that the
//! executor consumes. Field extraction is identical for every opcode and
//! independent of the quirk configuration.

use serde::{Deserialize, Serialize};

/// A fetched 16-bit instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Top nibble: the opcode family
    #[inline]
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// Bits 8-11: first register index
    #[inline]
    pub fn x(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    /// Bits 4-7: second register index
    #[inline]
    pub fn y(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }

    /// Low nibble: 4-bit count/immediate
    #[inline]
    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    /// Low byte: 8-bit immediate
    #[inline]
    pub fn nn(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Low 12 bits: address immediate
    #[inline]
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

/// Word that opens the two-word `F000 NNNN` instruction
pub const LONG_LOAD_PREFIX: u16 = 0xF000;

/// A decoded instruction. Register operands are indices 0..16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// 00CN (SUPER-CHIP)
    ScrollDown(u8),
    /// 00DN (XO-CHIP)
    ScrollUp(u8),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 00FB (SUPER-CHIP), 4 pixels
    ScrollRight,
    /// 00FC (SUPER-CHIP), 4 pixels
    ScrollLeft,
    /// 00FD (SUPER-CHIP)
    Exit,
    /// 00FE (SUPER-CHIP)
    LowRes,
    /// 00FF (SUPER-CHIP)
    HighRes,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(u8, u8),
    /// 4XNN
    SkipNeImm(u8, u8),
    /// 5XY0
    SkipEqReg(u8, u8),
    /// 5XY2 (XO-CHIP)
    SaveRange(u8, u8),
    /// 5XY3 (XO-CHIP)
    LoadRange(u8, u8),
    /// 6XNN
    LoadImm(u8, u8),
    /// 7XNN, VF untouched
    AddImm(u8, u8),
    /// 8XY0
    Move(u8, u8),
    /// 8XY1
    Or(u8, u8),
    /// 8XY2
    And(u8, u8),
    /// 8XY3
    Xor(u8, u8),
    /// 8XY4
    Add(u8, u8),
    /// 8XY5
    Sub(u8, u8),
    /// 8XY6
    ShiftRight(u8, u8),
    /// 8XY7
    SubReverse(u8, u8),
    /// 8XYE
    ShiftLeft(u8, u8),
    /// 9XY0
    SkipNeReg(u8, u8),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpV0(u16),
    /// CXNN
    Random(u8, u8),
    /// DXYN
    Draw(u8, u8, u8),
    /// EX9E
    SkipKeyPressed(u8),
    /// EXA1
    SkipKeyNotPressed(u8),
    /// F000 NNNN (XO-CHIP); the operand is the following word. X is ignored.
    LoadIndexLong,
    /// FN01 (XO-CHIP)
    SelectPlane(u8),
    /// F002 (XO-CHIP); X is ignored
    StoreAudio,
    /// FX07
    ReadDelay(u8),
    /// FX0A: always enters the wait state, even if a key is already held.
    /// Only a pressed key that is then released resolves it.
    WaitKey(u8),
    /// FX15
    SetDelay(u8),
    /// FX18
    SetSound(u8),
    /// FX1E
    AddIndex(u8),
    /// FX29
    SmallGlyph(u8),
    /// FX30 (SUPER-CHIP)
    LargeGlyph(u8),
    /// FX33
    StoreBcd(u8),
    /// FX55
    StoreRegs(u8),
    /// FX65
    LoadRegs(u8),
    /// FX75 (SUPER-CHIP)
    SaveFlags(u8),
    /// FX85 (SUPER-CHIP)
    LoadFlags(u8),
}

impl Instruction {
    /// Decode a single word. `None` means the word is not a known instruction.
    pub fn decode(op: Opcode) -> Option<Instruction> {
        let (x, y, n) = (op.x(), op.y(), op.n());

        let instruction = match op.family() {
            0x0 => {
                if op.0 & 0x00F0 == 0x00C0 {
                    Instruction::ScrollDown(n)
                } else if op.0 & 0x00F0 == 0x00D0 {
                    Instruction::ScrollUp(n)
                } else {
                    match op.0 {
                        0x00E0 => Instruction::ClearScreen,
                        0x00EE => Instruction::Return,
                        0x00FB => Instruction::ScrollRight,
                        0x00FC => Instruction::ScrollLeft,
                        0x00FD => Instruction::Exit,
                        0x00FE => Instruction::LowRes,
                        0x00FF => Instruction::HighRes,
                        _ => return None,
                    }
                }
            }
            0x1 => Instruction::Jump(op.nnn()),
            0x2 => Instruction::Call(op.nnn()),
            0x3 => Instruction::SkipEqImm(x, op.nn()),
            0x4 => Instruction::SkipNeImm(x, op.nn()),
            0x5 => match n {
                0x0 => Instruction::SkipEqReg(x, y),
                0x2 => Instruction::SaveRange(x, y),
                0x3 => Instruction::LoadRange(x, y),
                _ => return None,
            },
            0x6 => Instruction::LoadImm(x, op.nn()),
            0x7 => Instruction::AddImm(x, op.nn()),
            0x8 => match n {
                0x0 => Instruction::Move(x, y),
                0x1 => Instruction::Or(x, y),
                0x2 => Instruction::And(x, y),
                0x3 => Instruction::Xor(x, y),
                0x4 => Instruction::Add(x, y),
                0x5 => Instruction::Sub(x, y),
                0x6 => Instruction::ShiftRight(x, y),
                0x7 => Instruction::SubReverse(x, y),
                0xE => Instruction::ShiftLeft(x, y),
                _ => return None,
            },
            // N is ignored
            0x9 => Instruction::SkipNeReg(x, y),
            0xA => Instruction::LoadIndex(op.nnn()),
            0xB => Instruction::JumpV0(op.nnn()),
            0xC => Instruction::Random(x, op.nn()),
            0xD => Instruction::Draw(x, y, n),
            0xE => match op.nn() {
                0x9E => Instruction::SkipKeyPressed(x),
                0xA1 => Instruction::SkipKeyNotPressed(x),
                _ => return None,
            },
            0xF => match op.nn() {
                0x00 => Instruction::LoadIndexLong,
                0x01 => Instruction::SelectPlane(x),
                0x02 => Instruction::StoreAudio,
                0x07 => Instruction::ReadDelay(x),
                0x0A => Instruction::WaitKey(x),
                0x15 => Instruction::SetDelay(x),
                0x18 => Instruction::SetSound(x),
                0x1E => Instruction::AddIndex(x),
                0x29 => Instruction::SmallGlyph(x),
                0x30 => Instruction::LargeGlyph(x),
                0x33 => Instruction::StoreBcd(x),
                0x55 => Instruction::StoreRegs(x),
                0x65 => Instruction::LoadRegs(x),
                0x75 => Instruction::SaveFlags(x),
                0x85 => Instruction::LoadFlags(x),
                _ => return None,
            },
            _ => unreachable!("opcode family is a nibble"),
        };

        Some(instruction)
    }

    /// Size in bytes including any trailing operand word
    pub fn size(&self) -> u16 {
        match self {
            Instruction::LoadIndexLong => 4,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extraction() {
        let op = Opcode(0xD4A7);
        assert_eq!(op.family(), 0xD);
        assert_eq!(op.x(), 0x4);
        assert_eq!(op.y(), 0xA);
        assert_eq!(op.n(), 0x7);
        assert_eq!(op.nn(), 0xA7);
        assert_eq!(op.nnn(), 0x4A7);
    }

    #[test]
    fn test_decodes_system_family() {
        assert_eq!(Instruction::decode(Opcode(0x00E0)), Some(Instruction::ClearScreen));
        assert_eq!(Instruction::decode(Opcode(0x00EE)), Some(Instruction::Return));
        assert_eq!(Instruction::decode(Opcode(0x00C5)), Some(Instruction::ScrollDown(5)));
        assert_eq!(Instruction::decode(Opcode(0x00DF)), Some(Instruction::ScrollUp(15)));
        assert_eq!(Instruction::decode(Opcode(0x00FD)), Some(Instruction::Exit));
        assert_eq!(Instruction::decode(Opcode(0x00FF)), Some(Instruction::HighRes));
        // Machine-code calls are not supported
        assert_eq!(Instruction::decode(Opcode(0x0123)), None);
        assert_eq!(Instruction::decode(Opcode(0x0200)), None);
        // Scrolls match on the low byte only
        assert_eq!(Instruction::decode(Opcode(0x01C5)), Some(Instruction::ScrollDown(5)));
        assert_eq!(Instruction::decode(Opcode(0x0AD3)), Some(Instruction::ScrollUp(3)));
    }

    #[test]
    fn test_decodes_sub_dispatched_families() {
        assert_eq!(Instruction::decode(Opcode(0x5312)), Some(Instruction::SaveRange(3, 1)));
        assert_eq!(Instruction::decode(Opcode(0x5313)), Some(Instruction::LoadRange(3, 1)));
        assert_eq!(Instruction::decode(Opcode(0x5311)), None);
        assert_eq!(Instruction::decode(Opcode(0x8AB7)), Some(Instruction::SubReverse(0xA, 0xB)));
        assert_eq!(Instruction::decode(Opcode(0x8ABE)), Some(Instruction::ShiftLeft(0xA, 0xB)));
        assert_eq!(Instruction::decode(Opcode(0x8AB8)), None);
        assert_eq!(Instruction::decode(Opcode(0x9120)), Some(Instruction::SkipNeReg(1, 2)));
        assert_eq!(Instruction::decode(Opcode(0x9121)), Some(Instruction::SkipNeReg(1, 2)));
        assert_eq!(Instruction::decode(Opcode(0xE39E)), Some(Instruction::SkipKeyPressed(3)));
        assert_eq!(Instruction::decode(Opcode(0xE3A2)), None);
    }

    #[test]
    fn test_decodes_f_family() {
        assert_eq!(Instruction::decode(Opcode(0xF000)), Some(Instruction::LoadIndexLong));
        assert_eq!(Instruction::decode(Opcode(0xF201)), Some(Instruction::SelectPlane(2)));
        assert_eq!(Instruction::decode(Opcode(0xF002)), Some(Instruction::StoreAudio));
        assert_eq!(Instruction::decode(Opcode(0xF50A)), Some(Instruction::WaitKey(5)));
        assert_eq!(Instruction::decode(Opcode(0xF730)), Some(Instruction::LargeGlyph(7)));
        assert_eq!(Instruction::decode(Opcode(0xF385)), Some(Instruction::LoadFlags(3)));
        assert_eq!(Instruction::decode(Opcode(0xF100)), Some(Instruction::LoadIndexLong));
        assert_eq!(Instruction::decode(Opcode(0xF302)), Some(Instruction::StoreAudio));
        assert_eq!(Instruction::decode(Opcode(0xF0FF)), None);
    }

    #[test]
    fn test_long_load_is_two_words() {
        assert_eq!(Instruction::LoadIndexLong.size(), 4);
        assert_eq!(Instruction::Jump(0x200).size(), 2);
    }
}
