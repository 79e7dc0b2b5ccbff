//! Assembly-style rendering of decoded instructions for traces and debuggers.

use super::decode::{Instruction, Opcode};
use std::fmt;

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ScrollDown(n) => write!(f, "SCD {}", n),
            ScrollUp(n) => write!(f, "SCU {}", n),
            ClearScreen => f.write_str("CLS"),
            Return => f.write_str("RET"),
            ScrollRight => f.write_str("SCR"),
            ScrollLeft => f.write_str("SCL"),
            Exit => f.write_str("EXIT"),
            LowRes => f.write_str("LOW"),
            HighRes => f.write_str("HIGH"),
            Jump(nnn) => write!(f, "JP 0x{:03X}", nnn),
            Call(nnn) => write!(f, "CALL 0x{:03X}", nnn),
            SkipEqImm(x, nn) => write!(f, "SE V{:X}, 0x{:02X}", x, nn),
            SkipNeImm(x, nn) => write!(f, "SNE V{:X}, 0x{:02X}", x, nn),
            SkipEqReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            SaveRange(x, y) => write!(f, "SAVE V{:X} - V{:X}", x, y),
            LoadRange(x, y) => write!(f, "LOAD V{:X} - V{:X}", x, y),
            LoadImm(x, nn) => write!(f, "LD V{:X}, 0x{:02X}", x, nn),
            AddImm(x, nn) => write!(f, "ADD V{:X}, 0x{:02X}", x, nn),
            Move(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD I, 0x{:03X}", nnn),
            JumpV0(nnn) => write!(f, "JP V0, 0x{:03X}", nnn),
            Random(x, nn) => write!(f, "RND V{:X}, 0x{:02X}", x, nn),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed(x) => write!(f, "SKP V{:X}", x),
            SkipKeyNotPressed(x) => write!(f, "SKNP V{:X}", x),
            LoadIndexLong => f.write_str("LD I, LONG"),
            SelectPlane(n) => write!(f, "PLANE {}", n),
            StoreAudio => f.write_str("AUDIO"),
            ReadDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            SmallGlyph(x) => write!(f, "LD F, V{:X}", x),
            LargeGlyph(x) => write!(f, "LD HF, V{:X}", x),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
            SaveFlags(x) => write!(f, "LD R, V{:X}", x),
            LoadFlags(x) => write!(f, "LD V{:X}, R", x),
        }
    }
}

/// Mnemonic text for one word; unknown words become a data directive.
pub fn mnemonic(opcode: u16) -> String {
    match Instruction::decode(Opcode(opcode)) {
        Some(instruction) => instruction.to_string(),
        None => format!("DW 0x{:04X}", opcode),
    }
}

/// One trace line: `AAAA: OPCD  MNEMONIC`
pub fn disassemble(opcode: u16, addr: u16) -> String {
    format!("{:04X}: {:04X}  {}", addr, opcode, mnemonic(opcode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_layout() {
        assert_eq!(disassemble(0x00E0, 0x200), "0200: 00E0  CLS");
        assert_eq!(disassemble(0xD125, 0x2A4), "02A4: D125  DRW V1, V2, 5");
    }

    #[test]
    fn test_unknown_word_is_data() {
        assert_eq!(disassemble(0x5AB9, 0x300), "0300: 5AB9  DW 0x5AB9");
        assert_eq!(mnemonic(0x0123), "DW 0x0123");
    }

    #[test]
    fn test_register_and_immediate_forms() {
        assert_eq!(mnemonic(0x6A0F), "LD VA, 0x0F");
        assert_eq!(mnemonic(0x8F1E), "SHL VF, V1");
        assert_eq!(mnemonic(0xA123), "LD I, 0x123");
        assert_eq!(mnemonic(0xB400), "JP V0, 0x400");
        assert_eq!(mnemonic(0x5312), "SAVE V3 - V1");
        assert_eq!(mnemonic(0xF300), "LD I, LONG");
        assert_eq!(mnemonic(0x9121), "SNE V1, V2");
    }

    #[test]
    fn test_f_family_forms() {
        assert_eq!(mnemonic(0xF000), "LD I, LONG");
        assert_eq!(mnemonic(0xF201), "PLANE 2");
        assert_eq!(mnemonic(0xF002), "AUDIO");
        assert_eq!(mnemonic(0xF40A), "LD V4, K");
        assert_eq!(mnemonic(0xF230), "LD HF, V2");
        assert_eq!(mnemonic(0xF555), "LD [I], V5");
        assert_eq!(mnemonic(0xF565), "LD V5, [I]");
        assert_eq!(mnemonic(0xF775), "LD R, V7");
        assert_eq!(mnemonic(0xF785), "LD V7, R");
    }

    #[test]
    fn test_superchip_system_forms() {
        assert_eq!(mnemonic(0x00C4), "SCD 4");
        assert_eq!(mnemonic(0x00D2), "SCU 2");
        assert_eq!(mnemonic(0x00FB), "SCR");
        assert_eq!(mnemonic(0x00FD), "EXIT");
        assert_eq!(mnemonic(0x00FE), "LOW");
    }
}
