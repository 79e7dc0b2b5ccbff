//! Runs a built-in demo program and prints the frame as text.

use emu_chip8::{Chip8Config, Chip8System};
use emu_core::cpu_chip8::MachineProfile;
use emu_core::System;
use std::env;

/// Draws the hex digits 0-F across the screen, then exits
const DEMO: [u16; 14] = [
    0x6000, // LD V0, 0      digit
    0x6101, // LD V1, 1      x
    0x6201, // LD V2, 1      y
    0xF029, // LD F, V0
    0xD125, // DRW V1, V2, 5
    0x7001, // ADD V0, 1
    0x7105, // ADD V1, 5
    0x3129, // SE V1, 41     eight digits per row
    0x1216, // JP 0x216
    0x6101, // LD V1, 1
    0x7207, // ADD V2, 7
    0x3010, // SE V0, 16
    0x1206, // JP 0x206
    0x00FD, // EXIT
];

fn main() {
    let machine = env::args()
        .nth(1)
        .and_then(|name| MachineProfile::from_str(&name))
        .unwrap_or_default();

    let mut sys = match Chip8System::with_config(Chip8Config::for_machine(machine)) {
        Ok(sys) => sys,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let program: Vec<u8> = DEMO.iter().flat_map(|w| w.to_be_bytes()).collect();
    if let Err(e) = sys.mount("Program", &program) {
        eprintln!("{}", e);
        return;
    }

    match sys.step_frame() {
        Ok(frame) => {
            println!("Headless {} frame: {}x{}", machine, frame.width, frame.height);
            for row in frame.pixels.chunks(frame.width as usize).step_by(2) {
                let line: String = row
                    .iter()
                    .step_by(2)
                    .map(|&p| if p & 0x00FF_FFFF != 0 { '#' } else { ' ' })
                    .collect();
                println!("{}", line.trim_end());
            }
        }
        Err(e) => eprintln!("{}", e),
    }
}
