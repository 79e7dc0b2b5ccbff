use anyhow::{Context, Result};
use clap::Parser;
use emu_chip8::{Chip8Config, Chip8System, Palette};
use emu_core::cpu_chip8::{MachineProfile, PLANE_HEIGHT, PLANE_WIDTH};
use emu_core::logging::{LogConfig, LogLevel};
use emu_core::System;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Headless CHIP-8 / SUPER-CHIP / XO-CHIP runner
#[derive(Parser)]
struct Args {
    /// Program image (.ch8, .sc8, .xo8)
    rom: PathBuf,

    /// Machine: chip8, schip, xochip, skyward or auto (overrides --config)
    #[arg(long)]
    machine: Option<String>,

    /// Instructions per frame (overrides --config)
    #[arg(long)]
    cycles: Option<u32>,

    /// Number of 60 Hz frames to run
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Palette file: up to four hexadecimal RGB lines
    #[arg(long)]
    palette: Option<PathBuf>,

    /// JSON machine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every executed instruction
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Print both bitplanes as text after the run
    #[arg(long, default_value_t = false)]
    dump: bool,

    /// Write a JSON save state to this file after the run
    #[arg(long)]
    save: Option<PathBuf>,

    /// Interpreter log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Send interpreter logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<Chip8Config> {
    let mut config = match args.config.as_ref() {
        Some(path) => Chip8Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Chip8Config::default(),
    };

    if let Some(name) = args.machine.as_deref() {
        config.machine = MachineProfile::from_str(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown machine: {}", name))?;
    }
    if let Some(cycles) = args.cycles {
        config.cycles_per_frame = cycles;
    }
    Ok(config)
}

/// One text row per canvas line, `0` for a lit pixel and `.` otherwise
fn dump_planes(sys: &Chip8System) -> String {
    let mut out = String::new();
    for plane in 0..2 {
        out.push_str(&format!("Plane {} :\n", plane));
        for row in sys.cpu().plane(plane).chunks(PLANE_WIDTH).take(PLANE_HEIGHT) {
            out.extend(row.iter().map(|&lit| if lit { '0' } else { '.' }));
            out.push('\n');
        }
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let level = LogLevel::from_str(&args.log_level)
        .ok_or_else(|| anyhow::anyhow!("Unknown log level: {}", args.log_level))?;
    let log_config = LogConfig::global();
    log_config.set_global_level(level);
    if let Some(path) = args.log_file.as_ref() {
        log_config
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }

    let config = build_config(&args)?;
    log::info!(
        "Machine {} at {} cycles per frame",
        config.machine,
        config.cycles_per_frame
    );
    let mut sys = Chip8System::with_config(config)?;

    if let Some(path) = args.palette.as_ref() {
        let palette = Palette::from_file(path)
            .with_context(|| format!("loading palette {}", path.display()))?;
        sys.set_palette(palette);
    }

    let size = sys
        .load_program_from_path(&args.rom)
        .with_context(|| format!("loading program {}", args.rom.display()))?;
    log::info!("Loaded {} ({} bytes)", args.rom.display(), size);

    for fnum in 1..=args.frames {
        if args.trace {
            sys.step_frame_traced(|line| println!("{}", line))?;
        } else {
            sys.step_frame()?;
        }

        if sys.cpu().is_stopped() {
            log::info!("Program exited during frame {}", fnum);
            break;
        }
    }

    if args.dump {
        println!("RESULTS");
        print!("{}", dump_planes(&sys));
    }

    if let Some(path) = args.save.as_ref() {
        let state = sys.save_state();
        let mut f = File::create(path)?;
        write!(f, "{}", serde_json::to_string_pretty(&state)?)?;
        log::info!("Save state written to {}", path.display());
    }

    log_config.clear_log_file();
    Ok(())
}
