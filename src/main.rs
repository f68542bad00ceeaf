//! NES emulator entry point.
//!
//! Loads a cartridge and runs it in a window, or headless for a fixed number of frames.
//! Usage: famicore [--pal] [--scale N] [--frames N] [--log-level LEVEL] path/to/game.nes

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use ansi_term::Colour::Red;
use clap::{Parser, ValueEnum};
use famicore::{
    config::{FrameTiming, Region},
    controller::Button,
    cpu::flags,
    logger,
    nes::Nes,
    ppu::{SCREEN_HEIGHT, SCREEN_WIDTH},
};
use log::LevelFilter;
use minifb::{Key, Window, WindowOptions};

/// Keyboard layout for controller 1.
const KEYMAP: [(Key, Button); 8] = [
    (Key::Z, Button::A),
    (Key::X, Button::B),
    (Key::RightShift, Button::Select),
    (Key::Enter, Button::Start),
    (Key::Up, Button::Up),
    (Key::Down, Button::Down),
    (Key::Left, Button::Left),
    (Key::Right, Button::Right),
];

/// Integer window scale.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowScale {
    #[value(name = "1")]
    X1,
    #[value(name = "2")]
    X2,
    #[value(name = "4")]
    X4,
    #[value(name = "8")]
    X8,
}

impl From<WindowScale> for minifb::Scale {
    fn from(scale: WindowScale) -> Self {
        match scale {
            WindowScale::X1 => minifb::Scale::X1,
            WindowScale::X2 => minifb::Scale::X2,
            WindowScale::X4 => minifb::Scale::X4,
            WindowScale::X8 => minifb::Scale::X8,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "famicore", version, about = "Frame-stepped NES emulator")]
struct Args {
    /// iNES cartridge image (.nes)
    rom: PathBuf,

    /// Window scale factor
    #[arg(long, value_enum, default_value = "2")]
    scale: WindowScale,

    /// Run this many frames without a window, then exit
    #[arg(long)]
    frames: Option<u64>,

    /// Use PAL frame timing instead of NTSC
    #[arg(long)]
    pal: bool,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = logger::init(args.log_level) {
        eprintln!("logger already initialised: {err}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", Red.bold().paint("error:"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let region = if args.pal { Region::Pal } else { Region::Ntsc };
    let mut nes = Nes::load(&args.rom, FrameTiming::from_region(region))?;

    match args.frames {
        Some(frames) => run_headless(&mut nes, frames),
        None => run_windowed(&mut nes, region, args.scale),
    }
}

fn run_headless(nes: &mut Nes, frames: u64) -> Result<(), Box<dyn Error>> {
    for _ in 0..frames {
        nes.run_frame()?;
    }
    let registers = nes.cpu().registers();
    log::info!(
        "ran {} frames: {registers} [{}]",
        nes.frame_count(),
        flags::describe(registers.status)
    );
    Ok(())
}

fn run_windowed(nes: &mut Nes, region: Region, scale: WindowScale) -> Result<(), Box<dyn Error>> {
    let frame_duration = Duration::from_secs(1) / region.frames_per_second();

    let mut window = Window::new(
        "Famicore",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            borderless: false,
            resize: true,
            scale: scale.into(),
            scale_mode: minifb::ScaleMode::AspectRatioStretch,
            topmost: false,
            title: true,
            transparency: false,
            none: false,
        },
    )?;
    window.set_target_fps(region.frames_per_second() as usize);

    let mut pixels = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame_start = Instant::now();

        for (key, button) in KEYMAP {
            nes.set_button(button, window.is_key_down(key));
        }
        nes.run_frame()?;

        rgba_to_rgb(nes.frame_buffer(), &mut pixels);
        window.update_with_buffer(&pixels, SCREEN_WIDTH, SCREEN_HEIGHT)?;

        // Emulation runs far faster than the console; sleep off the remainder of the frame.
        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }
    Ok(())
}

/// minifb wants 0x00RRGGBB per pixel.
fn rgba_to_rgb(frame: &[u8], out: &mut [u32]) {
    for (px, rgba) in out.iter_mut().zip(frame.chunks_exact(4)) {
        *px = u32::from_be_bytes([0, rgba[0], rgba[1], rgba[2]]);
    }
}
