use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use nescore::cpu::Status;
use nescore::nes::DEFAULT_SAMPLE_RATE;
use nescore::{LoadError, Nes, NesConfig};

/// Run an iNES image headless for a number of frames.
#[derive(Debug, Parser)]
#[command(name = "nescore", version)]
struct Args {
    /// Path to the .nes image.
    rom: PathBuf,

    /// Frames to run before exiting.
    #[arg(short, long, default_value_t = 60)]
    frames: u32,

    /// Write a nestest-format instruction log to FILE.
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Start execution at this address instead of the RESET vector (e.g. C000).
    #[arg(long, value_name = "HEX", value_parser = parse_hex_u16)]
    start_pc: Option<u16>,

    /// Host audio sample rate in Hz.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Save the final frame as a PNG.
    #[cfg(feature = "screenshot")]
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to load ROM: {0}")]
    Load(#[from] LoadError),
    #[error("failed to open trace file: {0}")]
    Trace(#[from] std::io::Error),
    #[cfg(feature = "screenshot")]
    #[error("failed to save screenshot: {0}")]
    Screenshot(#[from] nescore::nes::ScreenshotError),
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches('$');
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = NesConfig {
        sample_rate: args.sample_rate,
        ..NesConfig::default()
    };
    let mut nes = Nes::with_config(config);
    let cartridge = nescore::Cartridge::from_ines_file(&args.rom)?;
    info!(
        mapper = cartridge.mapper_id(),
        prg = cartridge.prg_rom_len(),
        chr = cartridge.chr_len(),
        fingerprint = %cartridge.fingerprint_hex(),
        "loaded {}",
        args.rom.display()
    );
    nes.insert_cartridge(cartridge);

    if let Some(pc) = args.start_pc {
        nes.cpu_mut().set_pc(pc);
        nes.cpu_mut().state_mut().status = Status::from_bits_retain(0x24);
        info!("starting at ${pc:04X}");
    }

    if let Some(path) = &args.trace {
        let mut out = BufWriter::new(File::create(path)?);
        let mut failed = false;
        nes.set_tracer(move |line| {
            if failed {
                return;
            }
            if let Err(e) = writeln!(out, "{line}") {
                warn!("trace output stopped: {e}");
                failed = true;
            }
        });
    }

    for _ in 0..args.frames {
        nes.run_frame();
    }
    // Drops the tracer, flushing its writer.
    nes.clear_tracer();

    let cpu = nes.cpu().state();
    info!(
        frames = nes.frame_count(),
        cycles = nes.cpu().total_cycles(),
        "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} PC:{:04X}",
        cpu.a,
        cpu.x,
        cpu.y,
        cpu.status.bits(),
        cpu.sp,
        cpu.pc
    );
    if let Some(cart) = nes.bus().cartridge() {
        info!("{}", cart.describe());
    }

    #[cfg(feature = "screenshot")]
    if let Some(path) = &args.screenshot {
        nes.save_screenshot(path)?;
        info!("screenshot written to {}", path.display());
    }

    Ok(())
}
