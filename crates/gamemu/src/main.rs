use std::path::PathBuf;

use clap::Parser;
use gamemu::EmulatorConfig;

/// Headless DMG runner: executes a ROM-only cartridge for a number of
/// machine cycles.
#[derive(Parser)]
#[command(name = "gamemu", version)]
struct Args {
    /// Path to the cartridge ROM
    rom: PathBuf,

    /// Path to a 256-byte DMG boot ROM
    #[arg(long)]
    boot_rom: Option<PathBuf>,

    /// Number of machine cycles to run
    #[arg(long, default_value_t = gamemu::DEFAULT_CYCLES)]
    cycles: u64,

    /// Log the CPU registers when the run ends
    #[arg(long)]
    dump_registers: bool,
}

impl From<Args> for EmulatorConfig {
    fn from(args: Args) -> Self {
        EmulatorConfig {
            rom: args.rom,
            boot_rom: args.boot_rom,
            cycles: args.cycles,
            dump_registers: args.dump_registers,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = EmulatorConfig::from(Args::parse());
    log::info!("Running '{}' for {} cycles", config.rom.display(), config.cycles);

    let report = gamemu::run(&config)?;
    println!(
        "{} cycles: {}",
        report.cycles,
        gamemu::format_registers(&report.registers)
    );
    Ok(())
}
