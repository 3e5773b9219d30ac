use std::path::PathBuf;

use anyhow::{Context, Result};
use gamemu_core::cpu::Registers;
use gamemu_core::{BootRom, Cartridge, GameBoy};
use typed_builder::TypedBuilder;

/// Default run length: about one second of DMG time in machine cycles.
pub const DEFAULT_CYCLES: u64 = 1_048_576;

#[derive(Debug, Clone, TypedBuilder)]
pub struct EmulatorConfig {
    #[builder(setter(into))]
    pub rom: PathBuf,
    #[builder(default, setter(strip_option, into))]
    pub boot_rom: Option<PathBuf>,
    #[builder(default = DEFAULT_CYCLES)]
    pub cycles: u64,
    #[builder(default = false)]
    pub dump_registers: bool,
}

/// Where a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub cycles: u64,
    pub registers: Registers,
}

/// Load the configured files into a new machine.
pub fn load(config: &EmulatorConfig) -> Result<GameBoy> {
    let cartridge = Cartridge::from_file(&config.rom)
        .with_context(|| format!("failed to load cartridge '{}'", config.rom.display()))?;
    log::info!(
        "Loaded cartridge '{}' ({})",
        cartridge.title(),
        config.rom.display()
    );

    let boot_rom = match &config.boot_rom {
        Some(path) => Some(
            BootRom::from_file(path)
                .with_context(|| format!("failed to load boot ROM '{}'", path.display()))?,
        ),
        None => None,
    };

    Ok(GameBoy::new(cartridge, boot_rom)?)
}

/// Build the machine and run it for `config.cycles` machine cycles.
pub fn run(config: &EmulatorConfig) -> Result<RunReport> {
    let mut gb = load(config)?;
    gb.run_until(config.cycles)
        .with_context(|| format!("emulation stopped after {} cycles", gb.cycles()))?;

    let report = RunReport {
        cycles: gb.cycles(),
        registers: gb.cpu().regs,
    };
    if config.dump_registers {
        log::info!("{}", format_registers(&report.registers));
    }
    Ok(report)
}

pub fn format_registers(regs: &Registers) -> String {
    format!(
        "PC={:04X} SP={:04X} AF={:04X} BC={:04X} DE={:04X} HL={:04X}",
        regs.pc,
        regs.sp,
        regs.af(),
        regs.bc(),
        regs.de(),
        regs.hl()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = EmulatorConfig::builder().rom("game.gb").build();
        assert_eq!(config.rom, PathBuf::from("game.gb"));
        assert_eq!(config.boot_rom, None);
        assert_eq!(config.cycles, DEFAULT_CYCLES);
        assert!(!config.dump_registers);
    }

    #[test]
    fn builder_overrides() {
        let config = EmulatorConfig::builder()
            .rom("game.gb")
            .boot_rom("dmg_boot.bin")
            .cycles(100)
            .dump_registers(true)
            .build();
        assert_eq!(config.boot_rom, Some(PathBuf::from("dmg_boot.bin")));
        assert_eq!(config.cycles, 100);
        assert!(config.dump_registers);
    }

    #[test]
    fn runs_a_rom_from_disk() {
        let mut rom = vec![0u8; 0x8000];
        // LD B,0x07 ; HALT
        rom[0x0100..0x0103].copy_from_slice(&[0x06, 0x07, 0x76]);
        let path = std::env::temp_dir().join(format!("gamemu-run-{}.gb", std::process::id()));
        std::fs::write(&path, &rom).unwrap();

        let config = EmulatorConfig::builder()
            .rom(path.clone())
            .cycles(10)
            .dump_registers(true)
            .build();
        let report = run(&config);
        std::fs::remove_file(&path).unwrap();

        let report = report.unwrap();
        assert_eq!(report.cycles, 10);
        assert_eq!(report.registers.b, 0x07);
        assert_eq!(report.registers.pc, 0x0103);
    }

    #[test]
    fn missing_rom_reports_the_path() {
        let config = EmulatorConfig::builder()
            .rom("/nonexistent/gamemu/missing.gb")
            .build();
        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("missing.gb"));
    }

    #[test]
    fn register_dump_format() {
        let regs = Registers {
            a: 0x01,
            f: 0xB0,
            c: 0x13,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            sp: 0xFFFE,
            pc: 0x0100,
            ..Registers::default()
        };
        assert_eq!(
            format_registers(&regs),
            "PC=0100 SP=FFFE AF=01B0 BC=0013 DE=00D8 HL=014D"
        );
    }
}
