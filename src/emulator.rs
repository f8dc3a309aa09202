use crate::cpu::{Cpu, RegisterSnapshot};
use crate::error::EmulatorError;
use crate::mmu::Mmu;
use crate::ppu::{Framebuffer, Ppu};

/// T-cycles in one full frame: 456 dots/scanline * 154 scanlines.
const CYCLES_PER_FRAME: u32 = 70_224;

/// Owns the CPU, memory map, and PPU, and drives them together one
/// instruction or one frame at a time. A host wraps this with input,
/// audio, and presentation; none of that lives in here.
pub struct Emulator {
    cpu: Cpu,
    mmu: Mmu,
    ppu: Ppu,
}

impl Emulator {
    /// Creates a fresh machine. When `skip_boot_rom` is true the CPU starts
    /// with post-boot register values and the BIOS overlay is unmapped
    /// immediately, as if the boot ROM had already run and handed off.
    pub fn new(skip_boot_rom: bool) -> Self {
        let mut mmu = Mmu::new();
        if skip_boot_rom {
            mmu.unmap_bios();
            Cpu::initialize_post_boot_io(&mut mmu);
        }
        Emulator {
            cpu: Cpu::new(skip_boot_rom),
            mmu,
            ppu: Ppu::new(),
        }
    }

    /// Resets to a fresh post-boot machine, keeping no state from before.
    pub fn reset(&mut self) {
        *self = Emulator::new(true);
    }

    /// Loads a cartridge image into ROM space. Returns `Some` if the image
    /// was larger than the fixed 32KiB ROM window and had to be truncated.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Option<EmulatorError> {
        self.mmu.load_rom(bytes)
    }

    /// Loads a boot ROM image to run before the cartridge's own code.
    pub fn load_bios(&mut self, bytes: &[u8]) {
        self.mmu.load_bios(bytes);
    }

    /// Executes exactly one CPU instruction and ticks the PPU for the
    /// T-cycles it consumed. Returns the cycle count spent.
    pub fn step(&mut self) -> Result<u16, EmulatorError> {
        let cycles = self.cpu.step(&mut self.mmu)?;
        self.ppu.step(cycles as u32, &mut self.mmu);
        Ok(cycles)
    }

    /// Runs instructions until a full frame (70,224 T-cycles) has elapsed,
    /// then returns the rendered framebuffer. Stops early on an illegal
    /// opcode.
    pub fn run_frame(&mut self) -> Result<&Framebuffer, EmulatorError> {
        let mut cycles_this_frame: u32 = 0;
        while cycles_this_frame < CYCLES_PER_FRAME {
            let cycles = self.step()?;
            cycles_this_frame += cycles as u32;
        }
        Ok(self.ppu.frame_buffer())
    }

    /// Read-only snapshot of CPU register state.
    pub fn registers(&self) -> RegisterSnapshot {
        self.cpu.registers()
    }

    /// True once an illegal opcode has been fetched. `step`/`run_frame` keep
    /// returning the same error without advancing further until a reset.
    pub fn is_illegal_opcode_halted(&self) -> bool {
        self.cpu.illegal_opcode_halted()
    }

    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    pub fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_boot_rom_unmaps_bios_and_starts_at_cartridge_entry() {
        let emu = Emulator::new(true);
        assert_eq!(emu.registers().pc, 0x0100);
    }

    #[test]
    fn jp_instruction_updates_pc_after_one_step() {
        let mut emu = Emulator::new(true);
        let mut rom = vec![0x00; 0x8000];
        // JP 0x0150
        rom[0x0100] = 0xC3;
        rom[0x0101] = 0x50;
        rom[0x0102] = 0x01;
        emu.load_rom(&rom);
        emu.step().unwrap();
        assert_eq!(emu.registers().pc, 0x0150);
    }

    #[test]
    fn call_then_ret_round_trips_pc() {
        let mut emu = Emulator::new(true);
        let mut rom = vec![0x00; 0x8000];
        // CALL 0x0200
        rom[0x0100] = 0xCD;
        rom[0x0101] = 0x00;
        rom[0x0102] = 0x02;
        // at 0x0200: RET
        rom[0x0200] = 0xC9;
        emu.load_rom(&rom);
        emu.step().unwrap(); // CALL
        assert_eq!(emu.registers().pc, 0x0200);
        emu.step().unwrap(); // RET
        assert_eq!(emu.registers().pc, 0x0103);
    }

    #[test]
    fn illegal_opcode_surfaces_as_emulator_error() {
        let mut emu = Emulator::new(true);
        let mut rom = vec![0x00; 0x8000];
        rom[0x0100] = 0xD3; // illegal
        rom[0x0101] = 0x00; // NOP, must never be reached
        emu.load_rom(&rom);
        assert!(!emu.is_illegal_opcode_halted());

        let err = emu.step().unwrap_err();
        assert_eq!(
            err,
            EmulatorError::IllegalOpcode {
                opcode: 0xD3,
                pc: 0x0100
            }
        );
        assert!(emu.is_illegal_opcode_halted());
        let pc_after_first_step = emu.registers().pc;

        // stays halted: a second step (and run_frame) must not execute past it
        let err_again = emu.step().unwrap_err();
        assert_eq!(
            err_again,
            EmulatorError::IllegalOpcode {
                opcode: 0xD3,
                pc: 0x0100
            }
        );
        assert_eq!(emu.registers().pc, pc_after_first_step);
        assert!(emu.run_frame().is_err());
        assert_eq!(emu.registers().pc, pc_after_first_step);
    }

    #[test]
    fn run_frame_advances_ppu_and_reports_frame_ready() {
        let mut emu = Emulator::new(true);
        let rom = vec![0x00; 0x8000]; // all NOPs
        emu.load_rom(&rom);
        emu.run_frame().unwrap();
        assert!(emu.ppu().current_scanline() <= 153);
    }
}
