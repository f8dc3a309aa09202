use super::{Cpu, CpuResult, constants::*};
use crate::mmu::Mmu;

// --- Rotate/Shift Implementations (Non-CB prefixed) ---
impl Cpu {
    // RLCA
    pub fn op_rlca(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.a = self.rlc(self.a);
        self.set_flag(FLAG_Z, false); // Special case: Z flag is cleared
        Ok(0)
    }
    // RLA
    pub fn op_rla(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.a = self.rl(self.a);
        self.set_flag(FLAG_Z, false); // Special case: Z flag is cleared
        Ok(0)
    }
    // RRCA
    pub fn op_rrca(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.a = self.rrc(self.a);
        self.set_flag(FLAG_Z, false); // Special case: Z flag is cleared
        Ok(0)
    }
    // RRA
    pub fn op_rra(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.a = self.rr(self.a);
        self.set_flag(FLAG_Z, false); // Special case: Z flag is cleared
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmu::Mmu;

    #[test]
    fn rlca_clears_zero_flag_even_when_result_is_zero() {
        let mut cpu = Cpu::new(true);
        let mut mmu = Mmu::new();
        cpu.a = 0x00;
        cpu.op_rlca(&mut mmu).unwrap();
        assert_eq!(cpu.a, 0x00);
        assert!(!cpu.get_flag(FLAG_Z));
    }

    #[test]
    fn rla_rotates_through_carry() {
        let mut cpu = Cpu::new(true);
        let mut mmu = Mmu::new();
        cpu.a = 0x80;
        cpu.set_flag(FLAG_C, true);
        cpu.op_rla(&mut mmu).unwrap();
        assert_eq!(cpu.a, 0x01);
        assert!(cpu.get_flag(FLAG_C));
    }
}
