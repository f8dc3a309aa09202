use super::instruction::CB_INSTRUCTIONS;
use super::{Cpu, CpuResult, constants::*};
use crate::mmu::Mmu;

// --- Control Flow Implementations ---
impl Cpu {
    // NOP
    pub fn op_nop(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        Ok(0)
    }

    // JP a16 / JP HL / JP cc, a16
    fn conditional_jp_a16(&mut self, condition: bool, mmu: &Mmu) -> CpuResult<u16> {
        let addr = self.read_d16(mmu);
        if condition {
            self.pc = addr;
            Ok(4) // Branch taken costs 4 extra cycles (total 16)
        } else {
            Ok(0) // Branch not taken costs 0 extra cycles (total 12)
        }
    }
    pub fn op_jp_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.pc = self.read_d16(mmu);
        Ok(0) // Unconditional JP takes 16 base cycles
    }
    pub fn op_jp_hl(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.pc = self.get_hl();
        Ok(0) // JP HL takes 4 base cycles
    }
    pub fn op_jp_nz_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jp_a16(!self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_jp_z_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jp_a16(self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_jp_nc_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jp_a16(!self.get_flag(FLAG_C), mmu)
    }
    pub fn op_jp_c_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jp_a16(self.get_flag(FLAG_C), mmu)
    }

    // JR r8 / JR cc, r8
    fn conditional_jr(&mut self, condition: bool, mmu: &Mmu) -> CpuResult<u16> {
        let offset = self.read_r8(mmu);
        if condition {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            Ok(4) // Branch taken costs 4 extra cycles (total 12)
        } else {
            Ok(0) // Branch not taken costs 0 extra cycles (total 8)
        }
    }
    pub fn op_jr_r8(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        let offset = self.read_r8(mmu);
        self.pc = self.pc.wrapping_add(offset as i16 as u16);
        Ok(0) // Unconditional JR takes 12 base cycles
    }
    pub fn op_jr_nz_r8(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jr(!self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_jr_z_r8(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jr(self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_jr_nc_r8(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jr(!self.get_flag(FLAG_C), mmu)
    }
    pub fn op_jr_c_r8(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_jr(self.get_flag(FLAG_C), mmu)
    }

    // CALL a16 / CALL cc, a16
    fn conditional_call_a16(&mut self, condition: bool, mmu: &mut Mmu) -> CpuResult<u16> {
        let addr = self.read_d16(mmu);
        if condition {
            self.push_word(self.pc, mmu); // Push address *after* CALL instruction
            self.pc = addr;
            Ok(12) // Branch taken costs 12 extra cycles (total 24)
        } else {
            Ok(0) // Branch not taken costs 0 extra cycles (total 12)
        }
    }
    pub fn op_call_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        let addr = self.read_d16(mmu);
        self.push_word(self.pc, mmu);
        self.pc = addr;
        Ok(0) // Unconditional CALL takes 24 base cycles
    }
    pub fn op_call_nz_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_call_a16(!self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_call_z_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_call_a16(self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_call_nc_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_call_a16(!self.get_flag(FLAG_C), mmu)
    }
    pub fn op_call_c_a16(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_call_a16(self.get_flag(FLAG_C), mmu)
    }

    // RET / RET cc / RETI
    fn conditional_ret(&mut self, condition: bool, mmu: &mut Mmu) -> CpuResult<u16> {
        if condition {
            self.pc = self.pop_word(mmu);
            Ok(12) // Branch taken costs 12 extra cycles (total 20)
        } else {
            Ok(0) // Branch not taken costs 0 extra cycles (total 8)
        }
    }
    pub fn op_ret(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.pc = self.pop_word(mmu);
        Ok(0) // Unconditional RET takes 16 base cycles
    }
    pub fn op_ret_nz(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_ret(!self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_ret_z(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_ret(self.get_flag(FLAG_Z), mmu)
    }
    pub fn op_ret_nc(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_ret(!self.get_flag(FLAG_C), mmu)
    }
    pub fn op_ret_c(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.conditional_ret(self.get_flag(FLAG_C), mmu)
    }
    pub fn op_reti(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.pc = self.pop_word(mmu);
        self.ime = true;
        self.ime_scheduled = false;
        Ok(0) // RETI takes 16 base cycles
    }

    // RST n
    fn rst(&mut self, vector: u16, mmu: &mut Mmu) -> CpuResult<u16> {
        self.push_word(self.pc, mmu);
        self.pc = vector;
        Ok(0) // RST takes 16 base cycles
    }
    pub fn op_rst_00h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0000, mmu)
    }
    pub fn op_rst_08h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0008, mmu)
    }
    pub fn op_rst_10h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0010, mmu)
    }
    pub fn op_rst_18h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0018, mmu)
    }
    pub fn op_rst_20h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0020, mmu)
    }
    pub fn op_rst_28h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0028, mmu)
    }
    pub fn op_rst_30h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0030, mmu)
    }
    pub fn op_rst_38h(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        self.rst(0x0038, mmu)
    }

    // Misc Control
    pub fn op_di(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.ime = false;
        self.ime_scheduled = false;
        Ok(0)
    }
    pub fn op_ei(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.ime_scheduled = true;
        Ok(0)
    }
    // Interrupts are never dispatched in this core, so HALT has no wake
    // condition to check: it's always a 4-T no-op from here on.
    pub fn op_halt(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.enter_halt();
        Ok(0)
    }
    pub fn op_stop(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.stop_requested = true;
        log::warn!(
            "STOP instruction encountered at PC={:#06X} (behavior may be incomplete)",
            self.instruction_pc
        );
        Ok(0)
    }

    // Flags
    pub fn op_scf(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, true);
        Ok(0)
    }
    pub fn op_ccf(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        let current_c = self.get_flag(FLAG_C);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, !current_c);
        Ok(0)
    }

    // Misc ALU/Data
    pub fn op_cpl(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.a = !self.a;
        self.set_flag(FLAG_N | FLAG_H, true);
        Ok(0)
    }
    pub fn op_daa(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        self.daa();
        Ok(0)
    }

    // --- CB Prefix Dispatcher ---
    pub fn op_prefix_cb(&mut self, mmu: &mut Mmu) -> CpuResult<u16> {
        let cb_opcode = mmu.read_byte(self.instruction_pc.wrapping_add(1));
        let cb_instr = &CB_INSTRUCTIONS[cb_opcode as usize];
        let cb_result = (cb_instr.execute)(self, mmu);
        match cb_result {
            Ok(_) => Ok(cb_instr.cycles as u16),
            Err(e) => Err(format!("CB Opcode {:#04X} Error: {}", cb_opcode, e)),
        }
    }

    // --- Invalid Opcode Handler ---
    pub fn handle_invalid_opcode(&mut self, _mmu: &mut Mmu) -> CpuResult<u16> {
        Err("Invalid/Unknown Opcode encountered".to_string())
    }
}
