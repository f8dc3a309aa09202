use std::fmt;

/// Failures the core surfaces to a host. Distinct from the per-opcode
/// `CpuResult<T>` used internally by instruction handlers, which carries a
/// plain `String` the same way the teacher's opcode functions do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmulatorError {
    /// One of 0xD3,0xDB,0xDD,0xE3,0xE4,0xEB,0xEC,0xED,0xF4,0xFC,0xFD was
    /// fetched. Not recoverable without `Emulator::reset`.
    IllegalOpcode { opcode: u8, pc: u16 },
    /// `load_rom` was given more than 0x8000 bytes; the excess is
    /// truncated but the host is told so it can warn about a bad image.
    RomTooLarge { len: usize },
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorError::IllegalOpcode { opcode, pc } => write!(
                f,
                "illegal opcode {:#04X} fetched at PC={:#06X}",
                opcode, pc
            ),
            EmulatorError::RomTooLarge { len } => {
                write!(f, "ROM image of {} bytes truncated to 0x8000", len)
            }
        }
    }
}

impl std::error::Error for EmulatorError {}
