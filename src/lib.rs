//! A cycle-accurate core for a Sharp SM83 handheld console: CPU, memory map,
//! and PPU, driven one frame at a time by a host that owns input, audio, and
//! presentation.

mod emulator;
mod error;
mod memory_map;
mod mmu;

pub mod cpu;
pub mod ppu;

pub use cpu::{Cpu, RegisterSnapshot};
pub use emulator::Emulator;
pub use error::EmulatorError;
pub use mmu::Mmu;
pub use ppu::{Framebuffer, GB_HEIGHT, GB_WIDTH, Ppu};
