//! # loongimc-raw
//!
//! Register definitions for the Loongson LoongArch integrated memory controller.
//!
//! This crate provides the fixed register map used to locate a responding
//! memory-controller channel, typed layouts for the clock configuration words,
//! and a `/dev/mem` primitive for reaching the windows from user space.
//!
//! ## Features
//!
//! - `loongarch` (default) - LoongArch register definitions
//!
//! ## Usage
//!
//! ```ignore
//! use loongimc_raw::current_arch::{chip, imc};
//! use loongimc_raw::PhysMem;
//!
//! let mut mem = PhysMem::open(loongimc_raw::mem::DEV_MEM)?;
//! let ctrl = chip::channel_address(chip::CHIP_CONF_ADDRESS, chip::ChannelMode::Direct, 0);
//! let value = mem.read64(ctrl)?;
//! mem.write64(ctrl, value & !chip::enable_mask(chip::ChannelMode::Direct, 0))?;
//! let tcl = mem.read8(imc::MC_CONF_ADDRESS + imc::offset::TCL)?;
//! mem.write64(ctrl, value)?;
//! ```

pub mod arch;
pub mod mem;
pub mod register;

// Re-export for convenience
pub use mem::{MemError, PhysMem, Result};
pub use register::RegisterLayout;

#[cfg(feature = "loongarch")]
pub use arch::loongarch as current_arch;
