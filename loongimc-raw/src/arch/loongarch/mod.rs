//! Loongson LoongArch register definitions
//!
//! ## Register Windows
//!
//! - **imc** - per-channel memory-controller configuration window
//! - **chip** - chip configuration window (channel enable/route bits) and
//!   the IOCSR clock configuration word
//! - **cpucfg** - `cpucfg` words describing the constant-clock reference
//!
//! ## References
//!
//! - Loongson 3A5000/3B5000 Processor Register Manual
//! - LoongArch Reference Manual Volume 1: Basic Architecture, `CPUCFG`

pub mod chip;
pub mod cpucfg;
pub mod imc;
