//! Architecture-specific register definitions
//!
//! Each Loongson family routes its memory-controller configuration space
//! differently, but the register map inside the controller window is shared.
//! This module provides the definitions organised by ISA.
//!
//! ## Supported Architectures
//!
//! - **LoongArch** (`loongarch` feature) - Loongson 3A5000/3A6000, 3B/3C/3D/3E
//!   server parts, 3B6000M and the 2K embedded family

#[cfg(feature = "loongarch")]
pub mod loongarch;
