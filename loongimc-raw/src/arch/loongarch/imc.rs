//! Memory-controller configuration window for LoongArch parts
//!
//! Once the channel's enable bit in the chip configuration window has been
//! cleared, the controller's configuration space becomes visible at
//! [`MC_CONF_ADDRESS`]. Only the handful of byte-wide parameters needed for a
//! DDR4 timing summary are described here.
//!
//! ## References
//!
//! - Loongson 3A5000/3B5000 Processor Register Manual
//! - Section: Memory Controller Parameter Registers

use crate::mem::DMW_UNCACHED;

/// Memory-controller configuration window (uncached DMW address)
pub const MC_CONF_ADDRESS: u64 = DMW_UNCACHED | 0x0FF0_0000;

/// Byte offsets into the controller configuration window
pub mod offset {
    /// Presence probe; reads 0x00 or 0xFF when the window is not routed
    pub const PRESENCE: u64 = 0x0000;

    /// tRP (row precharge), in memory clocks
    pub const TRP: u64 = 0x1006;

    /// Data bus width code (low 3 bits)
    pub const DATA_WIDTH: u64 = 0x1024;

    /// tRAS (row active time), in memory clocks
    pub const TRAS: u64 = 0x1040;

    /// tRCD (RAS to CAS delay), in memory clocks
    pub const TRCD: u64 = 0x1047;

    /// tCL (CAS latency), in memory clocks
    pub const TCL: u64 = 0x1060;
}

/// Mask of the data width code inside [`offset::DATA_WIDTH`]
pub const DATA_WIDTH_MASK: u8 = 0x7;

/// Returns true when a presence byte indicates an unrouted/absent controller
#[inline]
pub const fn is_absent(presence: u8) -> bool {
    presence == 0x00 || presence == 0xFF
}

/// DRAM data bus width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BusWidth {
    X16,
    X32,
    X64,
    #[default]
    Unknown,
}

impl BusWidth {
    /// Decode the data width code; only the low 3 bits are significant
    ///
    /// | Code | Width |
    /// |------|-------|
    /// | 0    | 64    |
    /// | 3    | 16    |
    /// | 5    | 32    |
    /// | else | unknown |
    pub fn from_code(code: u8) -> Self {
        match code & DATA_WIDTH_MASK {
            0 => BusWidth::X64,
            3 => BusWidth::X16,
            5 => BusWidth::X32,
            _ => BusWidth::Unknown,
        }
    }

    /// Width in bits, 0 when unknown
    pub fn bits(&self) -> u16 {
        match self {
            BusWidth::X16 => 16,
            BusWidth::X32 => 32,
            BusWidth::X64 => 64,
            BusWidth::Unknown => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_width_decode() {
        assert_eq!(BusWidth::from_code(0).bits(), 64);
        assert_eq!(BusWidth::from_code(3).bits(), 16);
        assert_eq!(BusWidth::from_code(5).bits(), 32);
        for code in [1u8, 2, 4, 6, 7] {
            assert_eq!(BusWidth::from_code(code), BusWidth::Unknown);
            assert_eq!(BusWidth::from_code(code).bits(), 0);
        }
    }

    #[test]
    fn test_bus_width_ignores_high_bits() {
        assert_eq!(BusWidth::from_code(0xF8), BusWidth::X64);
        assert_eq!(BusWidth::from_code(0x0B), BusWidth::X16);
        assert_eq!(BusWidth::from_code(0x25), BusWidth::X32);
    }

    #[test]
    fn test_presence_sentinels() {
        assert!(is_absent(0x00));
        assert!(is_absent(0xFF));
        assert!(!is_absent(0x01));
        assert!(!is_absent(0xFE));
    }
}
