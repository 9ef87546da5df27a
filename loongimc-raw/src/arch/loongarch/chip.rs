//! Chip configuration window and clock configuration for LoongArch parts
//!
//! Each memory controller is hidden behind an enable bit in the chip
//! function-setting register. Clearing that bit makes the controller's own
//! configuration space readable at the memory-controller window.
//!
//! Two topologies exist:
//!
//! - **Routed** (3C/3D/3E, 3B6000): one function-setting register per node,
//!   selected by the channel index in bits 16+ of the address; the route bit is
//!   always bit 4.
//! - **Direct** (3A/3B, 2K, 3B6000M): a single function-setting register; the
//!   enable bit for channel `i` sits at bit `4 + 5 * i`.
//!
//! ## References
//!
//! - Loongson 3A5000/3B5000 Processor Register Manual
//! - Section: Chip Configuration Registers, Function Setting Register

use crate::mem::DMW_UNCACHED;
use crate::register::{field, RegisterLayout};

/// Chip configuration window (uncached DMW address)
pub const CHIP_CONF_ADDRESS: u64 = DMW_UNCACHED | 0x1FE0_0000;

/// Function-setting register offset inside the chip configuration window
pub const FUNCTION_SETTING: u64 = 0x180;

/// Shift applied to the channel index in routed mode
pub const ROUTE_INDEX_SHIFT: u32 = 16;

/// Route/disable bit of a routed function-setting register
pub const ROUTE_BIT: u32 = 4;

/// Stride between per-channel enable bits in direct mode
pub const DIRECT_BIT_STRIDE: u32 = 5;

/// IOCSR address of the memory clock PLL configuration word
pub const IOCSR_MEM_CLOCK_CONF: u32 = 0x1C0;

/// How per-channel configuration space is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    /// Channel index encoded in the register address
    Routed,
    /// Channel index encoded in the enable bit position
    Direct,
}

/// Address of the function-setting register controlling `index`
///
/// # Example
///
/// ```
/// use loongimc_raw::current_arch::chip::{channel_address, ChannelMode, CHIP_CONF_ADDRESS};
///
/// assert_eq!(
///     channel_address(CHIP_CONF_ADDRESS, ChannelMode::Routed, 2),
///     0x8000_0000_1FE2_0180
/// );
/// assert_eq!(
///     channel_address(CHIP_CONF_ADDRESS, ChannelMode::Direct, 2),
///     0x8000_0000_1FE0_0180
/// );
/// ```
#[inline]
pub const fn channel_address(base: u64, mode: ChannelMode, index: u8) -> u64 {
    match mode {
        ChannelMode::Routed => base | ((index as u64) << ROUTE_INDEX_SHIFT) | FUNCTION_SETTING,
        ChannelMode::Direct => base | FUNCTION_SETTING,
    }
}

/// Bit mask of the enable/route bit for `index`
#[inline]
pub const fn enable_mask(mode: ChannelMode, index: u8) -> u64 {
    match mode {
        ChannelMode::Routed => 1 << ROUTE_BIT,
        ChannelMode::Direct => 1 << (ROUTE_BIT + index as u32 * DIRECT_BIT_STRIDE),
    }
}

/// Memory clock PLL configuration (IOCSR 0x1C0) layout
///
/// ## Register Format
///
/// | Bits   | Field    | Description                         |
/// |--------|----------|-------------------------------------|
/// | 4-5    | div_mode | Post divider mode, divides by 2^n   |
/// | 8-12   | refc     | Reference clock divider             |
/// | 14-23  | loopc    | Feedback loop multiplier            |
/// | 24-29  | div      | Output divider                      |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemClockConfig {
    /// Raw divider-mode selector; effective divisor is `1 << div_mode_sel`
    pub div_mode_sel: u8,
    pub refc: u8,
    pub loopc: u16,
    pub div: u8,
}

impl RegisterLayout for MemClockConfig {
    fn to_raw(&self) -> u64 {
        ((self.div_mode_sel as u64 & 0x3) << 4)
            | ((self.refc as u64 & 0x1F) << 8)
            | ((self.loopc as u64 & 0x3FF) << 14)
            | ((self.div as u64 & 0x3F) << 24)
    }

    fn from_raw(value: u64) -> Self {
        Self {
            div_mode_sel: field(value, 4, 2) as u8,
            refc: field(value, 8, 5) as u8,
            loopc: field(value, 14, 10) as u16,
            div: field(value, 24, 6) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.div_mode_sel > 3 {
            return Err("Divider mode must be <= 3 (2 bits)");
        }
        if self.refc > 31 {
            return Err("refc must be <= 31 (5 bits)");
        }
        if self.loopc > 1023 {
            return Err("loopc must be <= 1023 (10 bits)");
        }
        if self.div > 63 {
            return Err("div must be <= 63 (6 bits)");
        }
        Ok(())
    }
}

impl MemClockConfig {
    /// Effective post divider
    pub fn div_mode(&self) -> u32 {
        1 << self.div_mode_sel
    }

    /// True when `refc` or `div` is zero
    pub fn has_zero_divider(&self) -> bool {
        self.refc == 0 || self.div == 0
    }

    /// Memory frequency in MHz for a reference clock in MHz
    ///
    /// Evaluated as `ref_clk * loopc / refc / div / div_mode * 4`, truncating
    /// after every division. Returns `None` if a divider field is zero or
    /// the result does not fit in 32 bits.
    pub fn memory_frequency(&self, ref_clk_mhz: u32) -> Option<u32> {
        let freq = ref_clk_mhz.checked_mul(self.loopc as u32)?;
        let freq = freq.checked_div(self.refc as u32)?;
        let freq = freq.checked_div(self.div as u32)?;
        let freq = freq / self.div_mode();
        freq.checked_mul(4)
    }
}
