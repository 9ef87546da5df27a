//! `cpucfg` words describing the constant-frequency timer clock
//!
//! The memory PLL is fed from the same reference as the constant timer, so
//! the reference clock is recovered from `CPUCFG.4` (base frequency in Hz)
//! and `CPUCFG.5` (multiplier in bits 0-15, divider in bits 16-31).
//!
//! ## References
//!
//! - LoongArch Reference Manual Volume 1, Section 2.2.10.5 (`CPUCFG`)

use crate::register::field;

/// `cpucfg` word holding the constant-clock base frequency in Hz
pub const CPUCFG_CC_FREQ: u32 = 0x4;

/// `cpucfg` word holding the constant-clock multiplier/divider pair
pub const CPUCFG_CC_MUL_DIV: u32 = 0x5;

const HZ_PER_MHZ: u64 = 1_000_000;

/// Constant-clock configuration assembled from `CPUCFG.4` and `CPUCFG.5`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantClock {
    /// Base frequency in Hz
    pub cc_freq: u32,
    pub cc_mul: u16,
    pub cc_div: u16,
}

impl ConstantClock {
    pub fn from_cpucfg(cfg4: u32, cfg5: u32) -> Self {
        Self {
            cc_freq: cfg4,
            cc_mul: field(cfg5 as u64, 0, 16) as u16,
            cc_div: field(cfg5 as u64, 16, 16) as u16,
        }
    }

    /// Reference clock in MHz: `cc_freq * cc_mul / cc_div / 1_000_000`
    ///
    /// Returns `None` when the divider is zero.
    pub fn ref_clk_mhz(&self) -> Option<u32> {
        let hz = (self.cc_freq as u64 * self.cc_mul as u64).checked_div(self.cc_div as u64)?;
        u32::try_from(hz / HZ_PER_MHZ).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cpucfg() {
        let clock = ConstantClock::from_cpucfg(100_000_000, (1 << 16) | 1);
        assert_eq!(clock.cc_mul, 1);
        assert_eq!(clock.cc_div, 1);
        assert_eq!(clock.ref_clk_mhz(), Some(100));
    }

    #[test]
    fn test_ref_clk_scaling() {
        // 25 MHz crystal scaled by 4/1
        let clock = ConstantClock::from_cpucfg(25_000_000, (1 << 16) | 4);
        assert_eq!(clock.ref_clk_mhz(), Some(100));

        // 100 MHz scaled by 2/3 truncates to 66
        let clock = ConstantClock::from_cpucfg(100_000_000, (3 << 16) | 2);
        assert_eq!(clock.ref_clk_mhz(), Some(66));
    }

    #[test]
    fn test_ref_clk_zero_divider() {
        let clock = ConstantClock::from_cpucfg(100_000_000, 1);
        assert_eq!(clock.ref_clk_mhz(), None);
    }
}
