// Timing and frequency decode for a responding memory controller

use loongimc_raw::current_arch::chip::{MemClockConfig, IOCSR_MEM_CLOCK_CONF};
use loongimc_raw::current_arch::cpucfg::{ConstantClock, CPUCFG_CC_FREQ, CPUCFG_CC_MUL_DIV};
use loongimc_raw::current_arch::imc::{offset, BusWidth, MC_CONF_ADDRESS};
use loongimc_raw::RegisterLayout;

use crate::common::cpucfg::CpuIntrospection;
use crate::common::mmio::RegisterAccess;
use crate::error::Result;

/// DRAM timings in memory clocks, as programmed into the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImcTimings {
    pub tcl: u16,
    /// Fractional part of tCL; these controllers only program whole clocks
    pub tcl_dec: u16,
    pub trp: u16,
    pub trcd: u16,
    pub tras: u16,
    pub width: BusWidth,
}

/// Read the timing parameters from the exposed controller window
pub fn read_timings<A: RegisterAccess>(access: &A) -> Result<ImcTimings> {
    let byte = |off: u64| access.read8(MC_CONF_ADDRESS + off);

    let timings = ImcTimings {
        tcl: byte(offset::TCL)? as u16,
        tcl_dec: 0,
        trp: byte(offset::TRP)? as u16,
        trcd: byte(offset::TRCD)? as u16,
        tras: byte(offset::TRAS)? as u16,
        width: BusWidth::from_code(byte(offset::DATA_WIDTH)?),
    };

    tracing::debug!("Decoded controller timings: {:?}", timings);
    Ok(timings)
}

/// Memory clock in MHz, 0 when a divider reads as zero or the result overflows
pub fn memory_frequency<C: CpuIntrospection>(cpu: &C) -> Result<u32> {
    let raw = cpu.iocsr_read32(IOCSR_MEM_CLOCK_CONF)?;
    let conf = MemClockConfig::from_raw(raw as u64);

    let clock = ConstantClock::from_cpucfg(
        cpu.cpucfg(CPUCFG_CC_FREQ),
        cpu.cpucfg(CPUCFG_CC_MUL_DIV),
    );
    let Some(ref_clk) = clock.ref_clk_mhz() else {
        tracing::warn!("Constant clock divider is zero ({:?})", clock);
        return Ok(0);
    };

    tracing::debug!(
        "Memory PLL: ref_clk={} MHz loopc={} refc={} div={} div_mode={}",
        ref_clk,
        conf.loopc,
        conf.refc,
        conf.div,
        conf.div_mode()
    );

    if conf.has_zero_divider() {
        tracing::warn!("Memory PLL configuration 0x{:08X} has a zero divider", raw);
        return Ok(0);
    }

    Ok(conf.memory_frequency(ref_clk).unwrap_or_else(|| {
        tracing::warn!(
            "Memory frequency overflows for ref_clk={} MHz and PLL configuration 0x{:08X}",
            ref_clk,
            raw
        );
        0
    }))
}
