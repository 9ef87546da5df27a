// Simulated register file and CPU for exercising the prober without hardware

use std::collections::HashMap;

use loongimc_raw::current_arch::chip::{self, ChannelMode, CHIP_CONF_ADDRESS};
use loongimc_raw::current_arch::imc::MC_CONF_ADDRESS;

use crate::common::cpucfg::CpuIntrospection;
use crate::common::mmio::RegisterAccess;
use crate::error::{LoongImcError, Result};

/// One recorded register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read8(u64),
    Read64(u64),
    Write64(u64, u64),
}

#[derive(Debug, Default)]
struct SimState {
    words: HashMap<u64, u64>,
    /// Controller windows: (channel, byte offset) -> value
    windows: HashMap<(u8, u64), u8>,
    log: Vec<Access>,
}

/// In-memory stand-in for the chip and controller configuration windows
///
/// The controller window only "appears" while exactly one channel has its
/// enable/route bit cleared; reads then come from that channel's bytes.
/// Otherwise the window reads as 0xFF, like an unrouted bus.
#[derive(Debug)]
pub struct SimRegisters {
    mode: ChannelMode,
    max_channels: u8,
    state: parking_lot::Mutex<SimState>,
}

impl SimRegisters {
    /// All channels enabled (bits set), every controller window absent
    pub fn new(mode: ChannelMode, max_channels: u8) -> Self {
        let sim = Self {
            mode,
            max_channels,
            state: parking_lot::Mutex::new(SimState::default()),
        };

        {
            let mut state = sim.state.lock();
            for index in 0..max_channels {
                let addr = Self::control_address(mode, index);
                let word = state.words.entry(addr).or_insert(0);
                *word |= chip::enable_mask(mode, index);
            }
        }

        sim
    }

    fn control_address(mode: ChannelMode, index: u8) -> u64 {
        chip::channel_address(CHIP_CONF_ADDRESS, mode, index)
    }

    /// Set a controller window byte for `channel`
    pub fn set_window_byte(&self, channel: u8, offset: u64, value: u8) {
        self.state.lock().windows.insert((channel, offset), value);
    }

    /// Set a 64-bit register word
    pub fn set_word(&self, addr: u64, value: u64) {
        self.state.lock().words.insert(addr, value);
    }

    pub fn word(&self, addr: u64) -> u64 {
        self.state.lock().words.get(&addr).copied().unwrap_or(0)
    }

    pub fn log(&self) -> Vec<Access> {
        self.state.lock().log.clone()
    }

    fn exposed_channel(&self, state: &SimState) -> Option<u8> {
        let mut exposed = (0..self.max_channels).filter(|&index| {
            let word = state
                .words
                .get(&Self::control_address(self.mode, index))
                .copied()
                .unwrap_or(0);
            word & chip::enable_mask(self.mode, index) == 0
        });

        match (exposed.next(), exposed.next()) {
            (Some(index), None) => Some(index),
            _ => None,
        }
    }
}

impl RegisterAccess for SimRegisters {
    fn read8(&self, addr: u64) -> Result<u8> {
        let mut state = self.state.lock();
        state.log.push(Access::Read8(addr));

        let offset = addr.checked_sub(MC_CONF_ADDRESS).ok_or_else(|| {
            LoongImcError::MemError(format!("Unmapped simulated byte 0x{addr:X}"))
        })?;

        let value = match self.exposed_channel(&state) {
            Some(channel) => state.windows.get(&(channel, offset)).copied().unwrap_or(0),
            None => 0xFF,
        };
        Ok(value)
    }

    fn read64(&self, addr: u64) -> Result<u64> {
        let mut state = self.state.lock();
        state.log.push(Access::Read64(addr));
        Ok(state.words.get(&addr).copied().unwrap_or(0))
    }

    fn write64(&self, addr: u64, value: u64) -> Result<()> {
        let mut state = self.state.lock();
        state.log.push(Access::Write64(addr, value));
        state.words.insert(addr, value);
        Ok(())
    }
}

/// Fixed CPU introspection values
#[derive(Debug, Clone, Copy, Default)]
pub struct SimCpu {
    pub cpucfg4: u32,
    pub cpucfg5: u32,
    pub mem_clock_conf: Option<u32>,
}

impl CpuIntrospection for SimCpu {
    fn cpucfg(&self, index: u32) -> u32 {
        match index {
            4 => self.cpucfg4,
            5 => self.cpucfg5,
            _ => 0,
        }
    }

    fn iocsr_read32(&self, reg: u32) -> Result<u32> {
        self.mem_clock_conf
            .ok_or_else(|| LoongImcError::IocsrError(format!("IOCSR 0x{reg:X} not simulated")))
    }
}
