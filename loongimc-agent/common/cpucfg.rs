use loongimc_raw::current_arch::chip::IOCSR_MEM_CLOCK_CONF;

use crate::error::{LoongImcError, Result};

/// CPU-local configuration queries needed to recover the memory clock
pub trait CpuIntrospection {
    /// Read a `cpucfg` word
    fn cpucfg(&self, index: u32) -> u32;

    /// Read a 32-bit IOCSR register
    fn iocsr_read32(&self, reg: u32) -> Result<u32>;
}

#[cfg(target_arch = "loongarch64")]
pub fn cpucfg(index: u32) -> u32 {
    let value: usize;

    unsafe {
        std::arch::asm!(
            "cpucfg {0}, {1}",
            out(reg) value,
            in(reg) index as usize,
            options(pure, nomem, preserves_flags, nostack)
        );
    }

    value as u32
}

#[cfg(not(target_arch = "loongarch64"))]
pub fn cpucfg(_index: u32) -> u32 {
    0
}

/// # Safety
///
/// `iocsrrd.w` is a PLV0 instruction; executing it from user space raises
/// an instruction privilege exception.
#[cfg(target_arch = "loongarch64")]
unsafe fn iocsr_read_w(reg: u32) -> u32 {
    let value: usize;

    std::arch::asm!(
        "iocsrrd.w {0}, {1}",
        out(reg) value,
        in(reg) reg as usize,
        options(nostack, preserves_flags)
    );

    value as u32
}

#[cfg(not(target_arch = "loongarch64"))]
unsafe fn iocsr_read_w(_reg: u32) -> u32 {
    0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IocsrSource {
    /// Running in user space; IOCSR is not reachable
    Unavailable,
    /// Running at PLV0; `iocsrrd.w` may be executed
    Privileged,
    /// Memory clock configuration word supplied by the caller
    MemClockConf(u32),
}

/// The running CPU
#[derive(Debug, Clone, Copy)]
pub struct NativeCpu {
    iocsr: IocsrSource,
}

impl NativeCpu {
    /// User-space access: `cpucfg` only
    pub fn user() -> Self {
        Self {
            iocsr: IocsrSource::Unavailable,
        }
    }

    /// Kernel/firmware access with direct IOCSR reads
    ///
    /// # Safety
    ///
    /// The caller must be executing at PLV0.
    pub unsafe fn privileged() -> Self {
        Self {
            iocsr: IocsrSource::Privileged,
        }
    }

    /// User-space access with a known memory clock configuration word
    pub fn with_mem_clock_conf(value: u32) -> Self {
        Self {
            iocsr: IocsrSource::MemClockConf(value),
        }
    }
}

impl CpuIntrospection for NativeCpu {
    fn cpucfg(&self, index: u32) -> u32 {
        let value = cpucfg(index);
        tracing::debug!("cpucfg 0x{:X} = 0x{:08X}", index, value);
        value
    }

    fn iocsr_read32(&self, reg: u32) -> Result<u32> {
        let value = match self.iocsr {
            IocsrSource::Privileged => unsafe { iocsr_read_w(reg) },
            IocsrSource::MemClockConf(value) if reg == IOCSR_MEM_CLOCK_CONF => value,
            IocsrSource::MemClockConf(_) => {
                return Err(LoongImcError::IocsrError(format!(
                    "IOCSR 0x{reg:X} was not supplied"
                )))
            }
            IocsrSource::Unavailable => {
                return Err(LoongImcError::IocsrError(format!(
                    "IOCSR 0x{reg:X} is only readable at PLV0"
                )))
            }
        };

        tracing::debug!("IOCSR read: 0x{:X} = 0x{:08X}", reg, value);
        Ok(value)
    }
}
