use std::path::Path;

use loongimc_raw::PhysMem;

use crate::error::Result;

/// Byte and word access to the controller and chip configuration windows
///
/// Addresses are the LoongArch direct-mapped-window addresses used by the
/// register map (`0x8000_0000_....`); each backend translates as needed.
pub trait RegisterAccess {
    fn read8(&self, addr: u64) -> Result<u8>;
    fn read64(&self, addr: u64) -> Result<u64>;
    fn write64(&self, addr: u64, value: u64) -> Result<()>;
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn read8(&self, addr: u64) -> Result<u8> {
        (**self).read8(addr)
    }

    fn read64(&self, addr: u64) -> Result<u64> {
        (**self).read64(addr)
    }

    fn write64(&self, addr: u64, value: u64) -> Result<()> {
        (**self).write64(addr, value)
    }
}

/// Register access through a physical memory device
pub struct MemHandle {
    mem: parking_lot::Mutex<PhysMem>,
}

impl MemHandle {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mem = PhysMem::open(path)?;

        tracing::info!("Opened physical memory device {}", path.display());

        Ok(Self {
            mem: parking_lot::Mutex::new(mem),
        })
    }
}

impl RegisterAccess for MemHandle {
    fn read8(&self, addr: u64) -> Result<u8> {
        let value = self.mem.lock().read8(addr)?;
        tracing::debug!("MMIO read8: 0x{:016x} = 0x{:02x}", addr, value);
        Ok(value)
    }

    fn read64(&self, addr: u64) -> Result<u64> {
        let value = self.mem.lock().read64(addr)?;
        tracing::debug!("MMIO read64: 0x{:016x} = 0x{:016x}", addr, value);
        Ok(value)
    }

    fn write64(&self, addr: u64, value: u64) -> Result<()> {
        tracing::debug!("MMIO write64: 0x{:016x} <- 0x{:016x}", addr, value);
        self.mem.lock().write64(addr, value)?;
        Ok(())
    }
}

/// Register access by dereferencing the window addresses directly
///
/// Usable where the uncached direct-mapped window is configured, i.e. in
/// firmware or kernel context.
pub struct VolatileMmio {
    _private: (),
}

impl VolatileMmio {
    /// # Safety
    ///
    /// The caller must run with the uncached DMW covering both configuration
    /// windows, and nothing else may access the function-setting registers
    /// while probing.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterAccess for VolatileMmio {
    fn read8(&self, addr: u64) -> Result<u8> {
        // SAFETY: the window is mapped per the contract of `new`
        Ok(unsafe { core::ptr::read_volatile(addr as usize as *const u8) })
    }

    fn read64(&self, addr: u64) -> Result<u64> {
        // SAFETY: as above; register addresses are 8-byte aligned
        Ok(unsafe { core::ptr::read_volatile(addr as usize as *const u64) })
    }

    fn write64(&self, addr: u64, value: u64) -> Result<()> {
        // SAFETY: as above
        unsafe { core::ptr::write_volatile(addr as usize as *mut u64, value) };
        Ok(())
    }
}
