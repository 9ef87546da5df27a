//! Physical memory read/write primitives
//!
//! This module provides low-level access to physical addresses through
//! `/dev/mem`. Addresses handed in may be LoongArch direct-mapped-window
//! addresses (e.g. `0x8000_0000_1FE0_0000`); the window selector is stripped
//! before the device file is seeked. For shared/serialised access, use the
//! higher-level handle in loongimc-agent.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, MemError>;

/// Default physical memory device
pub const DEV_MEM: &str = "/dev/mem";

/// Direct-mapped-window selector bits (VSEG, bits 60-63)
pub const DMW_SELECTOR_MASK: u64 = 0xF000_0000_0000_0000;

/// Uncached direct-mapped window used by firmware for register access
pub const DMW_UNCACHED: u64 = 0x8000_0000_0000_0000;

/// Translate a direct-mapped-window address into a physical address
///
/// Addresses without a window selector are returned unchanged.
#[inline]
pub const fn to_physical(addr: u64) -> u64 {
    addr & !DMW_SELECTOR_MASK
}

/// Errors that can occur during physical memory operations
#[derive(Debug, thiserror::Error)]
pub enum MemError {
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to seek to physical address 0x{phys:X}: {source}")]
    SeekFailed { phys: u64, source: std::io::Error },

    #[error("Failed to read {width} byte(s) at physical address 0x{phys:X}: {source}")]
    ReadFailed {
        phys: u64,
        width: usize,
        source: std::io::Error,
    },

    #[error("Failed to write {width} byte(s) at physical address 0x{phys:X}: {source}")]
    WriteFailed {
        phys: u64,
        width: usize,
        source: std::io::Error,
    },
}

/// An open physical memory device
///
/// The file is opened with `O_SYNC` so that the kernel maps the accessed
/// pages uncached; controller registers must not be served from cache.
#[derive(Debug)]
pub struct PhysMem {
    file: File,
}

impl PhysMem {
    /// Open a physical memory device (normally [`DEV_MEM`])
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be opened read/write
    /// (requires root/CAP_SYS_RAWIO and a kernel without `STRICT_DEVMEM`
    /// restrictions on the register ranges).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|e| MemError::OpenFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self { file })
    }

    fn seek(&mut self, addr: u64) -> Result<u64> {
        let phys = to_physical(addr);
        self.file
            .seek(SeekFrom::Start(phys))
            .map_err(|e| MemError::SeekFailed { phys, source: e })?;
        Ok(phys)
    }

    fn read_bytes<const N: usize>(&mut self, addr: u64) -> Result<[u8; N]> {
        let phys = self.seek(addr)?;
        let mut buffer = [0u8; N];
        self.file
            .read_exact(&mut buffer)
            .map_err(|e| MemError::ReadFailed {
                phys,
                width: N,
                source: e,
            })?;
        Ok(buffer)
    }

    /// Read one byte
    pub fn read8(&mut self, addr: u64) -> Result<u8> {
        let [byte] = self.read_bytes::<1>(addr)?;
        Ok(byte)
    }

    /// Read a little-endian 64-bit word
    pub fn read64(&mut self, addr: u64) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_bytes::<8>(addr)?))
    }

    /// Write a little-endian 64-bit word
    ///
    /// Writing incorrect values to the chip configuration window can
    /// disable memory channels. Callers are expected to restore any value
    /// they modify.
    pub fn write64(&mut self, addr: u64, value: u64) -> Result<()> {
        let phys = self.seek(addr)?;
        self.file
            .write_all(&value.to_le_bytes())
            .map_err(|e| MemError::WriteFailed {
                phys,
                width: 8,
                source: e,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_error_display() {
        let err = MemError::OpenFailed {
            path: PathBuf::from(DEV_MEM),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("Failed to open /dev/mem"));

        let err = MemError::ReadFailed {
            phys: 0x0FF0_1060,
            width: 1,
            source: std::io::Error::from(std::io::ErrorKind::UnexpectedEof),
        };
        assert!(err.to_string().contains("0xFF01060"));
    }

    #[test]
    fn test_to_physical_strips_window() {
        assert_eq!(to_physical(0x8000_0000_1FE0_0180), 0x1FE0_0180);
        assert_eq!(to_physical(0x8000_0000_0FF0_0000), 0x0FF0_0000);
        assert_eq!(to_physical(0x1FE0_0180), 0x1FE0_0180);
    }

    #[test]
    fn test_open_missing_device() {
        let err = PhysMem::open("/nonexistent/loongimc-mem").unwrap_err();
        assert!(matches!(err, MemError::OpenFailed { .. }));
    }
}
