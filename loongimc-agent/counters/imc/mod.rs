// Integrated memory controller probe
// Locates a responding channel and reports its DRAM timings and clock

pub mod decode;
pub mod probe;

use crate::common::arch::Topology;
use crate::common::cpucfg::CpuIntrospection;
use crate::common::mmio::RegisterAccess;
use crate::error::Result;

pub use decode::ImcTimings;
pub use probe::{probe_channels, ProbeHit};

/// Memory type reported by every supported controller
pub const DRAM_TYPE: &str = "DDR4";

/// Timing summary of the memory behind the probed controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImcInfo {
    pub kind: &'static str,
    /// Channel whose registers were decoded, `None` when nothing answered
    pub channel: Option<u8>,
    pub tcl: u16,
    pub tcl_dec: u16,
    pub trp: u16,
    pub trcd: u16,
    pub tras: u16,
    /// Data bus width in bits, 0 when unknown
    pub width: u16,
    /// Memory clock in MHz, 0 when undetermined
    pub freq: u32,
}

impl Default for ImcInfo {
    fn default() -> Self {
        Self {
            kind: DRAM_TYPE,
            channel: None,
            tcl: 0,
            tcl_dec: 0,
            trp: 0,
            trcd: 0,
            tras: 0,
            width: 0,
            freq: 0,
        }
    }
}

impl ImcInfo {
    pub fn found(&self) -> bool {
        self.channel.is_some()
    }

    fn from_hit(hit: ProbeHit) -> Self {
        let t = hit.timings;
        Self {
            channel: Some(hit.channel),
            tcl: t.tcl,
            tcl_dec: t.tcl_dec,
            trp: t.trp,
            trcd: t.trcd,
            tras: t.tras,
            width: t.width.bits(),
            ..Self::default()
        }
    }
}

pub struct ImcProbe<A, C> {
    access: A,
    cpu: C,
    topology: Topology,
}

impl<A: RegisterAccess, C: CpuIntrospection> ImcProbe<A, C> {
    pub fn new(access: A, cpu: C, topology: Topology) -> Self {
        Self {
            access,
            cpu,
            topology,
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Probe the controllers and decode timings and frequency
    ///
    /// A miss yields a fresh record with zero timings and `freq == 0`.
    /// Failure to read the memory PLL leaves `freq == 0` but keeps the timings.
    pub fn run(&self) -> Result<ImcInfo> {
        let Some(hit) = probe_channels(&self.access, self.topology)? else {
            return Ok(ImcInfo::default());
        };

        let mut info = ImcInfo::from_hit(hit);
        info.freq = match decode::memory_frequency(&self.cpu) {
            Ok(freq) => freq,
            Err(e) => {
                tracing::warn!("Memory frequency undetermined: {}", e);
                0
            }
        };

        tracing::info!(
            "{} channel {}: CL{}-{}-{}-{} x{} @ {} MHz",
            info.kind,
            hit.channel,
            info.tcl,
            info.trcd,
            info.trp,
            info.tras,
            info.width,
            info.freq
        );

        Ok(info)
    }
}
