pub mod affinity;
pub mod arch;
pub mod cpucfg;
pub mod mmio;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use affinity::AffinityGuard;
pub use arch::{select_topology, LoongsonFamily, Topology, CPU_BRAND};
pub use cpucfg::{CpuIntrospection, NativeCpu};
pub use mmio::{MemHandle, RegisterAccess, VolatileMmio};
#[cfg(any(test, feature = "sim"))]
pub use sim::{SimCpu, SimRegisters};
