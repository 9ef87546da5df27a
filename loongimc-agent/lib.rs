// Macros (must be first for visibility)
#[macro_use]
pub mod macros;

pub mod common;
pub mod config;
pub mod counters;
pub mod error;
pub mod metrics;
pub mod prom;

pub use config::ProbeConfig;
pub use counters::imc::{ImcInfo, ImcProbe};
pub use error::{LoongImcError, Result};
pub use prom::ImcMetricExporter;
