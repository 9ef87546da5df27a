use std::path::PathBuf;

use loongimc_raw::mem::DEV_MEM;

use crate::common::arch::CPU_BRAND;
use crate::error::{LoongImcError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// CPU brand string used to select the controller topology
    pub brand: String,
    /// CPU the probe is pinned to
    pub cpu: i32,
    /// Physical memory device
    pub mem_device: PathBuf,
    /// Memory PLL configuration word, when IOCSR cannot be read directly
    pub mem_clock_conf: Option<u32>,
    /// `instance` label attached to exported metrics
    pub instance_label: String,
}

impl ProbeConfig {
    /// Resolve a configuration, detecting anything not supplied
    pub fn resolve(
        brand: Option<String>,
        cpu: i32,
        mem_device: Option<PathBuf>,
        mem_clock_conf: Option<u32>,
    ) -> Result<Self> {
        let brand = match brand {
            Some(brand) => brand,
            None => (*CPU_BRAND).clone().ok_or_else(|| {
                LoongImcError::ConfigError(
                    "Cannot detect the CPU brand from /proc/cpuinfo, pass --brand".to_string(),
                )
            })?,
        };

        Ok(Self {
            brand,
            cpu,
            mem_device: mem_device.unwrap_or_else(Self::default_mem_device),
            mem_clock_conf,
            instance_label: std::env::var("INSTANCE_LABEL").unwrap_or_else(|_| "none".to_string()),
        })
    }

    /// `/dev/mem`, or the host's device when running in a container
    pub fn default_mem_device() -> PathBuf {
        if std::env::var("DOCKER_RUNNING").is_ok() {
            PathBuf::from("/host").join(DEV_MEM.trim_start_matches('/'))
        } else {
            PathBuf::from(DEV_MEM)
        }
    }
}

/// Parse a register value given as hex (`0x...`) or decimal
pub fn parse_register_value(s: &str) -> Result<u32> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse::<u32>(),
    };

    parsed.map_err(|e| LoongImcError::ParseError(format!("Invalid register value '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register_value() {
        assert_eq!(parse_register_value("0x0219_0A10").unwrap(), 0x0219_0A10);
        assert_eq!(parse_register_value("0X1c0").unwrap(), 0x1C0);
        assert_eq!(parse_register_value("448").unwrap(), 448);
        assert!(matches!(
            parse_register_value("0xZZ"),
            Err(LoongImcError::ParseError(_))
        ));
    }

    #[test]
    fn test_resolve_with_explicit_values() {
        let config = ProbeConfig::resolve(
            Some("Loongson-3A6000".to_string()),
            2,
            Some(PathBuf::from("/tmp/mem")),
            Some(0x10),
        )
        .unwrap();

        assert_eq!(config.brand, "Loongson-3A6000");
        assert_eq!(config.cpu, 2);
        assert_eq!(config.mem_device, PathBuf::from("/tmp/mem"));
        assert_eq!(config.mem_clock_conf, Some(0x10));
    }
}
