// Loongson family detection and memory-controller topology

use once_cell::sync::Lazy;

use loongimc_raw::current_arch::chip::ChannelMode;

use crate::error::{LoongImcError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoongsonFamily {
    /// 3C5000/3C6000 and 3B6000 server parts
    Ls3C,
    /// 3D/3E multi-chip server parts
    Ls3D,
    /// 3A/3B desktop and dual-socket parts
    Ls3A,
    /// 2K embedded parts and the 3B6000M
    Ls2K,
}

/// How the memory controllers of a family are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub mode: ChannelMode,
    pub max_channels: u8,
}

impl LoongsonFamily {
    pub fn name(&self) -> &'static str {
        match self {
            LoongsonFamily::Ls3C => "Loongson-3C",
            LoongsonFamily::Ls3D => "Loongson-3D",
            LoongsonFamily::Ls3A => "Loongson-3A",
            LoongsonFamily::Ls2K => "Loongson-2K",
        }
    }

    /// Classify a brand string; the first matching rule wins
    ///
    /// "3B6000M" also contains "3B" and "3B6000", so it is excluded from the
    /// earlier rules explicitly.
    pub fn from_brand(brand: &str) -> Option<Self> {
        let mobile = brand.contains("3B6000M");

        if brand.contains("3C") || (brand.contains("3B6000") && !mobile) {
            Some(LoongsonFamily::Ls3C)
        } else if brand.contains("3D") || brand.contains("3E") {
            Some(LoongsonFamily::Ls3D)
        } else if (brand.contains("3A") || brand.contains("3B")) && !mobile {
            Some(LoongsonFamily::Ls3A)
        } else if brand.contains("2K") || mobile {
            Some(LoongsonFamily::Ls2K)
        } else {
            None
        }
    }

    pub fn topology(&self) -> Topology {
        match self {
            LoongsonFamily::Ls3C => Topology {
                mode: ChannelMode::Routed,
                max_channels: 4,
            },
            LoongsonFamily::Ls3D => Topology {
                mode: ChannelMode::Routed,
                max_channels: 8,
            },
            LoongsonFamily::Ls3A => Topology {
                mode: ChannelMode::Direct,
                max_channels: 2,
            },
            LoongsonFamily::Ls2K => Topology {
                mode: ChannelMode::Direct,
                max_channels: 1,
            },
        }
    }
}

/// Select the controller topology for a brand string
pub fn select_topology(brand: &str) -> Result<(LoongsonFamily, Topology)> {
    let family = LoongsonFamily::from_brand(brand).ok_or_else(|| {
        LoongImcError::UnsupportedPlatform(format!("No known memory controller for '{brand}'"))
    })?;

    let topology = family.topology();
    tracing::info!(
        "CPU '{}' is {}: {:?} controllers, {} channel(s)",
        brand,
        family.name(),
        topology.mode,
        topology.max_channels
    );

    Ok((family, topology))
}

pub static CPU_BRAND: Lazy<Option<String>> = Lazy::new(|| {
    match std::fs::read_to_string("/proc/cpuinfo") {
        Ok(cpuinfo) => parse_brand(&cpuinfo),
        Err(e) => {
            tracing::warn!("Failed to read /proc/cpuinfo: {}", e);
            None
        }
    }
});

/// Extract the model name from `/proc/cpuinfo` text
///
/// LoongArch kernels report "Model Name"; other architectures use "model name".
pub fn parse_brand(cpuinfo: &str) -> Option<String> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        (key.trim().eq_ignore_ascii_case("model name") && !value.is_empty())
            .then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(brand: &str) -> Option<(ChannelMode, u8)> {
        LoongsonFamily::from_brand(brand).map(|f| {
            let t = f.topology();
            (t.mode, t.max_channels)
        })
    }

    #[test]
    fn test_family_topologies() {
        assert_eq!(classify("Loongson-3C5000"), Some((ChannelMode::Routed, 4)));
        assert_eq!(classify("Loongson-3B6000"), Some((ChannelMode::Routed, 4)));
        assert_eq!(classify("Loongson-3D5000"), Some((ChannelMode::Routed, 8)));
        assert_eq!(classify("Loongson-3E5000"), Some((ChannelMode::Routed, 8)));
        assert_eq!(classify("Loongson-3A5000"), Some((ChannelMode::Direct, 2)));
        assert_eq!(classify("Loongson-3B5000"), Some((ChannelMode::Direct, 2)));
        assert_eq!(classify("Loongson-2K2000"), Some((ChannelMode::Direct, 1)));
        assert_eq!(classify("Loongson-3B6000M"), Some((ChannelMode::Direct, 1)));
    }

    #[test]
    fn test_3b6000m_precedence() {
        assert_eq!(
            LoongsonFamily::from_brand("Loongson-3B6000M"),
            Some(LoongsonFamily::Ls2K)
        );
        assert_ne!(
            LoongsonFamily::from_brand("Loongson-3B6000"),
            LoongsonFamily::from_brand("Loongson-3B6000M")
        );
    }

    #[test]
    fn test_3c_rule_wins_over_3a() {
        assert_eq!(
            LoongsonFamily::from_brand("3A-3C bridge"),
            Some(LoongsonFamily::Ls3C)
        );
    }

    #[test]
    fn test_unknown_brand_unsupported() {
        assert_eq!(LoongsonFamily::from_brand("Intel(R) Xeon(R)"), None);
        let err = select_topology("Intel(R) Xeon(R)").unwrap_err();
        assert!(matches!(err, LoongImcError::UnsupportedPlatform(_)));
    }

    #[test]
    fn test_parse_brand() {
        let loongarch = "system type\t\t: generic-loongson-machine\n\
                         processor\t\t: 0\n\
                         package\t\t\t: 0\n\
                         core\t\t\t: 0\n\
                         CPU Family\t\t: Loongson-64bit\n\
                         Model Name\t\t: Loongson-3A5000\n";
        assert_eq!(parse_brand(loongarch).as_deref(), Some("Loongson-3A5000"));

        let x86 = "processor\t: 0\nmodel name\t: Intel(R) Xeon(R) Gold 6130\n";
        assert_eq!(
            parse_brand(x86).as_deref(),
            Some("Intel(R) Xeon(R) Gold 6130")
        );

        assert_eq!(parse_brand("processor\t: 0\n"), None);
    }
}
