// IMC (Integrated Memory Controller) configuration metrics

use crate::counters::imc::ImcInfo;

metric_enum! {
    pub enum ImcMetric {
        CasLatency => ("IMCCasLatency", "CAS latency (tCL) in memory clocks"),
        RasToCasDelay => ("IMCRasToCasDelay", "RAS to CAS delay (tRCD) in memory clocks"),
        RowPrecharge => ("IMCRowPrecharge", "Row precharge time (tRP) in memory clocks"),
        RowActive => ("IMCRowActive", "Row active time (tRAS) in memory clocks"),
        BusWidth => ("IMCBusWidth", "DRAM data bus width in bits, 0 if unknown"),
        Frequency => ("IMCFrequency", "Memory clock in MHz, 0 if undetermined"),
    }
}

impl ImcMetric {
    pub fn value(&self, info: &ImcInfo) -> f64 {
        match self {
            ImcMetric::CasLatency => info.tcl as f64 + info.tcl_dec as f64 / 10.0,
            ImcMetric::RasToCasDelay => info.trcd as f64,
            ImcMetric::RowPrecharge => info.trp as f64,
            ImcMetric::RowActive => info.tras as f64,
            ImcMetric::BusWidth => info.width as f64,
            ImcMetric::Frequency => info.freq as f64,
        }
    }
}
