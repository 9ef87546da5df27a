pub mod imc;

pub use imc::ImcMetricExporter;
