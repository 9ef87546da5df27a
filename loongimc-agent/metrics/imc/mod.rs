mod types;

pub use types::ImcMetric;
