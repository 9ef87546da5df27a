//! Declarative macros to reduce boilerplate across the loongimc codebase

/// Define a metric enum with automatic `name()`, `help()` and `all()` implementations
///
/// # Example
/// ```
/// use loongimc::metric_enum;
///
/// metric_enum! {
///     pub enum TimingMetric {
///         CasLatency => ("CasLatency", "CAS latency in memory clocks"),
///         RowPrecharge => ("RowPrecharge", "Row precharge time in memory clocks"),
///     }
/// }
///
/// // Usage
/// let metric = TimingMetric::CasLatency;
/// assert_eq!(metric.name(), "CasLatency");
/// assert_eq!(metric.help(), "CAS latency in memory clocks");
/// assert_eq!(TimingMetric::all().len(), 2);
/// ```
///
/// Expands to:
/// - An enum with Debug, Clone, Copy, PartialEq, Eq, Hash derives
/// - A `name(&self) -> &'static str` method (Prometheus metric name)
/// - A `help(&self) -> &'static str` method (Prometheus help text)
/// - An `all() -> Vec<Self>` method
#[macro_export]
macro_rules! metric_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => ($str:literal, $help:literal)),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)*
                }
            }

            pub fn help(&self) -> &'static str {
                match self {
                    $($name::$variant => $help,)*
                }
            }

            pub fn all() -> Vec<$name> {
                vec![$($name::$variant,)*]
            }
        }
    };
}
