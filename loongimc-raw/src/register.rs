//! Generic register abstractions for typed bit-field decoding

/// Trait for register layouts that can be converted to/from raw register values
///
/// Layouts are always expressed over a 64-bit value; narrower registers
/// (e.g. the 32-bit IOCSR clock configuration word) simply leave the upper
/// bits clear.
///
/// # Example
///
/// ```
/// use loongimc_raw::register::RegisterLayout;
///
/// #[derive(Debug, Default)]
/// struct MyControl {
///     enable: bool,
///     threshold: u8,
/// }
///
/// impl RegisterLayout for MyControl {
///     fn to_raw(&self) -> u64 {
///         (if self.enable { 1 } else { 0 })
///             | ((self.threshold as u64) << 8)
///     }
///
///     fn from_raw(value: u64) -> Self {
///         Self {
///             enable: (value & 1) != 0,
///             threshold: ((value >> 8) & 0xFF) as u8,
///         }
///     }
/// }
///
/// let ctrl = MyControl::from_raw(0x0A01);
/// assert!(ctrl.enable);
/// assert_eq!(ctrl.threshold, 10);
/// ```
pub trait RegisterLayout: Sized {
    /// Convert this register layout to a raw register value
    fn to_raw(&self) -> u64;

    /// Parse a raw register value into this register layout
    fn from_raw(value: u64) -> Self;

    /// Validate that the fields fit their bit widths
    ///
    /// Returns `Ok(())` if valid, or an error message if invalid.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

/// Extract `len` bits starting at `shift` from `value`
#[inline]
pub const fn field(value: u64, shift: u32, len: u32) -> u64 {
    (value >> shift) & ((1u64 << len) - 1)
}
