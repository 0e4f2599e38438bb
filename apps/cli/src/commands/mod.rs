pub mod logs;
pub mod products;
pub mod store;
pub mod sync;

/// Renders an optional value for table output.
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
