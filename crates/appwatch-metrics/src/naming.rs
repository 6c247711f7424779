//! Metric name sanitizing.

/// Join `prefix` and `suffix` into a legal Prometheus metric name.
///
/// Every character outside `[a-zA-Z0-9_:]` becomes `_`, and a name that
/// would start with a digit gets a leading `_`.
pub fn metric_name(prefix: &str, suffix: &str) -> String {
    let mut name: String = prefix
        .chars()
        .chain(suffix.chars())
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
