//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `Ok(None)` when the key is absent; `Err` when present but not an
    /// integer.
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;

    /// `Ok(None)` when the key is absent; `Err` when present but not a
    /// number.
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String>;

    /// String value with surrounding whitespace trimmed, or `default` when
    /// the key is missing or blank.
    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}
