//! Store configuration.

/// Configuration for creating a store.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Number of entries the mapping is pre-sized for.
    pub initial_capacity: usize,

    /// Whether `set` trace events include the written value.
    ///
    /// Keys are always logged. Values may be sensitive, so they are left out
    /// unless this is enabled.
    pub log_values: bool,
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial capacity of the mapping.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets whether values are included in `set` trace events.
    #[must_use]
    pub const fn log_values(mut self, value: bool) -> Self {
        self.log_values = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.initial_capacity, 0);
        assert!(!config.log_values);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new().initial_capacity(128).log_values(true);

        assert_eq!(config.initial_capacity, 128);
        assert!(config.log_values);
    }
}
