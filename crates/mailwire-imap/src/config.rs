//! Parser configuration types.

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum literal size (64 MiB).
pub const DEFAULT_MAX_LITERAL_SIZE: usize = 64 * 1024 * 1024;

/// Default maximum number of UIDs one UID set may expand to.
pub const DEFAULT_MAX_UID_SET_LEN: usize = 1_000_000;

/// Parser limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of body parts, nested messages and extension lists.
    pub max_depth: usize,
    /// Largest literal the in-memory tokenizer accepts.
    pub max_literal_size: usize,
    /// Most UIDs a UID-set atom may expand to.
    pub max_uid_set_len: usize,
}

impl ParserConfig {
    /// Creates a configuration with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_literal_size: DEFAULT_MAX_LITERAL_SIZE,
            max_uid_set_len: DEFAULT_MAX_UID_SET_LEN,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub const fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::new()
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfigBuilder {
    max_depth: usize,
    max_literal_size: usize,
    max_uid_set_len: usize,
}

impl ParserConfigBuilder {
    /// Creates a new builder with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_literal_size: DEFAULT_MAX_LITERAL_SIZE,
            max_uid_set_len: DEFAULT_MAX_UID_SET_LEN,
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the maximum literal size in bytes.
    #[must_use]
    pub const fn max_literal_size(mut self, size: usize) -> Self {
        self.max_literal_size = size;
        self
    }

    /// Sets the maximum expanded UID-set length.
    #[must_use]
    pub const fn max_uid_set_len(mut self, len: usize) -> Self {
        self.max_uid_set_len = len;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub const fn build(self) -> ParserConfig {
        ParserConfig {
            max_depth: self.max_depth,
            max_literal_size: self.max_literal_size,
            max_uid_set_len: self.max_uid_set_len,
        }
    }
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.max_literal_size, 64 * 1024 * 1024);
        assert_eq!(config.max_uid_set_len, 1_000_000);
    }

    #[test]
    fn test_config_builder() {
        let config = ParserConfig::builder()
            .max_depth(8)
            .max_literal_size(1024)
            .max_uid_set_len(10)
            .build();

        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_literal_size, 1024);
        assert_eq!(config.max_uid_set_len, 10);
    }
}
