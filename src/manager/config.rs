//! Manager configuration.

/// Number of parse computations kept when nothing else is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 5;

/// Configuration for a [`SyntaxTreeManager`](super::SyntaxTreeManager).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Maximum number of cached parse computations, across all
    /// documents. At least 1.
    pub cache_capacity: usize,
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache capacity. Zero is raised to one.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(ManagerConfig::default().cache_capacity, 5);
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        assert_eq!(ManagerConfig::new().with_cache_capacity(0).cache_capacity, 1);
        assert_eq!(ManagerConfig::new().with_cache_capacity(12).cache_capacity, 12);
    }
}
