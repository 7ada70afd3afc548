//! Heap configuration

/// Configuration for a [`Heap`](crate::Heap).
///
/// Controls capacity limits and when reclamation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapConfig {
    /// Maximum number of live instances (0 = unlimited)
    pub max_instances: usize,

    /// Run a reclamation pass as soon as an instance loses its last hold
    pub reclaim_on_release: bool,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            max_instances: 0,
            reclaim_on_release: false,
        }
    }
}

impl HeapConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with a live instance cap.
    pub fn with_max_instances(max_instances: usize) -> Self {
        Self {
            max_instances,
            ..Default::default()
        }
    }

    /// Create a configuration that reclaims synchronously on last release.
    pub fn reclaiming_on_release() -> Self {
        Self {
            reclaim_on_release: true,
            ..Default::default()
        }
    }

    /// Check whether `live` instances leave room for one more.
    pub fn has_room_for(&self, live: usize) -> bool {
        self.max_instances == 0 || live < self.max_instances
    }
}
