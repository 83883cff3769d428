//! Knobs for a compression or decompression run.

/// Default capacity of the internal read/write buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Run configuration shared by [`compress_with`](crate::compress_with) and
/// [`decompress_with`](crate::decompress_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Capacity of the buffered reader/writer and the chunk size of the
    /// frequency and encoding passes.
    pub buffer_capacity: usize,
    /// Reject streams whose header node count disagrees with the decoded tree.
    pub verify_node_count: bool,
}

impl CodecConfig {
    /// Set the I/O buffer capacity. Zero is clamped to one byte.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    /// Enable or disable the header node-count check.
    pub fn with_verify_node_count(mut self, verify: bool) -> Self {
        self.verify_node_count = verify;
        self
    }

    pub(crate) fn buffer_capacity(&self) -> usize {
        self.buffer_capacity.max(1)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            verify_node_count: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = CodecConfig::default()
            .with_buffer_capacity(0)
            .with_verify_node_count(false);
        assert_eq!(config.buffer_capacity, 1);
        assert!(!config.verify_node_count);
    }

    #[test]
    fn test_zero_capacity_field_is_clamped_on_use() {
        let config = CodecConfig {
            buffer_capacity: 0,
            ..CodecConfig::default()
        };
        assert_eq!(config.buffer_capacity(), 1);
    }
}
