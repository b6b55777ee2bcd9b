//! Configuration limits for connections.

/// Resource limits for a single connection.
///
/// These bound buffer growth driven by peer-controlled values (declared
/// payload lengths, header size, fragment counts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of the handshake response header block in bytes.
    ///
    /// The input buffer is pre-sized to this value, so the whole response
    /// normally fits without reallocation.
    ///
    /// Default: 4 KB (4096)
    pub max_header_size: usize,

    /// Maximum number of fragments in a single message.
    ///
    /// Default: 64
    pub max_fragment_count: usize,

    /// Maximum buffered size of a complete message in bytes, counting frame
    /// headers and the payloads of all its fragments.
    ///
    /// Checked before the input buffer grows to meet a declared length, so a
    /// hostile 64-bit length field cannot force an allocation.
    ///
    /// Default: 64 MB (64 * 1024 * 1024)
    pub max_message_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_header_size: 4096,
            max_fragment_count: 64,
            max_message_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Limits {
    /// Create new limits with custom values.
    #[must_use]
    pub const fn new(
        max_header_size: usize,
        max_fragment_count: usize,
        max_message_size: usize,
    ) -> Self {
        Self {
            max_header_size,
            max_fragment_count,
            max_message_size,
        }
    }

    /// Set the maximum handshake response size.
    #[must_use]
    pub const fn with_max_header_size(mut self, size: usize) -> Self {
        self.max_header_size = size;
        self
    }

    /// Set the maximum fragment count per message.
    #[must_use]
    pub const fn with_max_fragment_count(mut self, count: usize) -> Self {
        self.max_fragment_count = count;
        self
    }

    /// Set the maximum buffered message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Validate that a message's buffered size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`](crate::Error::MessageTooLarge) if
    /// `size` exceeds the configured maximum.
    pub const fn check_message_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_message_size {
            Err(crate::Error::MessageTooLarge {
                size,
                max: self.max_message_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a fragment count is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyFragments`](crate::Error::TooManyFragments) if
    /// `count` exceeds the configured maximum.
    pub const fn check_fragment_count(&self, count: usize) -> Result<(), crate::Error> {
        if count > self.max_fragment_count {
            Err(crate::Error::TooManyFragments {
                count,
                max: self.max_fragment_count,
            })
        } else {
            Ok(())
        }
    }
}
