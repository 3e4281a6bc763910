//! Error types for template compilation and program encoding.

/// A template failed to compile.
///
/// Carries the 1-based line of the offending tag so the message can point at
/// the problem once the cache attaches the file path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A `{{` was opened but never closed.
    #[error("line {line}: unterminated tag")]
    UnterminatedTag {
        /// Line where the tag opened.
        line: usize,
    },

    /// A tag contained no expression.
    #[error("line {line}: empty tag")]
    EmptyTag {
        /// Line of the empty tag.
        line: usize,
    },

    /// A path segment inside a tag is not a valid identifier.
    #[error("line {line}: invalid identifier '{segment}'")]
    InvalidIdentifier {
        /// Line of the tag.
        line: usize,
        /// The rejected segment.
        segment: String,
    },

    /// A compiler other than the built-in one rejected the source.
    #[error("{message}")]
    Custom {
        /// Compiler-provided description.
        message: String,
    },
}

impl CompileError {
    /// Creates a compiler-specific error with a free-form message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// A compiled program could not be encoded to or decoded from bytes.
#[derive(Debug, thiserror::Error)]
#[error("template program codec error: {reason}")]
pub struct ProgramCodecError {
    /// Description of the bincode failure.
    pub reason: String,
}
