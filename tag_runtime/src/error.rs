use crate::workload::{BuildWorkload, Severity};
use thiserror::Error;

/// Result alias used across the runtime and by emitted code.
pub type TagResult<T> = Result<T, TagError>;

/// Errors produced while converting tag data between representations.
#[derive(Debug, Error)]
pub enum TagError {
    /// A read or write ran past the end of a buffer.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// The data is structurally broken (bad terminator, checksum, class mismatch).
    #[error("invalid tag data: {0}")]
    InvalidTagData(String),

    /// A constraint violation that has already been reported to the workload.
    #[error("{0}")]
    Fatal(String),

    /// Failure inside one element of an array field.
    #[error("failed to {action} {owner}::{field} #{index}")]
    Element {
        action: &'static str,
        owner: &'static str,
        field: &'static str,
        index: usize,
        #[source]
        source: Box<TagError>,
    },

    /// Failure while processing a named asset.
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<TagError>,
    },

    /// A tag ID or path that the source or workload does not know.
    #[error("unknown tag: {0}")]
    UnknownTag(String),
}

impl TagError {
    pub fn out_of_bounds(what: impl Into<String>) -> Self {
        TagError::OutOfBounds(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        TagError::InvalidTagData(what.into())
    }

    pub fn element(
        action: &'static str,
        owner: &'static str,
        field: &'static str,
        index: usize,
        source: TagError,
    ) -> Self {
        TagError::Element {
            action,
            owner,
            field,
            index,
            source: Box::new(source),
        }
    }

    pub fn context(self, context: impl Into<String>) -> Self {
        TagError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error of a chain of `Element`/`Context` wrappers.
    pub fn root(&self) -> &TagError {
        match self {
            TagError::Element { source, .. } | TagError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Report a fatal constraint violation to the workload and build the error to return.
pub fn fatal(workload: &mut dyn BuildWorkload, tag_index: usize, message: String) -> TagError {
    workload.report(Severity::Fatal, Some(tag_index), &message);
    TagError::Fatal(message)
}
