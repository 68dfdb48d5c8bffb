use thiserror::Error;

use crate::host::HostError;

/// Why a sequence could not be assembled.
#[derive(Error, Debug)]
pub enum AssembleError {
    /// A clip the sequence needs is not in its bin.
    #[error("{what} '{name}' not found in bin '{bin}'")]
    ResourceMissing {
        what: &'static str,
        name: String,
        bin: String,
    },

    /// The host refused an operation.
    #[error("{operation} failed: {source}")]
    Host {
        operation: String,
        #[source]
        source: HostError,
    },
}

impl AssembleError {
    pub fn missing(what: &'static str, name: impl Into<String>, bin: impl Into<String>) -> Self {
        Self::ResourceMissing {
            what,
            name: name.into(),
            bin: bin.into(),
        }
    }

    pub fn host(operation: impl Into<String>, source: HostError) -> Self {
        Self::Host {
            operation: operation.into(),
            source,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AssembleError::ResourceMissing { .. })
    }
}
