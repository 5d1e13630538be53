use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DESTINATION: &str = "/tmp";
pub const DEFAULT_BINARY_DEST: &str = "/usr/local/bin";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Everything one installation run needs to know, resolved up front.
///
/// The spec is immutable once built: `binary_name` defaults to the package
/// name at construction time, so nothing downstream has to re-derive it.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    pub name: String,
    pub url: String,
    pub destination: PathBuf,
    pub timeout: Duration,
    pub unpack: bool,
    pub copy_binary: bool,
    pub binary_dest: PathBuf,
    pub binary_name: String,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        PackageSpec {
            binary_name: name.clone(),
            name,
            url: url.into(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            unpack: false,
            copy_binary: false,
            binary_dest: PathBuf::from(DEFAULT_BINARY_DEST),
        }
    }

    pub fn with_destination(mut self, destination: impl AsRef<Path>) -> Self {
        self.destination = destination.as_ref().to_path_buf();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_unpack(mut self, unpack: bool) -> Self {
        self.unpack = unpack;
        self
    }

    /// Only takes effect in the orchestrated flow when `unpack` is also set;
    /// the pipeline never evaluates it otherwise.
    pub fn with_copy_binary(mut self, copy_binary: bool) -> Self {
        self.copy_binary = copy_binary;
        self
    }

    pub fn with_binary_dest(mut self, binary_dest: impl AsRef<Path>) -> Self {
        self.binary_dest = binary_dest.as_ref().to_path_buf();
        self
    }

    pub fn with_binary_name(mut self, binary_name: impl Into<String>) -> Self {
        self.binary_name = binary_name.into();
        self
    }
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub changed: bool,
    pub message: String,
}

impl Outcome {
    pub fn changed(message: impl Into<String>) -> Self {
        Outcome {
            changed: true,
            message: message.into(),
        }
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Outcome {
            changed: false,
            message: message.into(),
        }
    }
}
