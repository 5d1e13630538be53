use crate::core::download::Downloader;
use crate::core::extract::{self, Unpacked};
use crate::core::install;
use crate::core::package::{Outcome, PackageSpec};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Stages of one installation run.
///
/// The run is linear with two optional legs: `Init → Downloaded →
/// [Unpacked] → [Installed] → Done`, with `Failed` terminal from any
/// transition. `copy_binary` is only evaluated after a successful unpack,
/// so an install can never happen without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Downloaded,
    Unpacked,
    Installed,
    Done,
    Failed,
}

pub struct Pipeline {
    spec: PackageSpec,
    stage: Stage,
}

impl Pipeline {
    pub fn new(spec: PackageSpec) -> Self {
        Pipeline {
            spec,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the pipeline to completion and report the terminal outcome.
    ///
    /// Every stage fails fast: a failure aborts the rest of the run and the
    /// outcome names the package and the failing stage, with the underlying
    /// error appended for diagnostics.
    pub fn run(&mut self) -> Outcome {
        let location = match self.download() {
            Ok(location) => location,
            Err(e) => {
                return self.fail(format!("Failed to download {}: {e}", self.spec.name));
            }
        };

        if !self.spec.unpack {
            return self.done();
        }

        let root = match self.unpack(&location) {
            Ok(root) => root,
            Err(e) => {
                return self.fail(format!(
                    "Failed to unpack archive {}: {e}",
                    location.display()
                ));
            }
        };

        if self.spec.copy_binary {
            if let Err(e) = self.install(&root) {
                return self.fail(format!(
                    "Failed to copy {} to {}: {e}",
                    self.spec.name,
                    self.spec.binary_dest.display()
                ));
            }
        }

        self.done()
    }

    fn download(&mut self) -> Result<PathBuf> {
        let downloader = Downloader::new(self.spec.timeout)?;
        let location = downloader.download(&self.spec.url, &self.spec.destination)?;
        self.stage = Stage::Downloaded;
        Ok(location)
    }

    fn unpack(&mut self, location: &Path) -> Result<PathBuf> {
        let root = match extract::extract(location, &self.spec.destination)? {
            Unpacked::Archive { root } => root,
            // Neither tar nor zip in the suffix: nothing was extracted and
            // the root stays empty. A later install will fail to resolve.
            Unpacked::Unsupported { .. } => PathBuf::new(),
        };
        self.stage = Stage::Unpacked;
        Ok(root)
    }

    fn install(&mut self, root: &Path) -> Result<PathBuf> {
        let installed = install::install(&self.spec, root)?;
        self.stage = Stage::Installed;
        Ok(installed)
    }

    fn done(&mut self) -> Outcome {
        self.stage = Stage::Done;
        Outcome::changed("Package installation successful")
    }

    fn fail(&mut self, message: String) -> Outcome {
        self.stage = Stage::Failed;
        Outcome::unchanged(message)
    }
}
