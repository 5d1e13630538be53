use crate::core::package::PackageSpec;
use crate::error::{FetchbinError, Result};
use crate::utils::fs;
use std::path::{Path, PathBuf};

/// Resolve the binary left behind by an unpack step, move it into the
/// binary destination, and mark it executable.
///
/// Candidates are tried in order:
/// 1. `{destination}/{root}/{binary_name}`
/// 2. `{destination}/{root}/{package name}`
/// 3. `{destination}/{root}` itself, when the root is directly an
///    executable file (a bare binary download, or an archive holding a
///    single file)
///
/// The move is a plain rename; failures such as a missing destination
/// directory or a cross-device link propagate unchanged, and a partially
/// moved file is not restored.
pub fn install(spec: &PackageSpec, extracted_root: &Path) -> Result<PathBuf> {
    let root = spec.destination.join(extracted_root);

    let named = root.join(&spec.binary_name);
    if named.is_file() {
        return place(&named, &spec.binary_dest.join(&spec.binary_name));
    }

    let by_package = root.join(&spec.name);
    if by_package.is_file() {
        return place(&by_package, &spec.binary_dest.join(&spec.name));
    }

    if root.is_file() {
        if fs::is_executable(&root) || which::which(&root).is_ok() {
            return place(&root, &spec.binary_dest.join(extracted_root));
        }
        return Err(FetchbinError::NotExecutable { path: root });
    }

    Err(FetchbinError::NotAFile { path: root })
}

fn place(source: &Path, target: &Path) -> Result<PathBuf> {
    fs::move_file(source, target)?;
    fs::make_executable(target)?;
    Ok(target.to_path_buf())
}
