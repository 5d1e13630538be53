use crate::error::{FetchbinError, Result};
use std::path::Path;

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => FetchbinError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FetchbinError::from(e),
        })?;
    }
    Ok(())
}

/// Move a file with a plain rename. Cross-device and permission failures
/// propagate to the caller unchanged.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    std::fs::rename(from, to).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => FetchbinError::PermissionDenied {
            path: to.to_path_buf(),
        },
        _ => FetchbinError::from(e),
    })
}

pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(windows)]
    {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("exe"))
            .unwrap_or(false)
    }
}

/// Add execute permission for owner, group, and others, keeping the rest of
/// the mode untouched.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(path, perms).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => FetchbinError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FetchbinError::from(e),
        })?;
    }

    // On Windows, executable permission is determined by file extension
    #[cfg(windows)]
    {
        let _ = path;
    }

    Ok(())
}
