use crate::error::{FetchbinError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[a-z0-9.]+$").expect("valid suffix pattern"));

/// Infer the archive extension of a file from its name.
///
/// The trailing run of lowercase letters, digits, and dots is scanned left
/// to right: a dot followed by a digit is treated as a version separator and
/// dropped, a dot followed by a letter opens an extension token, and letters
/// inside a token are kept. Multi-part suffixes survive intact, so
/// `archive.tar.gz` classifies as `.tar.gz` and `archive.tar.bz2` as
/// `.tar.bz2`, while `binary-v1.2.3` has no extension at all.
///
/// The path must name an existing regular file.
pub fn classify(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(FetchbinError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| FetchbinError::NoExtension {
            path: path.to_path_buf(),
        })?;

    let span = SUFFIX
        .find(filename)
        .ok_or_else(|| FetchbinError::NoExtension {
            path: path.to_path_buf(),
        })?
        .as_str();

    let chars: Vec<char> = span.chars().collect();
    let mut extension = String::new();
    let mut in_token = false;

    for (index, &ch) in chars.iter().enumerate() {
        if index + 1 >= chars.len() {
            extension.push(ch);
            break;
        }

        let next = chars[index + 1];

        if ch == '.' && next.is_ascii_digit() {
            continue;
        }

        if ch == '.' && next.is_ascii_alphabetic() {
            extension.push(ch);
            in_token = true;
            continue;
        }

        if in_token && next.is_ascii_alphabetic() {
            extension.push(ch);
            continue;
        }

        extension.push(ch);
    }

    // A purely numeric leftover ("binary-v1.2.3" scans to "23") is a version
    // tail, not an extension.
    if !extension.contains('.') || !extension.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(FetchbinError::NoExtension {
            path: path.to_path_buf(),
        });
    }

    Ok(extension)
}
