use crate::core::extension;
use crate::error::{FetchbinError, Result};
use crate::utils::fs;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use xz2::read::XzDecoder;
use zip::ZipArchive;

/// What unpacking an artifact produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unpacked {
    /// The payload now lives under `root`, relative to the destination
    /// directory. For tar archives the root is the common top-level entry
    /// (shortest entry name when the members share none); for zip it is the
    /// archive filename with its `.zip` suffix stripped, a best-effort guess
    /// rather than a verified directory.
    Archive { root: PathBuf },
    /// The classified suffix named neither a tar nor a zip; nothing was
    /// extracted.
    Unsupported { extension: String },
}

/// Classify the downloaded artifact by filename and extract it into the
/// destination directory.
pub fn extract(archive: &Path, destination: &Path) -> Result<Unpacked> {
    fs::ensure_dir_exists(destination)?;

    let extension = extension::classify(archive)?;

    if extension.contains("tar") {
        extract_tar(archive, destination)
    } else if extension.contains("zip") {
        extract_zip(archive, destination)
    } else {
        Ok(Unpacked::Unsupported { extension })
    }
}

/// Open a tar stream, sniffing the compression from the file's magic bytes
/// rather than trusting the suffix.
fn open_tar_reader(path: &Path) -> Result<Box<dyn Read>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 6];
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn Read> = match &magic[..read] {
        [0x1f, 0x8b, ..] => Box::new(GzDecoder::new(file)),
        [b'B', b'Z', b'h', ..] => Box::new(BzDecoder::new(file)),
        [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00, ..] => Box::new(XzDecoder::new(file)),
        _ => Box::new(file),
    };

    Ok(reader)
}

fn extract_tar(archive_path: &Path, destination: &Path) -> Result<Unpacked> {
    let reader = open_tar_reader(archive_path)?;
    let mut archive = Archive::new(reader);
    let mut names: Vec<PathBuf> = Vec::new();

    let entries = archive
        .entries()
        .map_err(|e| tar_error(archive_path, &e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| tar_error(archive_path, &e))?;
        let path = entry
            .path()
            .map_err(|e| tar_error(archive_path, &e))?
            .into_owned();

        check_entry_path(&path)?;

        match entry.header().entry_type() {
            EntryType::Regular | EntryType::Directory => {}
            EntryType::Symlink => {
                let target = entry.link_name().map_err(|e| tar_error(archive_path, &e))?;
                check_link_target(&path, target.as_deref())?;
            }
            // Hard link targets are archive-root relative, so they follow
            // the same rules as entry paths.
            EntryType::Link => {
                let target = entry
                    .link_name()
                    .map_err(|e| tar_error(archive_path, &e))?
                    .ok_or_else(|| FetchbinError::UnsafeArchiveEntry {
                        entry: path.clone(),
                    })?;
                check_entry_path(&target)?;
            }
            // Devices, fifos, and anything else exotic stay out of the tree.
            _ => {
                return Err(FetchbinError::UnsafeArchiveEntry { entry: path });
            }
        }

        let unpacked = entry
            .unpack_in(destination)
            .map_err(|e| tar_error(archive_path, &e))?;
        if !unpacked {
            return Err(FetchbinError::UnsafeArchiveEntry { entry: path });
        }

        names.push(path);
    }

    if names.is_empty() {
        return Err(FetchbinError::ExtractionFailed {
            path: archive_path.to_path_buf(),
            message: "archive has no entries".to_string(),
        });
    }

    Ok(Unpacked::Archive {
        root: extracted_root(&names),
    })
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<Unpacked> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = match entry.enclosed_name() {
            Some(path) => path,
            None => {
                return Err(FetchbinError::UnsafeArchiveEntry {
                    entry: PathBuf::from(entry.name()),
                });
            }
        };
        let outpath = destination.join(&relative);

        if is_symlink_mode(entry.unix_mode()) {
            let mut target = String::new();
            entry.read_to_string(&mut target).map_err(|e| {
                FetchbinError::ExtractionFailed {
                    path: archive_path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            let target = PathBuf::from(target.trim_end());
            check_link_target(&relative, Some(&target))?;

            #[cfg(unix)]
            {
                if let Some(parent) = outpath.parent() {
                    fs::ensure_dir_exists(parent)?;
                }
                std::os::unix::fs::symlink(&target, &outpath)?;
            }
            continue;
        }

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::ensure_dir_exists(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    let file_name = archive_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| FetchbinError::NotAFile {
            path: archive_path.to_path_buf(),
        })?;

    // Literal strip, mirroring how release zips name their top-level
    // directory after the archive itself.
    Ok(Unpacked::Archive {
        root: PathBuf::from(file_name.replace(".zip", "")),
    })
}

fn is_symlink_mode(mode: Option<u32>) -> bool {
    mode.map(|m| m & 0o170000 == 0o120000).unwrap_or(false)
}

fn tar_error(path: &Path, err: &std::io::Error) -> FetchbinError {
    FetchbinError::ExtractionFailed {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Reject entry paths that could write outside the destination.
fn check_entry_path(path: &Path) -> Result<()> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));

    if escapes {
        return Err(FetchbinError::UnsafeArchiveEntry {
            entry: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Reject link targets that resolve above the destination directory.
fn check_link_target(entry: &Path, target: Option<&Path>) -> Result<()> {
    let unsafe_entry = || FetchbinError::UnsafeArchiveEntry {
        entry: entry.to_path_buf(),
    };

    let target = target.ok_or_else(unsafe_entry)?;
    if target.is_absolute() {
        return Err(unsafe_entry());
    }

    // Walk the target relative to the link's parent directory; the depth
    // must never drop below the destination root.
    let mut depth = entry.components().count() as i32 - 1;
    for component in target.components() {
        match component {
            Component::ParentDir => depth -= 1,
            Component::Normal(_) => depth += 1,
            _ => {}
        }
        if depth < 0 {
            return Err(unsafe_entry());
        }
    }

    Ok(())
}

/// The common top-level entry of the archive, falling back to the shortest
/// entry name when the members share none.
fn extracted_root(names: &[PathBuf]) -> PathBuf {
    let mut firsts = names.iter().filter_map(|name| name.components().next());
    if let Some(first) = firsts.next() {
        if firsts.all(|component| component == first) {
            return PathBuf::from(first.as_os_str());
        }
    }

    names
        .iter()
        .min_by_key(|name| name.as_os_str().len())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn plain_header(size: u64, entry_type: EntryType) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_size(size);
        header.set_entry_type(entry_type);
        header.set_mode(0o644);
        header
    }

    /// Build a header whose name bytes bypass `set_path` validation, for
    /// adversarial fixtures.
    fn raw_name_header(name: &str, size: u64, entry_type: EntryType) -> tar::Header {
        let mut header = plain_header(size, entry_type);
        header.as_mut_bytes()[..name.len()].copy_from_slice(name.as_bytes());
        header.set_cksum();
        header
    }

    fn raw_link_header(name: &str, target: &str) -> tar::Header {
        let mut header = plain_header(0, EntryType::Symlink);
        {
            let bytes = header.as_mut_bytes();
            bytes[..name.len()].copy_from_slice(name.as_bytes());
            bytes[157..157 + target.len()].copy_from_slice(target.as_bytes());
        }
        header.set_cksum();
        header
    }

    fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = plain_header(data.len() as u64, EntryType::Regular);
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn raw_tar_bytes(headers: Vec<(tar::Header, &[u8])>) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (header, data) in headers {
            builder.append(&header, data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_tar_gz_with_single_top_level_dir() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = tar_gz_bytes(&[
            ("foo-1.0/bin/foo", b"#!/bin/sh\n"),
            ("foo-1.0/README", b"docs"),
        ]);
        let archive = write_file(temp.path(), "foo-1.0.tar.gz", &bytes);

        let unpacked = extract(&archive, temp.path()).unwrap();

        assert_eq!(
            unpacked,
            Unpacked::Archive {
                root: PathBuf::from("foo-1.0")
            }
        );
        assert!(temp.path().join("foo-1.0/bin/foo").is_file());
        assert!(temp.path().join("foo-1.0/README").is_file());
    }

    #[test]
    fn test_uncompressed_tar_is_detected_by_magic() {
        let temp = tempfile::tempdir().unwrap();
        let mut header = plain_header(4, EntryType::Regular);
        let mut builder = tar::Builder::new(Vec::new());
        builder
            .append_data(&mut header, "pkg/tool", &b"bits"[..])
            .unwrap();
        let bytes = builder.into_inner().unwrap();
        let archive = write_file(temp.path(), "pkg.tar", &bytes);

        let unpacked = extract(&archive, temp.path()).unwrap();

        assert_eq!(
            unpacked,
            Unpacked::Archive {
                root: PathBuf::from("pkg")
            }
        );
        assert!(temp.path().join("pkg/tool").is_file());
    }

    #[test]
    fn test_tar_root_falls_back_to_shortest_name() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = tar_gz_bytes(&[("a.txt", b"a"), ("longer/b.txt", b"b")]);
        let archive = write_file(temp.path(), "flat.tar.gz", &bytes);

        let unpacked = extract(&archive, temp.path()).unwrap();

        assert_eq!(
            unpacked,
            Unpacked::Archive {
                root: PathBuf::from("a.txt")
            }
        );
    }

    #[test]
    fn test_tar_traversal_entry_fails_closed() {
        let temp = tempfile::tempdir().unwrap();
        let header = raw_name_header("../evil", 4, EntryType::Regular);
        let bytes = raw_tar_bytes(vec![(header, &b"pwnd"[..])]);
        let archive = write_file(temp.path(), "evil.tar", &bytes);

        let dest = temp.path().join("dest");
        std::fs::create_dir(&dest).unwrap();
        let err = extract(&archive, &dest).unwrap_err();

        assert!(matches!(err, FetchbinError::UnsafeArchiveEntry { .. }));
        assert!(!temp.path().join("evil").exists());
    }

    #[test]
    fn test_tar_escaping_symlink_fails_closed() {
        let temp = tempfile::tempdir().unwrap();
        let header = raw_link_header("pkg/link", "../../etc/passwd");
        let bytes = raw_tar_bytes(vec![(header, &b""[..])]);
        let archive = write_file(temp.path(), "links.tar", &bytes);

        let dest = temp.path().join("dest");
        std::fs::create_dir(&dest).unwrap();
        let err = extract(&archive, &dest).unwrap_err();

        assert!(matches!(err, FetchbinError::UnsafeArchiveEntry { .. }));
    }

    #[test]
    fn test_tar_absolute_symlink_fails_closed() {
        let temp = tempfile::tempdir().unwrap();
        let header = raw_link_header("pkg/link", "/etc/passwd");
        let bytes = raw_tar_bytes(vec![(header, &b""[..])]);
        let archive = write_file(temp.path(), "links.tar", &bytes);

        let dest = temp.path().join("dest");
        std::fs::create_dir(&dest).unwrap();
        let err = extract(&archive, &dest).unwrap_err();

        assert!(matches!(err, FetchbinError::UnsafeArchiveEntry { .. }));
    }

    #[test]
    fn test_truncated_tar_gz_is_an_extraction_failure() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = tar_gz_bytes(&[("pkg/tool", &[0u8; 2048])]);
        let archive = write_file(temp.path(), "pkg.tar.gz", &bytes[..bytes.len() / 2]);

        let err = extract(&archive, temp.path()).unwrap_err();

        assert!(matches!(err, FetchbinError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_zip_root_is_filename_minus_zip_suffix() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[
            ("tool-1.2/", b"".as_slice()),
            ("tool-1.2/tool", b"#!/bin/sh\n".as_slice()),
        ]);
        let archive = write_file(temp.path(), "tool-1.2.zip", &bytes);

        let dest = temp.path().join("dest");
        let unpacked = extract(&archive, &dest).unwrap();

        assert_eq!(
            unpacked,
            Unpacked::Archive {
                root: PathBuf::from("tool-1.2")
            }
        );
        assert!(dest.join("tool-1.2/tool").is_file());
    }

    #[test]
    fn test_zip_root_is_a_guess_even_when_contents_are_flat() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[("tool", b"#!/bin/sh\n".as_slice())]);
        let archive = write_file(temp.path(), "tool.zip", &bytes);

        let dest = temp.path().join("dest");
        let unpacked = extract(&archive, &dest).unwrap();

        // The guessed root happens to name the flat binary itself.
        assert_eq!(
            unpacked,
            Unpacked::Archive {
                root: PathBuf::from("tool")
            }
        );
        assert!(dest.join("tool").is_file());
    }

    #[test]
    fn test_zip_traversal_entry_fails_closed() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[("../evil", b"pwnd".as_slice())]);
        let archive = write_file(temp.path(), "evil.zip", &bytes);

        let dest = temp.path().join("dest");
        let err = extract(&archive, &dest).unwrap_err();

        assert!(matches!(err, FetchbinError::UnsafeArchiveEntry { .. }));
        assert!(!temp.path().join("evil").exists());
    }

    #[test]
    fn test_unsupported_suffix_extracts_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let archive = write_file(temp.path(), "tool.bin", b"raw bytes");

        let dest = temp.path().join("dest");
        let unpacked = extract(&archive, &dest).unwrap();

        assert_eq!(
            unpacked,
            Unpacked::Unsupported {
                extension: ".bin".to_string()
            }
        );
        assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[test]
    fn test_tgz_suffix_is_outside_the_dispatch() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = tar_gz_bytes(&[("pkg/tool", b"bits")]);
        let archive = write_file(temp.path(), "pkg.tgz", &bytes);

        let dest = temp.path().join("dest");
        let unpacked = extract(&archive, &dest).unwrap();

        // ".tgz" contains neither "tar" nor "zip" as a substring, so the
        // dispatch skips it even though the payload is a gzipped tar.
        assert_eq!(
            unpacked,
            Unpacked::Unsupported {
                extension: ".tgz".to_string()
            }
        );
        assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[test]
    fn test_classification_failure_propagates() {
        let temp = tempfile::tempdir().unwrap();
        let archive = write_file(temp.path(), "binary-v1", b"raw bytes");

        let err = extract(&archive, temp.path()).unwrap_err();

        assert!(matches!(err, FetchbinError::NoExtension { .. }));
    }

    #[test]
    fn test_corrupt_zip_is_a_zip_error() {
        let temp = tempfile::tempdir().unwrap();
        let archive = write_file(temp.path(), "broken.zip", b"not a zip at all");

        let err = extract(&archive, temp.path()).unwrap_err();

        assert!(matches!(err, FetchbinError::Zip(_)));
    }
}
