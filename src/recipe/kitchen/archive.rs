// src/recipe/kitchen/archive.rs

//! Archive and source file utilities for the Kitchen

use crate::error::{Error, Result};
use crate::hash::sha256_file;
use std::path::Path;
use std::process::Command;

/// Download a file from a URL
pub fn download_file(url: &str, dest: &Path) -> Result<()> {
    let dest_str = path_str(dest)?;
    let output = Command::new("curl")
        .args(["-fsSL", "-o", dest_str, url])
        .output()
        .map_err(|e| Error::DownloadError(format!("curl failed: {}", e)))?;

    if !output.status.success() {
        return Err(Error::DownloadError(format!(
            "Failed to download {}: {}",
            url,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

/// Verify a file against an `algorithm:hash` checksum
///
/// Only `sha256` is supported.
pub fn verify_file_checksum(path: &Path, expected: &str) -> Result<()> {
    let (algorithm, expected_hash) = expected
        .split_once(':')
        .ok_or_else(|| Error::ParseError(format!("Invalid checksum format: {}", expected)))?;

    if algorithm != "sha256" {
        return Err(Error::ParseError(format!(
            "Unsupported checksum algorithm: {} (supported: sha256)",
            algorithm
        )));
    }

    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected_hash) {
        return Err(Error::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected_hash.to_string(),
            actual,
        });
    }

    Ok(())
}

/// Extract an archive to a destination directory
///
/// Supports: .tar.gz, .tgz, .tar.xz, .txz, .tar.bz2, .tar, .zip
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let filename = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let archive_str = path_str(archive)?;
    let dest_str = path_str(dest)?;

    let (program, args): (&str, Vec<&str>) =
        if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
            ("tar", vec!["-xzf", archive_str, "-C", dest_str])
        } else if filename.ends_with(".tar.xz") || filename.ends_with(".txz") {
            ("tar", vec!["-xJf", archive_str, "-C", dest_str])
        } else if filename.ends_with(".tar.bz2") {
            ("tar", vec!["-xjf", archive_str, "-C", dest_str])
        } else if filename.ends_with(".tar") {
            ("tar", vec!["-xf", archive_str, "-C", dest_str])
        } else if filename.ends_with(".zip") {
            ("unzip", vec!["-q", "-o", archive_str, "-d", dest_str])
        } else {
            return Err(Error::ParseError(format!(
                "Unknown archive format: {}",
                filename
            )));
        };

    std::fs::create_dir_all(dest)?;

    let output = Command::new(program)
        .args(&args)
        .output()
        .map_err(|e| Error::IoError(format!("{} failed: {}", program, e)))?;

    if !output.status.success() {
        return Err(Error::IoError(format!(
            "Failed to extract archive: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

/// File name component of a URL
pub fn url_filename(url: &str) -> &str {
    url.split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("source.tar.gz")
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::IoError(format!("Path is not valid UTF-8: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_checksum_format() {
        let result = verify_file_checksum(Path::new("/nonexistent"), "invalid");
        assert!(result.is_err());

        let result = verify_file_checksum(Path::new("/nonexistent"), "md5:abc");
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_verify_checksum() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "hello").unwrap();

        let good = "sha256:2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824";
        assert!(verify_file_checksum(file.path(), good).is_ok());

        let bad = "sha256:0000";
        assert!(matches!(
            verify_file_checksum(file.path(), bad),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_extract_archive_unknown_format() {
        let result = extract_archive(Path::new("file.unknown"), Path::new("/tmp"));
        assert!(result.is_err());
    }

    #[test]
    fn test_url_filename() {
        assert_eq!(
            url_filename("https://example.com/dl/dotnet-runtime-9.0.4-linux-x64.tar.gz"),
            "dotnet-runtime-9.0.4-linux-x64.tar.gz"
        );
        assert_eq!(url_filename("https://example.com/a.zip?token=1"), "a.zip");
        assert_eq!(url_filename("https://example.com/dir/"), "dir");
    }
}
