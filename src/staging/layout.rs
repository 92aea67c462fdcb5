// src/staging/layout.rs

//! Mapping from build type to staging destinations

use crate::error::{Error, Result};
use crate::recipe::StagingLayout;
use std::path::{Path, PathBuf};

/// Output configurations a build type produces
///
/// A multi-config project generated for `Release` can build both `Release`
/// and `RelWithDebInfo` without being regenerated, so both must be staged.
pub fn output_configurations(build_type: &str) -> Result<&'static [&'static str]> {
    match build_type {
        "Debug" => Ok(&["Debug"]),
        "Release" => Ok(&["Release", "RelWithDebInfo"]),
        other => Err(Error::UnsupportedBuildType(other.to_string())),
    }
}

/// Every directory staging must populate for a build type
///
/// Fails for unknown build types regardless of layout.
pub fn destinations(layout: StagingLayout, build_type: &str, root: &Path) -> Result<Vec<PathBuf>> {
    let configs = output_configurations(build_type)?;

    Ok(match layout {
        StagingLayout::MultiConfig => configs.iter().map(|c| root.join(c)).collect(),
        StagingLayout::Flat => vec![root.to_path_buf()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_configurations() {
        assert_eq!(output_configurations("Debug").unwrap(), &["Debug"]);
        assert_eq!(
            output_configurations("Release").unwrap(),
            &["Release", "RelWithDebInfo"]
        );
        assert!(matches!(
            output_configurations("release"),
            Err(Error::UnsupportedBuildType(_))
        ));
        assert!(output_configurations("MinSizeRel").is_err());
    }

    #[test]
    fn test_destinations() {
        let root = Path::new("/out/bin");

        let multi = destinations(StagingLayout::MultiConfig, "Release", root).unwrap();
        assert_eq!(
            multi,
            vec![PathBuf::from("/out/bin/Release"), PathBuf::from("/out/bin/RelWithDebInfo")]
        );

        let flat = destinations(StagingLayout::Flat, "Debug", root).unwrap();
        assert_eq!(flat, vec![PathBuf::from("/out/bin")]);

        assert!(destinations(StagingLayout::Flat, "Profile", root).is_err());
    }
}
