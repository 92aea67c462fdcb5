// src/settings.rs

//! Build settings: the axes every lifecycle step reads
//!
//! A [`Settings`] record is built once per invocation (from command-line
//! flags or host detection) and passed by reference to each step. Nothing
//! mutates it after construction.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Linux,
    Macos,
}

impl Os {
    /// Get the OS name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
            Os::Macos => "macos",
        }
    }

    /// The OS this binary was compiled for
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            _ => Os::Linux,
        }
    }

    /// Glob patterns matching dynamic libraries on this OS
    pub fn shared_library_patterns(&self) -> &'static [&'static str] {
        match self {
            Os::Windows => &["*.dll"],
            Os::Linux => &["*.so", "*.so.*"],
            Os::Macos => &["*.dylib"],
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(Os::Windows),
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" => Ok(Os::Macos),
            other => Err(Error::ParseError(format!("Unknown operating system: {}", other))),
        }
    }
}

/// Target CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "armv8")]
    Armv8,
}

impl Arch {
    /// Get the architecture name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Armv8 => "armv8",
        }
    }

    /// The architecture this binary was compiled for
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => Arch::Armv8,
            _ => Arch::X86_64,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "x86_64" | "amd64" => Ok(Arch::X86_64),
            "armv8" | "aarch64" | "arm64" => Ok(Arch::Armv8),
            other => Err(Error::ParseError(format!("Unknown architecture: {}", other))),
        }
    }
}

/// Immutable settings record for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub compiler: String,
    /// Kept as a free string; staging rejects values it cannot map
    pub build_type: String,
}

impl Settings {
    /// Create a settings record
    pub fn new(os: Os, arch: Arch, compiler: impl Into<String>, build_type: impl Into<String>) -> Self {
        Self {
            os,
            arch,
            compiler: compiler.into(),
            build_type: build_type.into(),
        }
    }

    /// Settings for the host with the platform's usual compiler
    pub fn host(build_type: impl Into<String>) -> Self {
        let os = Os::host();
        Self::new(os, Arch::host(), default_compiler(os), build_type)
    }

    /// Variables available to `%(name)s` substitution
    pub fn variables(&self) -> [(&'static str, &str); 4] {
        [
            ("os", self.os.as_str()),
            ("arch", self.arch.as_str()),
            ("compiler", &self.compiler),
            ("build_type", &self.build_type),
        ]
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {} {}", self.os, self.arch, self.compiler, self.build_type)
    }
}

/// Usual compiler name for an OS
pub fn default_compiler(os: Os) -> &'static str {
    match os {
        Os::Windows => "msvc",
        Os::Macos => "apple-clang",
        Os::Linux => "gcc",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_parsing() {
        assert_eq!("windows".parse::<Os>().unwrap(), Os::Windows);
        assert_eq!("Linux".parse::<Os>().unwrap(), Os::Linux);
        assert_eq!("darwin".parse::<Os>().unwrap(), Os::Macos);
        assert!("beos".parse::<Os>().is_err());
    }

    #[test]
    fn test_arch_parsing() {
        assert_eq!("x86_64".parse::<Arch>().unwrap(), Arch::X86_64);
        assert_eq!("aarch64".parse::<Arch>().unwrap(), Arch::Armv8);
        assert!("mips".parse::<Arch>().is_err());
    }

    #[test]
    fn test_shared_library_patterns() {
        assert_eq!(Os::Windows.shared_library_patterns(), &["*.dll"]);
        assert!(Os::Linux.shared_library_patterns().contains(&"*.so.*"));
        assert_eq!(Os::Macos.shared_library_patterns(), &["*.dylib"]);
    }

    #[test]
    fn test_settings_variables() {
        let settings = Settings::new(Os::Linux, Arch::X86_64, "clang", "Debug");
        let vars = settings.variables();
        assert!(vars.contains(&("os", "linux")));
        assert!(vars.contains(&("build_type", "Debug")));
        assert_eq!(settings.to_string(), "linux/x86_64 clang Debug");
    }
}
