//! Typed locations for generator inputs and outputs.
//!
//! Centralizing path construction keeps the build file, the manifest, and the
//! copy tasks pointing at the same directories.
use std::path::{Path, PathBuf};

/// Default directory for generated STLs and the manifest.
pub const DEFAULT_BUILD_DIR: &str = "builds";
/// Default directory holding the `.scad` sources.
pub const DEFAULT_SOURCE_DIR: &str = "openscad";
/// Default directory holding prebuilt STLs.
pub const DEFAULT_EXTRA_DIR: &str = "openflexure-microscope-extra";
/// Default ninja build file.
pub const DEFAULT_NINJA_FILE: &str = "build.ninja";
/// Manifest file name inside the build directory.
pub const STL_OPTIONS_FILE: &str = "stl_options.json";

#[derive(Debug, Clone)]
pub struct BuildPaths {
    build_dir: PathBuf,
    source_dir: PathBuf,
    extra_dir: PathBuf,
    ninja_file: PathBuf,
}

impl Default for BuildPaths {
    fn default() -> Self {
        Self::new(
            PathBuf::from(DEFAULT_BUILD_DIR),
            PathBuf::from(DEFAULT_SOURCE_DIR),
            PathBuf::from(DEFAULT_EXTRA_DIR),
            PathBuf::from(DEFAULT_NINJA_FILE),
        )
    }
}

impl BuildPaths {
    pub fn new(
        build_dir: PathBuf,
        source_dir: PathBuf,
        extra_dir: PathBuf,
        ninja_file: PathBuf,
    ) -> Self {
        Self {
            build_dir,
            source_dir,
            extra_dir,
            ninja_file,
        }
    }

    pub fn ninja_file(&self) -> &Path {
        &self.ninja_file
    }

    /// Return the `<build_dir>/stl_options.json` path.
    pub fn manifest_path(&self) -> PathBuf {
        self.build_dir.join(STL_OPTIONS_FILE)
    }

    /// Build-file path of a generated output.
    pub fn output(&self, name: &str) -> String {
        self.build_dir.join(name).display().to_string()
    }

    /// Build-file path of a `.scad` source.
    pub fn source(&self, input: &str) -> String {
        self.source_dir.join(input).display().to_string()
    }

    /// Build-file path of a prebuilt STL.
    pub fn extra(&self, name: &str) -> String {
        self.extra_dir.join(name).display().to_string()
    }
}
