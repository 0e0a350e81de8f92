//! CLI argument parsing for the microscope build generator.
//!
//! One flat `RootArgs`: generate the build file, optionally the STL option
//! manifest, then hand everything after the known flags to ninja.
use crate::paths::{
    BuildPaths, DEFAULT_BUILD_DIR, DEFAULT_EXTRA_DIR, DEFAULT_NINJA_FILE, DEFAULT_SOURCE_DIR,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "flexbuild",
    version,
    about = "Generate the microscope ninja build and STL option manifest",
    after_help = "Examples:\n  flexbuild --generate-stl-options-json\n  flexbuild --no-build --include-extra-files\n  flexbuild -- -j4 builds/feet.stl"
)]
pub struct RootArgs {
    /// Write builds/stl_options.json describing which STLs each option set needs
    #[arg(long)]
    pub generate_stl_options_json: bool,

    /// Copy prebuilt STLs for cameras without an OpenSCAD mount
    #[arg(long)]
    pub include_extra_files: bool,

    /// Option docs, presets and required STLs (defaults to the built-in catalog)
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Directory receiving STLs and the manifest
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BUILD_DIR)]
    pub build_dir: PathBuf,

    /// Directory holding the .scad sources
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SOURCE_DIR)]
    pub source_dir: PathBuf,

    /// Directory holding prebuilt STLs
    #[arg(long, value_name = "DIR", default_value = DEFAULT_EXTRA_DIR)]
    pub extra_dir: PathBuf,

    /// Ninja build file to write
    #[arg(long, value_name = "PATH", default_value = DEFAULT_NINJA_FILE)]
    pub ninja_file: PathBuf,

    /// OpenSCAD executable (falls back to $OPENSCAD)
    #[arg(long, value_name = "PATH")]
    pub openscad: Option<String>,

    /// Stop after writing the build file
    #[arg(long)]
    pub no_build: bool,

    /// Log every registration and dropped option
    #[arg(long)]
    pub verbose: bool,

    /// Arguments passed through to ninja
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "NINJA_ARGS")]
    pub ninja_args: Vec<String>,
}

impl RootArgs {
    pub fn paths(&self) -> BuildPaths {
        BuildPaths::new(
            self.build_dir.clone(),
            self.source_dir.clone(),
            self.extra_dir.clone(),
            self.ninja_file.clone(),
        )
    }
}
