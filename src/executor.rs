//! External tools: the OpenSCAD command written into the build file and the
//! ninja run that consumes it.
use crate::ninja::escape_value;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::Instant;

/// Environment variable overriding the OpenSCAD executable.
pub const OPENSCAD_ENV: &str = "OPENSCAD";
/// Where the macOS app bundle installs OpenSCAD.
pub const MACOS_OPENSCAD: &str = "/Applications/OpenSCAD.app/Contents/MacOS/OpenSCAD";

/// Pick the OpenSCAD executable: flag, then `$OPENSCAD`, then the platform default.
pub fn resolve_openscad(cli: Option<&str>) -> String {
    let env = std::env::var(OPENSCAD_ENV).ok();
    choose_openscad(cli, env.as_deref(), cfg!(target_os = "macos"))
}

fn choose_openscad(cli: Option<&str>, env: Option<&str>, macos: bool) -> String {
    if let Some(path) = cli.or(env).filter(|path| !path.is_empty()) {
        return path.to_string();
    }
    if macos {
        MACOS_OPENSCAD.to_string()
    } else {
        "openscad".to_string()
    }
}

/// Quote the executable for the shell ninja runs rules through, then escape
/// it for the ninja file itself.
pub fn openscad_command(executable: &str) -> String {
    escape_value(&shell_words::quote(executable))
}

/// Run ninja on `ninja_file`, passing `args` through untouched.
pub fn run_ninja(ninja_file: &Path, args: &[String]) -> Result<ExitStatus> {
    let ninja = which::which("ninja").map_err(|err| anyhow!("locate ninja: {err}"))?;
    tracing::info!(ninja = %ninja.display(), ?args, "running ninja");

    let start = Instant::now();
    let status = Command::new(&ninja)
        .arg("-f")
        .arg(ninja_file)
        .args(args)
        .status()
        .with_context(|| format!("spawn {}", ninja.display()))?;
    let elapsed_ms = start.elapsed().as_millis();
    tracing::info!(elapsed_ms, success = status.success(), "ninja finished");
    Ok(status)
}
