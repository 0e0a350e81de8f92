use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod emitter;
mod encode;
mod error;
mod executor;
mod merge;
mod microscope;
mod ninja;
mod paths;
mod registry;
mod schema;
mod staging;
mod templates;
mod value;

use crate::cli::RootArgs;
use crate::emitter::Generator;
use crate::microscope::VariantOptions;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);
    run(args)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "flexbuild=debug" } else { "flexbuild=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: RootArgs) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => catalog::load_catalog(path)?,
        None => catalog::default_catalog()?,
    };

    let paths = args.paths();
    let openscad = executor::resolve_openscad(args.openscad.as_deref());
    let mut generator = Generator::new(
        paths.clone(),
        &executor::openscad_command(&openscad),
        args.generate_stl_options_json,
    );
    microscope::declare_all(
        &mut generator,
        VariantOptions {
            include_extra_files: args.include_extra_files,
        },
    )
    .context("declare microscope parts")?;
    if let Some(registry) = generator.registry() {
        tracing::debug!(
            edges = generator.graph().edges().len(),
            records = registry.records().len(),
            selection_keys = registry.selection_keys().len(),
            "parts declared"
        );
    }
    let generated = generator
        .finish(&catalog)
        .context("validate STL options")?;

    // Nothing is written until every check above has passed.
    staging::write_atomic_text(paths.ninja_file(), &generated.graph.render())?;
    tracing::info!(path = %paths.ninja_file().display(), "wrote build file");
    if let Some(manifest) = &generated.manifest {
        let manifest_path = paths.manifest_path();
        staging::write_atomic_json(&manifest_path, manifest)?;
        tracing::info!(
            path = %manifest_path.display(),
            stls = manifest.stls.len(),
            options = manifest.options.len(),
            "wrote STL options"
        );
    }

    if args.no_build {
        return Ok(());
    }
    let status = executor::run_ninja(paths.ninja_file(), &args.ninja_args)?;
    if !status.success() {
        return Err(anyhow!("ninja failed with status {status}"));
    }
    Ok(())
}
