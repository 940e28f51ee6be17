// src/commands/resolve.rs
//! Output resolution command

use crate::cli::ResolveArgs;
use anyhow::{Context, Result};
use niiprep::{ConverterOutputs, LogReporter, ResolveConfig, load_config, resolve_outputs};
use tracing::{debug, info};

/// Merge the optional config file with command-line overrides
fn effective_config(args: &ResolveArgs) -> Result<ResolveConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => ResolveConfig::default(),
    };

    if let Some(mode) = args.bids_sidecar {
        config.bids_sidecar = mode;
    }
    if args.modality.is_some() {
        config.modality = args.modality.clone();
    }
    config.ignore_errors |= args.ignore_errors;
    config.output_nrrd |= args.output_nrrd;
    config.pydeface_intermediaries |= args.pydeface_intermediaries;

    Ok(config)
}

/// Describe and relocate converter outputs
pub fn cmd_resolve(args: &ResolveArgs) -> Result<()> {
    let config = effective_config(args)?;
    debug!("Effective resolve configuration: {:?}", config);

    if let Some(input_dir) = &args.input_dir {
        info!("Converter input was {}", input_dir.display());
    }

    let outputs = ConverterOutputs {
        sidecars: args.sidecars.clone(),
        images: args.images.clone(),
    };

    let summary = resolve_outputs(
        &outputs,
        &args.work_dir,
        &args.output_dir,
        &config.resolve_options(),
        &LogReporter,
    )
    .with_context(|| format!("Failed to resolve outputs in {}", args.work_dir.display()))?;

    for path in &summary.moved {
        println!("{}", path.display());
    }
    Ok(())
}
