use anyhow::{Context, Result};

use amber_forge::BuildConfig;

use super::prep::apply_prep_options;
use crate::cli::BuildArgs;

/// Loads the build file (if any) and overlays the command-line options.
pub fn build_build_config(args: &BuildArgs) -> Result<BuildConfig> {
    let mut config = match &args.config {
        Some(path) => BuildConfig::load(path)
            .with_context(|| format!("Failed to load build configuration: {}", path.display()))?,
        None => BuildConfig::default(),
    };

    apply_prep_options(&mut config.prepare, &args.prep);
    if let Some(rules) = &args.prep.rules {
        config.rules = Some(rules.clone());
    }

    let leap = &args.leap;
    if !leap.forcefields.is_empty() {
        config.forcefields = leap.forcefields.clone();
    }
    config.topologies.extend(leap.topologies.iter().cloned());
    config.parameters.extend(leap.parameters.iter().cloned());
    if let Some(prefix) = &leap.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(tleap) = &leap.tleap {
        config.tleap = tleap.clone();
    }
    if leap.dry_run {
        config.execute = false;
    }

    Ok(config)
}
