use std::path::Path;

use anyhow::{Context, Result};

use amber_forge::prep::{CapPair, CapSpec, DisulfidePair, PrepareConfig, ResidueRef, RuleTable};

use crate::cli::PrepOptions;

pub fn build_prepare_config(opts: &PrepOptions) -> PrepareConfig {
    let mut config = PrepareConfig::default();
    apply_prep_options(&mut config, opts);
    config
}

/// Overlays the options given on the command line onto `config`.
pub fn apply_prep_options(config: &mut PrepareConfig, opts: &PrepOptions) {
    if let Some(prefix) = &opts.segment_prefix {
        config.segment_prefix = prefix.clone();
    }

    if opts.no_caps {
        config.caps = Some(CapSpec::new());
    } else if !opts.caps.is_empty() {
        config.caps = Some(
            opts.caps
                .iter()
                .map(|cap| {
                    let pair = CapPair::new(cap.n.as_deref(), cap.c.as_deref());
                    (cap.segment_id.clone(), pair)
                })
                .collect(),
        );
    }

    if !opts.disulfides.is_empty() {
        config.disulfides = opts
            .disulfides
            .iter()
            .map(|ss| {
                DisulfidePair::new(
                    ResidueRef::new(ss.first.0.as_str(), ss.first.1),
                    ResidueRef::new(ss.second.0.as_str(), ss.second.1),
                )
            })
            .collect();
    }
}

pub fn load_rules(path: Option<&Path>) -> Result<Option<RuleTable>> {
    path.map(|path| {
        RuleTable::load(path)
            .with_context(|| format!("Failed to load conversion rules: {}", path.display()))
    })
    .transpose()
}
