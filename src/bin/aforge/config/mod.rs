mod build;
mod prep;

pub use build::build_build_config;
pub use prep::{build_prepare_config, load_rules};
