use super::error::Error;
use crate::prep::PrepareConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a build needs besides the structure itself.
///
/// Loadable from TOML; every key is optional:
///
/// ```
/// use amber_forge::BuildConfig;
///
/// let config = BuildConfig::from_toml_str(r#"
///     forcefields = ["leaprc.protein.ff14SB"]
///     prefix = "system"
///     rules = "charmmlipid2amber.csv"
///
///     [caps]
///     P = ["ACE", ""]
///
///     [[disulfides]]
///     first = { segment_id = "P", residue_id = 10 }
///     second = { segment_id = "P", residue_id = 40 }
/// "#)?;
///
/// assert_eq!(config.prefix, "system");
/// assert_eq!(config.prepare.disulfides.len(), 1);
/// assert_eq!(config.tleap.to_str(), Some("tleap"));
/// # Ok::<(), amber_forge::BuildError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// leaprc files sourced at the top of the script.
    #[serde(default = "default_forcefields")]
    pub forcefields: Vec<String>,
    /// prepi topologies, copied into the output directory.
    #[serde(default)]
    pub topologies: Vec<PathBuf>,
    /// frcmod parameter files, copied into the output directory.
    #[serde(default)]
    pub parameters: Vec<PathBuf>,
    /// Stem of the generated `.prmtop` and `.crd` files.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Lipid convention rule file. No conversion happens without one.
    #[serde(default)]
    pub rules: Option<PathBuf>,
    /// Build once, ionize, then rebuild with ions.
    #[serde(default)]
    pub ionize: bool,
    /// tleap executable name or path.
    #[serde(default = "default_tleap")]
    pub tleap: PathBuf,
    /// Run tleap. When off, only `tleap.in` and `input.pdb` are written.
    #[serde(default = "default_execute")]
    pub execute: bool,
    #[serde(flatten)]
    pub prepare: PrepareConfig,
}

fn default_forcefields() -> Vec<String> {
    ["leaprc.lipid14", "leaprc.ff14SB", "leaprc.gaff"]
        .map(String::from)
        .to_vec()
}

fn default_prefix() -> String {
    "structure".to_string()
}

fn default_tleap() -> PathBuf {
    PathBuf::from("tleap")
}

fn default_execute() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            forcefields: default_forcefields(),
            topologies: Vec::new(),
            parameters: Vec::new(),
            prefix: default_prefix(),
            rules: None,
            ionize: false,
            tleap: default_tleap(),
            execute: default_execute(),
            prepare: PrepareConfig::default(),
        }
    }
}

impl BuildConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
