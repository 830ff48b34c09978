use super::config::BuildConfig;
use super::error::Error;
use super::script::{INPUT_PDB, LeapScript, SCRIPT_NAME};
use super::tool::{LeapRunner, clean_outdir, non_empty};
use crate::io::pdb;
use crate::model::structure::Structure;
use crate::prep::{
    self, BondDirective, CapReport, CapSpec, ConversionReport, ConvertOptions, RuleTable,
};
use log::{info, warn};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File tleap's console output is captured in.
pub const LOG_FILE: &str = "log.txt";

/// Where a [`BuildSession`] stands.
///
/// Without ionization a session goes straight from `Unbuilt` to
/// `BuiltFinal`. With it, the first build is set aside as `*.noions.*`,
/// the ionizer adds ions, and a second build produces the final files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Unbuilt,
    BuiltWithoutIons,
    Ionized,
    BuiltFinal,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Unbuilt => "unbuilt",
            BuildStage::BuiltWithoutIons => "built without ions",
            BuildStage::Ionized => "ionized",
            BuildStage::BuiltFinal => "built",
        };
        f.write_str(name)
    }
}

/// Files produced by one tleap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProducts {
    pub topology: PathBuf,
    pub coordinates: PathBuf,
    pub log: PathBuf,
}

/// Adds ions to a built structure.
///
/// Receives the prepared structure and the topology built from it without
/// ions (which carries its net charge), and returns the structure with ions
/// placed.
pub trait Ionizer {
    fn ionize(
        &mut self,
        structure: &Structure,
        unionized: &BuildProducts,
    ) -> Result<Structure, Box<dyn std::error::Error + Send + Sync>>;
}

/// Result of a finished session.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The structure as last written to `input.pdb`.
    pub structure: Structure,
    /// `None` when tleap was not executed.
    pub products: Option<BuildProducts>,
    pub script: PathBuf,
    pub pdb: PathBuf,
    pub conversion: ConversionReport,
    pub caps: CapReport,
    pub bonds: Vec<BondDirective>,
}

/// One AMBER build of one structure into one output directory.
pub struct BuildSession<R> {
    config: BuildConfig,
    outdir: PathBuf,
    rules: Option<RuleTable>,
    runner: R,
    ionizer: Option<Box<dyn Ionizer>>,
    stage: BuildStage,
    structure: Structure,
    products: Option<BuildProducts>,
    conversion: ConversionReport,
    caps: CapReport,
    bonds: Vec<BondDirective>,
}

impl<R: LeapRunner> BuildSession<R> {
    /// Starts a session. Loads the rule file named in `config`, if any.
    pub fn new(
        structure: Structure,
        config: BuildConfig,
        outdir: impl Into<PathBuf>,
        runner: R,
    ) -> Result<Self, Error> {
        let rules = config
            .rules
            .as_deref()
            .map(RuleTable::load)
            .transpose()?;

        Ok(Self {
            config,
            outdir: outdir.into(),
            rules,
            runner,
            ionizer: None,
            stage: BuildStage::Unbuilt,
            structure,
            products: None,
            conversion: ConversionReport::default(),
            caps: CapReport::default(),
            bonds: Vec::new(),
        })
    }

    /// Uses `rules` instead of the rule file named in the configuration.
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_ionizer(mut self, ionizer: impl Ionizer + 'static) -> Self {
        self.ionizer = Some(Box::new(ionizer));
        self
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn products(&self) -> Option<&BuildProducts> {
        self.products.as_ref()
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Performs exactly one stage transition and returns the new stage.
    /// Advancing a finished session does nothing.
    pub fn advance(&mut self) -> Result<BuildStage, Error> {
        self.stage = match self.stage {
            BuildStage::Unbuilt => self.first_build()?,
            BuildStage::BuiltWithoutIons => self.add_ions()?,
            BuildStage::Ionized => {
                self.build_pass(true)?;
                BuildStage::BuiltFinal
            }
            BuildStage::BuiltFinal => BuildStage::BuiltFinal,
        };
        Ok(self.stage)
    }

    /// Advances until the build is final.
    pub fn run(mut self) -> Result<BuildOutcome, Error> {
        while self.stage != BuildStage::BuiltFinal {
            self.advance()?;
        }
        Ok(self.into_outcome())
    }

    pub fn into_outcome(self) -> BuildOutcome {
        BuildOutcome {
            script: self.outdir.join(SCRIPT_NAME),
            pdb: self.outdir.join(INPUT_PDB),
            structure: self.structure,
            products: self.products,
            conversion: self.conversion,
            caps: self.caps,
            bonds: self.bonds,
        }
    }

    fn ionizing(&self) -> bool {
        self.config.ionize && self.config.execute
    }

    fn first_build(&mut self) -> Result<BuildStage, Error> {
        if self.ionizing() && self.ionizer.is_none() {
            return Err(Error::MissingIonizer);
        }
        if self.config.ionize && !self.config.execute {
            warn!("Ionization is skipped when tleap is not executed");
        }

        fs::create_dir_all(&self.outdir).map_err(|e| Error::io(&self.outdir, e))?;
        clean_outdir(&self.outdir, &self.config.prefix)?;

        prep::check_segments(&self.structure)?;

        if let Some(rules) = &self.rules {
            info!("Converting lipids to the AMBER naming convention");
            let options = ConvertOptions {
                segment_prefix: self.config.prepare.segment_prefix.clone(),
            };
            let (converted, report) = prep::convert(&self.structure, rules, &options)?;
            self.structure = converted;
            self.conversion = report;
        }

        let spec = match &self.config.prepare.caps {
            Some(spec) => spec.clone(),
            None => CapSpec::default_for(&self.structure),
        };
        self.caps = prep::apply_caps(&mut self.structure, &spec)?;

        if self.ionizing() {
            self.build_pass(false)?;
            self.set_aside_unionized()?;
            Ok(BuildStage::BuiltWithoutIons)
        } else {
            self.build_pass(true)?;
            Ok(BuildStage::BuiltFinal)
        }
    }

    fn add_ions(&mut self) -> Result<BuildStage, Error> {
        let Some(products) = self.products.as_ref() else {
            return Err(Error::MissingProducts {
                log: self.outdir.join(LOG_FILE),
            });
        };
        let ionizer = self.ionizer.as_mut().ok_or(Error::MissingIonizer)?;

        let ionized = ionizer
            .ionize(&self.structure, products)
            .map_err(Error::Ionization)?;
        info!(
            "Ionizer added {} atoms",
            ionized
                .atom_count()
                .saturating_sub(self.structure.atom_count())
        );
        self.structure = ionized;
        Ok(BuildStage::Ionized)
    }

    /// Writes `input.pdb` and `tleap.in`, then runs tleap if enabled.
    /// Disulfide bonds are patched only on the final pass.
    fn build_pass(&mut self, final_pass: bool) -> Result<(), Error> {
        let parameters = copy_inputs(&self.config.parameters, &self.outdir)?;
        let topologies = copy_inputs(&self.config.topologies, &self.outdir)?;

        self.bonds = if final_pass {
            prep::resolve_patches(&mut self.structure, &self.config.prepare.disulfides)?
        } else {
            Vec::new()
        };

        info!("Writing PDB file for input to tleap");
        let pdb_path = self.outdir.join(INPUT_PDB);
        let file = File::create(&pdb_path).map_err(|e| Error::io(&pdb_path, e))?;
        let mut writer = BufWriter::new(file);
        pdb::write(&mut writer, &self.structure)?;
        writer.flush().map_err(|e| Error::io(&pdb_path, e))?;

        let script = LeapScript {
            forcefields: self.config.forcefields.clone(),
            parameters,
            topologies,
            ..LeapScript::new(self.config.prefix.as_str())
        }
        .with_bonds(&self.bonds);
        let script_path = self.outdir.join(SCRIPT_NAME);
        fs::write(&script_path, script.to_string()).map_err(|e| Error::io(&script_path, e))?;

        if !self.config.execute {
            info!("Wrote {} without running tleap", script_path.display());
            self.products = None;
            return Ok(());
        }

        let log = self.outdir.join(LOG_FILE);
        self.runner.run(&self.outdir, SCRIPT_NAME, &log)?;

        let topology = self.outdir.join(script.topology_file());
        let coordinates = self.outdir.join(script.coordinate_file());
        if non_empty(&topology).is_none() || non_empty(&coordinates).is_none() {
            return Err(Error::MissingProducts { log });
        }
        self.products = Some(BuildProducts {
            topology,
            coordinates,
            log,
        });
        Ok(())
    }

    fn set_aside_unionized(&mut self) -> Result<(), Error> {
        let Some(products) = self.products.take() else {
            return Ok(());
        };
        let stem = format!("{}.noions", self.config.prefix);
        let topology = self.outdir.join(format!("{stem}.prmtop"));
        let coordinates = self.outdir.join(format!("{stem}.crd"));

        fs::rename(&products.topology, &topology).map_err(|e| Error::io(&products.topology, e))?;
        fs::rename(&products.coordinates, &coordinates)
            .map_err(|e| Error::io(&products.coordinates, e))?;

        self.products = Some(BuildProducts {
            topology,
            coordinates,
            log: products.log,
        });
        Ok(())
    }
}

/// Copies each file into `outdir` and returns the bare file names.
fn copy_inputs(paths: &[PathBuf], outdir: &Path) -> Result<Vec<String>, Error> {
    paths
        .iter()
        .map(|path| {
            let name = match path.file_name() {
                Some(name) if path.is_file() => name,
                _ => return Err(Error::MissingInput { path: path.clone() }),
            };
            let target = outdir.join(name);
            if fs::canonicalize(path).ok() != fs::canonicalize(&target).ok() {
                fs::copy(path, &target).map_err(|e| Error::io(path, e))?;
            }
            Ok(name.to_string_lossy().into_owned())
        })
        .collect()
}
