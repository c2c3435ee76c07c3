//! Engine construction: load everything once, share it immutably.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::engine::config::Config;
use crate::features::{fnv32a, read_feature_generators_default, AggregateGenerator};
use crate::guide::HashingGuide;
use crate::ml::LinearModel;
use crate::system::{transition_system, LabelNumberer, TransitionSystem};

/// A fully loaded parsing pipeline.
///
/// The transition system, feature generator, label numbering, and model are
/// loaded at construction and immutable afterwards, so one engine can serve
/// any number of parallel workers.
pub struct ParserEngine {
    pub(crate) config: Config,
    pub(crate) system: Box<dyn TransitionSystem>,
    pub(crate) generator: AggregateGenerator,
    pub(crate) numberer: LabelNumberer,
    pub(crate) model: LinearModel,
}

impl ParserEngine {
    /// Load an engine from a configuration file.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        Self::new(Config::from_path(path)?)
    }

    pub fn new(config: Config) -> Result<Self> {
        let system = transition_system(&config.parser.system)
            .ok_or_else(|| anyhow!("Unknown transition system: {}", config.parser.system))?;

        if config.parser.pproj {
            log::warn!(
                "pproj is enabled, but runtime deprojectivization is not applied; \
                 predicted arcs are emitted as-is"
            );
        }

        let features = File::open(&config.parser.features).with_context(|| {
            format!("Cannot open feature template file {}", config.parser.features)
        })?;
        let generator = read_feature_generators_default(BufReader::new(features))
            .with_context(|| {
                format!("Cannot read feature templates from {}", config.parser.features)
            })?;
        if generator.is_empty() {
            return Err(anyhow!(
                "Feature template file {} defines no generators",
                config.parser.features
            ));
        }

        let transitions = File::open(&config.parser.transitions).with_context(|| {
            format!("Cannot open transitions file {}", config.parser.transitions)
        })?;
        let numberer = LabelNumberer::from_reader(BufReader::new(transitions), system.as_ref())
            .with_context(|| {
                format!("Cannot read transitions from {}", config.parser.transitions)
            })?;
        if numberer.is_empty() {
            return Err(anyhow!(
                "Transitions file {} is empty",
                config.parser.transitions
            ));
        }

        let model = LinearModel::from_path(Path::new(&config.parser.model))
            .with_context(|| format!("Cannot load model from {}", config.parser.model))?;
        if model.nr_feature() != config.parser.hash_kernel_size as usize {
            log::warn!(
                "Model has {} features, but the hash kernel size is {}; \
                 buckets past the model are ignored",
                model.nr_feature(),
                config.parser.hash_kernel_size
            );
        }

        log::info!(
            "Loaded {} system, {} feature generators, {} transitions, kernel size {}",
            system.name(),
            generator.len(),
            numberer.len(),
            config.parser.hash_kernel_size
        );

        Ok(ParserEngine {
            config,
            system,
            generator,
            numberer,
            model,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn system(&self) -> &dyn TransitionSystem {
        self.system.as_ref()
    }

    pub fn numberer(&self) -> &LabelNumberer {
        &self.numberer
    }

    /// A guide with its own scratch state, borrowing the shared model.
    pub fn guide(&self) -> HashingGuide<'_, LinearModel> {
        HashingGuide::new(
            self.system.as_ref(),
            &self.generator,
            &self.numberer,
            &self.model,
            fnv32a,
            self.config.parser.hash_kernel_size,
        )
    }
}
