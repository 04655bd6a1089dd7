// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Loads a converted QA model from a directory:
//
//   model_dir/
//     model_config.json   <- TransformerQaConfig (architecture)
//     model.mpk.gz        <- weights, written by CompactRecorder
//
// The config is needed first: burn rebuilds the exact module
// tree from it and only then pours the recorded weights in.
// Loading fails if the record does not match the architecture.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::ml::model::{TransformerQaConfig, TransformerQaModel};

const CONFIG_FILE:  &str = "model_config.json";
// CompactRecorder appends ".mpk.gz" itself
const WEIGHTS_STEM: &str = "model";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write config and weights. Used by conversion tooling and tests.
    pub fn save<B: Backend>(
        &self,
        config: &TransformerQaConfig,
        model:  &TransformerQaModel<B>,
    ) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let config_path = self.dir.join(CONFIG_FILE);
        config.save(&config_path)
            .with_context(|| format!("Cannot write config to '{}'", config_path.display()))?;

        let weights = self.dir.join(WEIGHTS_STEM);
        CompactRecorder::new()
            .record(model.clone().into_record(), weights.clone())
            .map_err(|e| anyhow!("Failed to save weights to '{}': {e:?}", weights.display()))?;

        tracing::debug!("Saved model to '{}'", self.dir.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TransformerQaConfig> {
        let path = self.dir.join(CONFIG_FILE);
        TransformerQaConfig::load(&path).map_err(|e| {
            anyhow!("Cannot read model config from '{}': {e:?}", path.display())
        })
    }

    /// `model` must already have the architecture described by the config.
    pub fn load_model<B: Backend>(
        &self,
        model:  TransformerQaModel<B>,
        device: &B::Device,
    ) -> Result<TransformerQaModel<B>> {
        let path = self.dir.join(WEIGHTS_STEM);
        tracing::info!("Loading weights from '{}'", path.display());

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .map_err(|e| anyhow!(
                "Cannot load weights '{}.mpk.gz': {e:?}", path.display()
            ))?;

        Ok(model.load_record(record))
    }
}
