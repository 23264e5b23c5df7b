use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::EffectsConfig,
    effects::{EffectName, EffectParams, EffectRegistry},
    error::{EffectError, Result},
    video::types::{EffectedFrame, Frame, NormalizedFrame},
};

/// How an effect is chosen for each image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSelection {
    /// Uniformly at random from the catalog, independently per image
    Random,
    /// `catalog[index % catalog.len()]`, reproducible without a seed
    ByIndex,
    /// Taken from an explicit per-image list, cycled when it is shorter
    Explicit,
}

impl Default for EffectSelection {
    fn default() -> Self {
        Self::Random
    }
}

/// Per-invocation effect picker
///
/// Owns its random source, so concurrent pipelines never share state.
pub struct EffectSelector {
    selection: EffectSelection,
    catalog: Vec<EffectName>,
    explicit: Vec<EffectName>,
    rng: SmallRng,
}

impl EffectSelector {
    pub fn new(
        selection: EffectSelection,
        catalog: Vec<EffectName>,
        explicit: Vec<EffectName>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Self { selection, catalog, explicit, rng }
    }

    pub fn from_config(config: &EffectsConfig) -> Self {
        Self::new(
            config.selection,
            config.catalog.clone(),
            config.explicit.clone(),
            config.seed,
        )
    }

    /// Effect for the image at `index`
    pub fn pick(&mut self, index: usize) -> EffectName {
        let pool = match self.selection {
            EffectSelection::Explicit => &self.explicit,
            _ => &self.catalog,
        };

        if pool.is_empty() {
            return EffectName::None;
        }

        match self.selection {
            EffectSelection::Random => pool[self.rng.gen_range(0..pool.len())],
            EffectSelection::ByIndex | EffectSelection::Explicit => pool[index % pool.len()],
        }
    }
}

/// Applies catalog effects, falling back to the untouched frame on failure
pub struct EffectEngine<'a> {
    registry: &'a EffectRegistry,
    params: &'a EffectParams,
}

impl<'a> EffectEngine<'a> {
    pub fn new(registry: &'a EffectRegistry, params: &'a EffectParams) -> Self {
        Self { registry, params }
    }

    /// Apply one effect, surfacing any failure
    pub fn apply_effect(&self, frame: &Frame, name: EffectName) -> Result<Frame> {
        let effect = self
            .registry
            .get_effect(name)
            .ok_or_else(|| EffectError::UnknownEffect { name: name.to_string() })?;

        let output = effect.apply(frame, self.params)?;

        if output.dimensions() != frame.dimensions() {
            return Err(EffectError::ApplyFailed {
                effect: name.to_string(),
                reason: format!(
                    "output is {}x{}, input was {}x{}",
                    output.width(),
                    output.height(),
                    frame.width(),
                    frame.height()
                ),
            }
            .into());
        }

        Ok(output)
    }

    /// Apply one effect to a normalized frame; never fails
    pub fn apply(&self, normalized: NormalizedFrame, name: EffectName) -> EffectedFrame {
        match self.apply_effect(&normalized.frame, name) {
            Ok(frame) => {
                debug!("Applied {} to image {}", name, normalized.index);
                EffectedFrame {
                    index: normalized.index,
                    effect: name,
                    applied: true,
                    frame,
                }
            }
            Err(e) => {
                warn!(
                    "Effect {} failed on {:?}, keeping the original: {}",
                    name, normalized.path, e
                );
                EffectedFrame {
                    index: normalized.index,
                    effect: name,
                    applied: false,
                    frame: normalized.frame,
                }
            }
        }
    }
}
