use std::collections::HashMap;

use crate::effects::{
    BlurEffect, ColorizeEffect, ContrastEffect, Effect, EffectName, GrayscaleEffect,
    IdentityEffect, InvertEffect, SepiaEffect, SharpenEffect, SolarizeEffect, VignetteEffect,
};

/// Registry for the effect catalog
///
/// Effects are registered by catalog name. Built-in effects can be replaced
/// with custom implementations, e.g. a GPU blur.
pub struct EffectRegistry {
    effects: HashMap<EffectName, Box<dyn Fn() -> Box<dyn Effect> + Send + Sync>>,
}

impl EffectRegistry {
    /// Create a new registry with all built-in effects
    pub fn new() -> Self {
        let mut registry = Self {
            effects: HashMap::new(),
        };

        registry.register_builtin_effects();
        registry
    }

    fn register_builtin_effects(&mut self) {
        self.register(EffectName::Blur, || Box::new(BlurEffect));
        self.register(EffectName::Contrast, || Box::new(ContrastEffect));
        self.register(EffectName::Grayscale, || Box::new(GrayscaleEffect));
        self.register(EffectName::Sepia, || Box::new(SepiaEffect));
        self.register(EffectName::Vignette, || Box::new(VignetteEffect));
        self.register(EffectName::Sharpen, || Box::new(SharpenEffect));
        self.register(EffectName::Solarize, || Box::new(SolarizeEffect));
        self.register(EffectName::Invert, || Box::new(InvertEffect));
        self.register(EffectName::Colorize, || Box::new(ColorizeEffect));
        self.register(EffectName::None, || Box::new(IdentityEffect));
    }

    /// Register (or replace) the implementation behind a catalog name
    pub fn register<F>(&mut self, name: EffectName, factory: F)
    where
        F: Fn() -> Box<dyn Effect> + Send + Sync + 'static,
    {
        self.effects.insert(name, Box::new(factory));
    }

    /// Get a fresh instance of an effect, or None if nothing is registered under `name`
    pub fn get_effect(&self, name: EffectName) -> Option<Box<dyn Effect>> {
        self.effects.get(&name).map(|factory| factory())
    }

    /// All registered effect names, in catalog order
    pub fn available_effects(&self) -> Vec<EffectName> {
        let mut names: Vec<EffectName> = self.effects.keys().copied().collect();
        names.sort();
        names
    }

    pub fn has_effect(&self, name: EffectName) -> bool {
        self.effects.contains_key(&name)
    }

    /// Remove an effect from the registry
    pub fn unregister(&mut self, name: EffectName) -> bool {
        self.effects.remove(&name).is_some()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
