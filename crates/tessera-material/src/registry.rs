use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{BlendMode, MaterialFinder, RenderMaterial};

/// Named materials that models refer to by key.
#[derive(Default, Clone, Debug)]
pub struct MaterialRegistry {
    by_key: HashMap<String, &'static RenderMaterial>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `material` under `key`. Returns false if the key was already taken.
    pub fn register(&mut self, key: impl Into<String>, material: &'static RenderMaterial) -> bool {
        let key = key.into();
        if self.by_key.contains_key(&key) {
            return false;
        }
        self.by_key.insert(key, material);
        true
    }

    pub fn get(&self, key: &str) -> Option<&'static RenderMaterial> {
        self.by_key.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: MaterialsConfig = toml::from_str(toml_str)?;
        let mut registry = MaterialRegistry::new();
        for (key, spec) in cfg.materials {
            registry.register(key, spec.find());
        }
        Ok(registry)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

// --- Config ---

#[derive(Deserialize)]
pub struct MaterialsConfig {
    #[serde(default)]
    pub materials: HashMap<String, MaterialSpec>,
}

#[derive(Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct MaterialSpec {
    pub blend: BlendMode,
    pub emissive: bool,
    pub disable_color_index: bool,
    pub disable_diffuse: bool,
    pub disable_ao: bool,
}

impl MaterialSpec {
    pub fn find(&self) -> &'static RenderMaterial {
        MaterialFinder::new()
            .blend_mode(self.blend)
            .emissive(self.emissive)
            .disable_color_index(self.disable_color_index)
            .disable_diffuse(self.disable_diffuse)
            .disable_ao(self.disable_ao)
            .find()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_materials() {
        let src = r#"
            [materials.glow]
            blend = "cutout"
            emissive = true

            [materials.flat_glass]
            blend = "translucent"
            disable_ao = true
            disable_diffuse = true
        "#;
        let reg = MaterialRegistry::from_toml_str(src).unwrap();
        assert_eq!(reg.len(), 2);
        let glow = reg.get("glow").unwrap();
        assert!(glow.emissive());
        assert_eq!(glow.blend_mode(), BlendMode::Cutout);
        let glass = reg.get("flat_glass").unwrap();
        assert!(glass.disable_ao() && glass.disable_diffuse());
        assert!(reg.get("missing").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut reg = MaterialRegistry::new();
        assert!(reg.register("a", RenderMaterial::standard()));
        assert!(!reg.register("a", RenderMaterial::by_index(3)));
        assert!(std::ptr::eq(reg.get("a").unwrap(), RenderMaterial::standard()));
    }

    #[test]
    fn unknown_blend_mode_is_an_error() {
        let src = "[materials.x]\nblend = \"sparkly\"\n";
        assert!(MaterialRegistry::from_toml_str(src).is_err());
    }
}
