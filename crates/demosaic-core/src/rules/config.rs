use crate::rules::{KeywordSet, RuleSet};
use serde::{Deserialize, Serialize};

/// Keyword lists as they appear in configuration: comma-separated strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Object names. Default: "mosaic,censored,pixelated,h-mosaic".
    pub object_names: String,

    /// Material names. Default: "mosaic,censored,pixel,h-mosaic".
    pub material_names: String,

    /// Shader names. Default: "mosaic,pixelate,censor".
    pub shader_names: String,

    /// Mesh names. Default: "censor,mosaic".
    pub mesh_names: String,

    /// Texture names. Default: "mosaic".
    pub texture_names: String,

    /// Attached component type names. Default: "MosaicEffect,CensorEffect".
    pub component_names: String,

    /// Shader property names. Default: "_PixelSize,_BlockSize,_MosaicFactor".
    pub shader_properties: String,

    /// Object names that are never touched. Default: empty.
    pub exclusions: String,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            object_names: "mosaic,censored,pixelated,h-mosaic".into(),
            material_names: "mosaic,censored,pixel,h-mosaic".into(),
            shader_names: "mosaic,pixelate,censor".into(),
            mesh_names: "censor,mosaic".into(),
            texture_names: "mosaic".into(),
            component_names: "MosaicEffect,CensorEffect".into(),
            shader_properties: "_PixelSize,_BlockSize,_MosaicFactor".into(),
            exclusions: String::new(),
        }
    }
}

impl KeywordConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the immutable rule set these strings describe.
    pub fn to_rule_set(&self) -> RuleSet {
        RuleSet {
            exclusion: KeywordSet::parse(&self.exclusions),
            name: KeywordSet::parse(&self.object_names),
            mesh: KeywordSet::parse(&self.mesh_names),
            material: KeywordSet::parse(&self.material_names),
            shader: KeywordSet::parse(&self.shader_names),
            shader_property: KeywordSet::parse(&self.shader_properties),
            texture: KeywordSet::parse(&self.texture_names),
            component: KeywordSet::parse(&self.component_names),
        }
    }
}
