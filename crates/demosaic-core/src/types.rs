use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque identity of a host entity.
///
/// Stable for the lifetime of the host object; never reused while the
/// object is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Read-only projection of one material slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterialSnapshot {
    /// Material asset name.
    pub name: String,

    /// Name of the shader bound to the material, if any.
    #[serde(default)]
    pub shader_name: Option<String>,

    /// Property names declared by the shader.
    #[serde(default)]
    pub shader_property_names: BTreeSet<String>,

    /// Names of the textures bound to the material's texture properties.
    #[serde(default)]
    pub texture_names: BTreeSet<String>,
}

impl MaterialSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_shader(mut self, shader: impl Into<String>) -> Self {
        self.shader_name = Some(shader.into());
        self
    }

    pub fn with_shader_property(mut self, property: impl Into<String>) -> Self {
        self.shader_property_names.insert(property.into());
        self
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture_names.insert(texture.into());
        self
    }
}

/// Immutable attribute snapshot of one entity, captured per classification.
///
/// Holds no reference back into the host model, so the host may mutate the
/// underlying object while a sweep is classifying this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    /// The entity's own name.
    pub primary_name: String,

    /// Name of the mesh shared by the entity's renderable.
    #[serde(default)]
    pub mesh_name: Option<String>,

    /// Material slots in declaration order.
    #[serde(default)]
    pub materials: Vec<MaterialSnapshot>,

    /// Type names of every behavior component attached to the entity.
    #[serde(default)]
    pub component_type_names: BTreeSet<String>,

    /// Whether the entity's renderable is enabled.
    #[serde(default = "default_true")]
    pub is_enabled: bool,

    /// Whether the entity and all its ancestors are active.
    #[serde(default = "default_true")]
    pub is_active_in_tree: bool,
}

fn default_true() -> bool {
    true
}

impl AttributeSnapshot {
    pub fn new(primary_name: impl Into<String>) -> Self {
        Self {
            primary_name: primary_name.into(),
            mesh_name: None,
            materials: Vec::new(),
            component_type_names: BTreeSet::new(),
            is_enabled: true,
            is_active_in_tree: true,
        }
    }

    pub fn with_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh_name = Some(mesh.into());
        self
    }

    pub fn with_material(mut self, material: MaterialSnapshot) -> Self {
        self.materials.push(material);
        self
    }

    pub fn with_component(mut self, type_name: impl Into<String>) -> Self {
        self.component_type_names.insert(type_name.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    pub fn with_active_in_tree(mut self, active: bool) -> Self {
        self.is_active_in_tree = active;
        self
    }

    /// An entity is only classified while it is visible to the host:
    /// renderable enabled and active in the hierarchy.
    pub fn is_eligible(&self) -> bool {
        self.is_enabled && self.is_active_in_tree
    }
}

/// What the adapter can currently do to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_deactivate: bool,
    pub can_destroy_renderable: bool,
    pub can_destroy_entity: bool,
    pub can_substitute_materials: bool,
    pub can_fade_materials: bool,
    pub is_valid: bool,
}

impl Capabilities {
    /// Capabilities of an entity that no longer exists.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Every capability available.
    pub fn full() -> Self {
        Self {
            can_deactivate: true,
            can_destroy_renderable: true,
            can_destroy_entity: true,
            can_substitute_materials: true,
            can_fade_materials: true,
            is_valid: true,
        }
    }
}

/// Handle to a shared host material resource (e.g. the transparent material).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialHandle(pub String);

impl MaterialHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = AttributeSnapshot::new("Plane")
            .with_mesh("Quad")
            .with_material(
                MaterialSnapshot::new("mat")
                    .with_shader("Unlit/Color")
                    .with_texture("tex0"),
            )
            .with_component("MeshRenderer");

        assert_eq!(snapshot.mesh_name.as_deref(), Some("Quad"));
        assert_eq!(snapshot.materials.len(), 1);
        assert!(snapshot.materials[0].texture_names.contains("tex0"));
        assert!(snapshot.is_eligible());
        assert!(!snapshot.clone().with_enabled(false).is_eligible());
        assert!(!snapshot.with_active_in_tree(false).is_eligible());
    }

    #[test]
    fn test_snapshot_deserialize_defaults() {
        let snapshot: AttributeSnapshot =
            serde_json::from_str(r#"{"primary_name": "Door"}"#).unwrap();
        assert_eq!(snapshot, AttributeSnapshot::new("Door"));
    }

    #[test]
    fn test_invalid_capabilities() {
        let caps = Capabilities::invalid();
        assert!(!caps.is_valid);
        assert!(!caps.can_deactivate);
        assert!(Capabilities::full().is_valid);
    }
}
