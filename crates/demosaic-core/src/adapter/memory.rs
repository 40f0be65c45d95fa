use crate::adapter::EntityAdapter;
use crate::error::{DemosaicError, Result};
use crate::types::{AttributeSnapshot, Capabilities, EntityId, MaterialHandle, MaterialSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Declarative description of an entity subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Explicit id. Assigned automatically when absent.
    #[serde(default)]
    pub id: Option<u64>,

    pub name: String,

    /// Whether the entity carries a renderable. Default: true.
    #[serde(default = "default_true")]
    pub renderer: bool,

    #[serde(default)]
    pub mesh: Option<String>,

    #[serde(default)]
    pub materials: Vec<MaterialSnapshot>,

    #[serde(default)]
    pub components: Vec<String>,

    /// Renderable enabled flag. Default: true.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Own active flag. Default: true.
    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub children: Vec<EntitySpec>,
}

fn default_true() -> bool {
    true
}

impl EntitySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            renderer: true,
            mesh: None,
            materials: Vec::new(),
            components: Vec::new(),
            enabled: true,
            active: true,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }

    pub fn with_material(mut self, material: MaterialSnapshot) -> Self {
        self.materials.push(material);
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn without_renderer(mut self) -> Self {
        self.renderer = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_child(mut self, child: EntitySpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A mutation the world has applied, in call order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppliedMutation {
    Deactivated { entity: EntityId },
    RenderableDestroyed { entity: EntityId },
    EntityDestroyed { entity: EntityId },
    MaterialsSubstituted { entity: EntityId, material: String },
    MaterialsFaded { entity: EntityId },
}

#[derive(Debug, Clone)]
struct EntityRecord {
    name: String,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    renderer: bool,
    mesh: Option<String>,
    materials: Vec<MaterialSnapshot>,
    components: BTreeSet<String>,
    enabled: bool,
    active: bool,
    faded: bool,
}

#[derive(Debug, Default)]
struct WorldState {
    entities: BTreeMap<EntityId, EntityRecord>,
    next_id: u64,
    journal: Vec<AppliedMutation>,
    capability_overrides: HashMap<EntityId, Capabilities>,
    broken: HashSet<EntityId>,
}

impl WorldState {
    /// Honour a free requested id, otherwise hand out the next unused one.
    fn allocate_id(&mut self, requested: Option<u64>) -> EntityId {
        if let Some(raw) = requested.filter(|raw| !self.entities.contains_key(&EntityId(*raw))) {
            self.next_id = self.next_id.max(raw.saturating_add(1));
            return EntityId(raw);
        }
        // Wraps once a requested id has pushed the counter to the top.
        while self.entities.contains_key(&EntityId(self.next_id)) {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn spawn(&mut self, spec: EntitySpec, parent: Option<EntityId>) -> EntityId {
        let id = self.allocate_id(spec.id);
        self.entities.insert(
            id,
            EntityRecord {
                name: spec.name,
                parent,
                children: Vec::new(),
                renderer: spec.renderer,
                mesh: spec.mesh,
                materials: spec.materials,
                components: spec.components.into_iter().collect(),
                enabled: spec.enabled,
                active: spec.active,
                faded: false,
            },
        );
        if let Some(parent) = parent.and_then(|p| self.entities.get_mut(&p)) {
            parent.children.push(id);
        }
        for child in spec.children {
            self.spawn(child, Some(id));
        }
        id
    }

    fn is_active_in_tree(&self, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(cursor) = current {
            match self.entities.get(&cursor) {
                Some(record) if record.active => current = record.parent,
                _ => return false,
            }
        }
        true
    }

    fn collect_descendants(&self, id: EntityId, out: &mut Vec<EntityId>) {
        if let Some(record) = self.entities.get(&id) {
            for child in &record.children {
                out.push(*child);
                self.collect_descendants(*child, out);
            }
        }
    }

    fn remove_subtree(&mut self, id: EntityId) {
        let mut doomed = vec![id];
        self.collect_descendants(id, &mut doomed);
        if let Some(parent) = self.entities.get(&id).and_then(|r| r.parent) {
            if let Some(parent) = self.entities.get_mut(&parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        for entity in doomed {
            self.entities.remove(&entity);
            self.capability_overrides.remove(&entity);
            self.broken.remove(&entity);
        }
    }
}

/// In-process entity tree implementing [`EntityAdapter`].
///
/// Used by the host harness to replay scene scripts and by tests. All
/// mutations are journaled so callers can assert on what was applied.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    state: RwLock<WorldState>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from root specs.
    pub fn from_specs(roots: Vec<EntitySpec>) -> Self {
        let mut state = WorldState::default();
        for root in roots {
            state.spawn(root, None);
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Build a world from a JSON array of root specs.
    pub fn from_json(json: &str) -> Result<Self> {
        let roots: Vec<EntitySpec> = serde_json::from_str(json)?;
        Ok(Self::from_specs(roots))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, WorldState>> {
        self.state
            .read()
            .map_err(|_| DemosaicError::Enumeration("world lock poisoned".into()))
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, WorldState>> {
        match self.state.write() {
            Ok(guard) => Some(guard),
            Err(_) => {
                log::error!("World lock poisoned, mutation dropped");
                None
            }
        }
    }

    /// Add a subtree under `parent` (or as a root) and return its root id.
    pub fn spawn(&self, spec: EntitySpec, parent: Option<EntityId>) -> Result<EntityId> {
        let mut state = self
            .state
            .write()
            .map_err(|_| DemosaicError::Enumeration("world lock poisoned".into()))?;
        Ok(state.spawn(spec, parent))
    }

    /// Flip an entity's own active flag.
    pub fn set_active(&self, id: EntityId, active: bool) {
        if let Some(mut state) = self.write() {
            if let Some(record) = state.entities.get_mut(&id) {
                record.active = active;
            }
        }
    }

    /// Remove an entity and its subtree, as the host would.
    pub fn remove(&self, id: EntityId) {
        if let Some(mut state) = self.write() {
            state.remove_subtree(id);
        }
    }

    /// Force the capabilities reported for an entity.
    pub fn override_capabilities(&self, id: EntityId, capabilities: Capabilities) {
        if let Some(mut state) = self.write() {
            state.capability_overrides.insert(id, capabilities);
        }
    }

    /// Make every snapshot of `id` fail, as an unreadable host object would.
    pub fn break_introspection(&self, id: EntityId) {
        if let Some(mut state) = self.write() {
            state.broken.insert(id);
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        let state = self.read().ok()?;
        state
            .entities
            .iter()
            .find(|(_, record)| record.name == name)
            .map(|(id, _)| *id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.read()
            .map(|state| state.entities.contains_key(&id))
            .unwrap_or(false)
    }

    pub fn is_faded(&self, id: EntityId) -> bool {
        self.read()
            .ok()
            .and_then(|state| state.entities.get(&id).map(|r| r.faded))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.read().map(|state| state.entities.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutations applied so far, oldest first.
    pub fn journal(&self) -> Vec<AppliedMutation> {
        self.read()
            .map(|state| state.journal.clone())
            .unwrap_or_default()
    }

    /// Journal entries touching one entity.
    pub fn mutations_of(&self, id: EntityId) -> Vec<AppliedMutation> {
        self.journal()
            .into_iter()
            .filter(|m| match m {
                AppliedMutation::Deactivated { entity }
                | AppliedMutation::RenderableDestroyed { entity }
                | AppliedMutation::EntityDestroyed { entity }
                | AppliedMutation::MaterialsSubstituted { entity, .. }
                | AppliedMutation::MaterialsFaded { entity } => *entity == id,
            })
            .collect()
    }
}

impl EntityAdapter for InMemoryWorld {
    fn snapshot(&self, id: EntityId) -> Result<AttributeSnapshot> {
        let state = self.read()?;
        if state.broken.contains(&id) {
            return Err(DemosaicError::Introspection {
                entity: id,
                reason: "component type could not be resolved".into(),
            });
        }
        let record = state
            .entities
            .get(&id)
            .ok_or(DemosaicError::EntityNotFound(id))?;

        let (mesh_name, materials) = if record.renderer {
            (record.mesh.clone(), record.materials.clone())
        } else {
            (None, Vec::new())
        };

        Ok(AttributeSnapshot {
            primary_name: record.name.clone(),
            mesh_name,
            materials,
            component_type_names: record.components.clone(),
            is_enabled: record.enabled,
            is_active_in_tree: state.is_active_in_tree(id),
        })
    }

    fn all_entity_ids(&self) -> Result<Vec<EntityId>> {
        Ok(self.read()?.entities.keys().copied().collect())
    }

    fn descendants(&self, id: EntityId) -> Result<Vec<EntityId>> {
        let state = self.read()?;
        if !state.entities.contains_key(&id) {
            return Err(DemosaicError::EntityNotFound(id));
        }
        let mut out = Vec::new();
        state.collect_descendants(id, &mut out);
        Ok(out)
    }

    fn capability(&self, id: EntityId) -> Capabilities {
        let Ok(state) = self.read() else {
            return Capabilities::invalid();
        };
        let Some(record) = state.entities.get(&id) else {
            return Capabilities::invalid();
        };
        if let Some(forced) = state.capability_overrides.get(&id) {
            return *forced;
        }
        let has_materials = record.renderer && !record.materials.is_empty();
        Capabilities {
            can_deactivate: true,
            can_destroy_renderable: record.renderer,
            can_destroy_entity: true,
            can_substitute_materials: has_materials,
            can_fade_materials: has_materials,
            is_valid: true,
        }
    }

    fn deactivate(&self, id: EntityId) {
        if let Some(mut state) = self.write() {
            if let Some(record) = state.entities.get_mut(&id) {
                record.active = false;
                state.journal.push(AppliedMutation::Deactivated { entity: id });
            }
        }
    }

    fn destroy_renderable_part(&self, id: EntityId) {
        if let Some(mut state) = self.write() {
            if let Some(record) = state.entities.get_mut(&id) {
                if record.renderer {
                    record.renderer = false;
                    record.mesh = None;
                    record.materials.clear();
                    state
                        .journal
                        .push(AppliedMutation::RenderableDestroyed { entity: id });
                }
            }
        }
    }

    fn destroy_entity(&self, id: EntityId) {
        if let Some(mut state) = self.write() {
            if state.entities.contains_key(&id) {
                state.remove_subtree(id);
                state.journal.push(AppliedMutation::EntityDestroyed { entity: id });
            }
        }
    }

    fn substitute_materials(&self, id: EntityId, material: &MaterialHandle) {
        if let Some(mut state) = self.write() {
            if let Some(record) = state.entities.get_mut(&id) {
                if record.renderer {
                    for slot in record.materials.iter_mut() {
                        *slot = MaterialSnapshot::new(material.name());
                    }
                    state.journal.push(AppliedMutation::MaterialsSubstituted {
                        entity: id,
                        material: material.name().to_string(),
                    });
                }
            }
        }
    }

    fn fade_materials_in_place(&self, id: EntityId) {
        if let Some(mut state) = self.write() {
            if let Some(record) = state.entities.get_mut(&id) {
                if record.renderer {
                    record.faded = true;
                    state.journal.push(AppliedMutation::MaterialsFaded { entity: id });
                }
            }
        }
    }
}
