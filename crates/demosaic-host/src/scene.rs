use anyhow::{Context, Result};
use demosaic_core::{EntitySpec, KeywordConfig, MethodDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A scripted scene: the initial entity tree, the host's method list and a
/// timeline of events replayed against the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub entities: Vec<EntitySpec>,

    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,

    #[serde(default)]
    pub events: Vec<SceneEvent>,
}

/// One timeline entry. `at_ms` is logical time since start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: SceneAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SceneAction {
    /// Activate a named entity and re-evaluate its subtree.
    Activate { target: String },

    /// Spawn a subtree, optionally under a named parent.
    Instantiate {
        #[serde(default)]
        parent: Option<String>,
        entity: EntitySpec,
    },

    /// Finish loading a scene, adding its roots.
    SceneLoaded {
        #[serde(default)]
        entities: Vec<EntitySpec>,
    },

    /// Full sweep request. With a key, only the configured scan key counts.
    ManualScan {
        #[serde(default)]
        key: Option<String>,
    },

    SetMode { mode: String },

    SetKeywords { keywords: KeywordConfig },

    /// Change the periodic interval; zero disables periodic sweeps.
    SetInterval { seconds: f64 },

    /// Remove a named entity from the world.
    Destroy { target: String },
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut scene: Scene = serde_json::from_str(json)?;
        scene.events.sort_by_key(|event| event.at_ms);
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing scene {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_orders_events() {
        let scene = Scene::from_json(
            r#"{
                "entities": [
                    { "name": "Root", "children": [ { "name": "mosaic_quad", "mesh": "Quad" } ] }
                ],
                "methods": [
                    { "id": "m1", "assembly": "Assembly-CSharp", "type_name": "Censor", "method_name": "Apply" }
                ],
                "events": [
                    { "at_ms": 3000, "action": "manual_scan", "key": "F10" },
                    { "at_ms": 500, "action": "set_mode", "mode": "destroy" },
                    { "at_ms": 1000, "action": "instantiate", "parent": "Root",
                      "entity": { "name": "censor_bar", "renderer": false } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scene.entities[0].children.len(), 1);
        assert!(!scene.methods[0].is_generic);
        let times: Vec<u64> = scene.events.iter().map(|e| e.at_ms).collect();
        assert_eq!(times, vec![500, 1000, 3000]);
        assert_eq!(
            scene.events[2].action,
            SceneAction::ManualScan {
                key: Some("F10".into())
            }
        );
        match &scene.events[1].action {
            SceneAction::Instantiate { parent, entity } => {
                assert_eq!(parent.as_deref(), Some("Root"));
                assert!(!entity.renderer);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = Scene::from_json(r#"{ "events": [ { "at_ms": 0, "action": "explode" } ] }"#);
        assert!(result.is_err());
    }
}
