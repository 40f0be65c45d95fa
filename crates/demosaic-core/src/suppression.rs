//! Planning of host method suppression.
//!
//! The host enumerates its callable methods as [`MethodDescriptor`]s and
//! applies the returned plan with whatever interception it has. The core
//! only decides which stable ids to disable.

use crate::rules::KeywordSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One host method, as reported by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Stable identifier the host uses to disable the method
    pub id: String,
    pub assembly: String,
    pub type_name: String,
    pub method_name: String,
    #[serde(default)]
    pub is_special_name: bool,
    #[serde(default)]
    pub is_generic: bool,
    #[serde(default)]
    pub is_abstract: bool,
}

impl MethodDescriptor {
    pub fn new(
        assembly: impl Into<String>,
        type_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        let assembly = assembly.into();
        let type_name = type_name.into();
        let method_name = method_name.into();
        Self {
            id: format!("{}::{}::{}", assembly, type_name, method_name),
            assembly,
            type_name,
            method_name,
            is_special_name: false,
            is_generic: false,
            is_abstract: false,
        }
    }

    /// Property accessors, operators and other compiler-named methods.
    pub fn special(mut self) -> Self {
        self.is_special_name = true;
        self
    }

    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Can be intercepted at all.
    fn is_patchable(&self) -> bool {
        !(self.is_special_name || self.is_generic || self.is_abstract)
    }
}

/// Method suppression settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressionConfig {
    pub enabled: bool,

    /// Method-name keywords. Default: censor, mosaic.
    pub keywords: KeywordSet,

    /// Assemblies to scan, matched case-insensitively. Empty scans every
    /// non-framework assembly. Default: Assembly-CSharp.
    pub target_assemblies: Vec<String>,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keywords: KeywordSet::new(["censor", "mosaic"]),
            target_assemblies: vec!["Assembly-CSharp".to_string()],
        }
    }
}

impl SuppressionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_target_assemblies<I, S>(mut self, assemblies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_assemblies = assemblies
            .into_iter()
            .map(Into::into)
            .map(|s: String| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Methods to disable, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuppressionPlan {
    pub disable: Vec<String>,

    /// Assemblies considered.
    pub scanned_assemblies: usize,

    /// Distinct assemblies filtered out.
    pub skipped_assemblies: usize,
}

impl SuppressionPlan {
    pub fn is_empty(&self) -> bool {
        self.disable.is_empty()
    }
}

/// Selects methods whose names carry a suppression keyword.
#[derive(Debug, Clone)]
pub struct SuppressionPlanner {
    config: SuppressionConfig,
    targets: BTreeSet<String>,
}

impl SuppressionPlanner {
    pub fn new(config: SuppressionConfig) -> Self {
        let targets = config
            .target_assemblies
            .iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { config, targets }
    }

    pub fn config(&self) -> &SuppressionConfig {
        &self.config
    }

    fn assembly_in_scope(&self, assembly: &str) -> bool {
        if self.targets.is_empty() {
            return !(assembly.starts_with("System") || assembly.contains("mscorlib"));
        }
        self.targets.contains(&assembly.to_lowercase())
    }

    pub fn plan(&self, methods: &[MethodDescriptor]) -> SuppressionPlan {
        if !self.config.enabled {
            return SuppressionPlan::default();
        }
        if self.config.keywords.is_empty() {
            log::warn!("Method suppression enabled without keywords, nothing to disable");
            return SuppressionPlan::default();
        }

        let mut scanned = BTreeSet::new();
        let mut skipped = BTreeSet::new();
        let mut disable = Vec::new();

        for method in methods {
            if !self.assembly_in_scope(&method.assembly) {
                skipped.insert(method.assembly.as_str());
                continue;
            }
            scanned.insert(method.assembly.as_str());

            if !method.is_patchable() {
                continue;
            }
            if let Some(keyword) = self.config.keywords.find_in(&method.method_name) {
                log::debug!(
                    "Disabling {} in {} (keyword '{}')",
                    method.method_name,
                    method.type_name,
                    keyword
                );
                disable.push(method.id.clone());
            }
        }

        log::info!(
            "Method suppression: {} methods across {} assemblies ({} skipped)",
            disable.len(),
            scanned.len(),
            skipped.len()
        );

        SuppressionPlan {
            disable,
            scanned_assemblies: scanned.len(),
            skipped_assemblies: skipped.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methods() -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("Assembly-CSharp", "CensorManager", "ApplyCensor"),
            MethodDescriptor::new("Assembly-CSharp", "CensorManager", "get_CensorLevel").special(),
            MethodDescriptor::new("Assembly-CSharp", "CensorManager", "MosaicFor").generic(),
            MethodDescriptor::new("Assembly-CSharp", "EffectBase", "UpdateMosaic").abstract_method(),
            MethodDescriptor::new("Assembly-CSharp", "Player", "Jump"),
            MethodDescriptor::new("Plugins", "MosaicRenderer", "DrawMosaic"),
            MethodDescriptor::new("System.Core", "Censor", "CensorAll"),
            MethodDescriptor::new("mscorlib", "Mosaic", "MosaicAll"),
        ]
    }

    #[test]
    fn test_default_targets_game_assembly() {
        let plan = SuppressionPlanner::new(SuppressionConfig::default()).plan(&methods());
        assert_eq!(plan.disable, vec!["Assembly-CSharp::CensorManager::ApplyCensor"]);
        assert_eq!(plan.scanned_assemblies, 1);
        assert_eq!(plan.skipped_assemblies, 3);
    }

    #[test]
    fn test_target_match_is_case_insensitive() {
        let config = SuppressionConfig::new().with_target_assemblies(["assembly-csharp ", "PLUGINS"]);
        let plan = SuppressionPlanner::new(config).plan(&methods());
        assert_eq!(plan.disable.len(), 2);
        assert!(plan.disable.contains(&"Plugins::MosaicRenderer::DrawMosaic".to_string()));
    }

    #[test]
    fn test_empty_targets_skip_framework() {
        let config = SuppressionConfig::new().with_target_assemblies(Vec::<String>::new());
        let plan = SuppressionPlanner::new(config).plan(&methods());
        assert_eq!(plan.disable.len(), 2);
        assert_eq!(plan.skipped_assemblies, 2);
        assert!(plan.disable.iter().all(|id| !id.starts_with("System") && !id.starts_with("mscorlib")));
    }

    #[test]
    fn test_disabled_or_keywordless_plans_nothing() {
        assert!(SuppressionPlanner::new(SuppressionConfig::disabled())
            .plan(&methods())
            .is_empty());

        let config = SuppressionConfig::new().with_keywords(KeywordSet::parse(" , "));
        assert!(SuppressionPlanner::new(config).plan(&methods()).is_empty());
    }
}
