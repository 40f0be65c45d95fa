use crate::rules::{Category, KeywordSet, RuleSet};
use crate::types::AttributeSnapshot;
use serde::{Deserialize, Serialize};

/// Outcome of classifying one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    /// Category that produced the match. Diagnostic only.
    pub category: Option<Category>,
}

impl MatchResult {
    pub fn hit(category: Category) -> Self {
        Self {
            matched: true,
            category: Some(category),
        }
    }

    pub fn miss() -> Self {
        Self {
            matched: false,
            category: None,
        }
    }
}

/// A match together with the attribute value and keyword that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDetail<'a> {
    pub category: Category,
    pub value: &'a str,
    pub keyword: &'a str,
}

/// Evaluate a snapshot against a rule set.
///
/// Order is fixed and the first hit wins: exclusion, name, mesh, then each
/// material in declaration order (name, shader, shader properties,
/// textures), then components.
pub fn classify(snapshot: &AttributeSnapshot, rules: &RuleSet) -> MatchResult {
    match explain(snapshot, rules) {
        Some(detail) => MatchResult::hit(detail.category),
        None => MatchResult::miss(),
    }
}

/// Same evaluation as [`classify`], returning what matched.
pub fn explain<'a>(snapshot: &'a AttributeSnapshot, rules: &'a RuleSet) -> Option<MatchDetail<'a>> {
    if rules.is_excluded(&snapshot.primary_name) {
        return None;
    }

    if let Some(detail) = check(Category::Name, &rules.name, &snapshot.primary_name) {
        return Some(detail);
    }

    if let Some(mesh) = &snapshot.mesh_name {
        if let Some(detail) = check(Category::Mesh, &rules.mesh, mesh) {
            return Some(detail);
        }
    }

    for material in &snapshot.materials {
        if let Some(detail) = check(Category::Material, &rules.material, &material.name) {
            return Some(detail);
        }
        if let Some(shader) = &material.shader_name {
            if let Some(detail) = check(Category::Shader, &rules.shader, shader) {
                return Some(detail);
            }
        }
        if let Some(detail) = check_any(
            Category::ShaderProperty,
            &rules.shader_property,
            &material.shader_property_names,
        ) {
            return Some(detail);
        }
        if let Some(detail) = check_any(Category::Texture, &rules.texture, &material.texture_names) {
            return Some(detail);
        }
    }

    check_any(
        Category::Component,
        &rules.component,
        &snapshot.component_type_names,
    )
}

fn check<'a>(category: Category, keywords: &'a KeywordSet, value: &'a str) -> Option<MatchDetail<'a>> {
    keywords.find_in(value).map(|keyword| MatchDetail {
        category,
        value,
        keyword,
    })
}

fn check_any<'a, I>(category: Category, keywords: &'a KeywordSet, values: I) -> Option<MatchDetail<'a>>
where
    I: IntoIterator<Item = &'a String>,
{
    if keywords.is_empty() {
        return None;
    }
    values
        .into_iter()
        .find_map(|value| check(category, keywords, value))
}

/// Classifier bound to the diagnostic log.
///
/// Evaluation is identical to [`classify`]; every hit is additionally
/// logged at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct Classifier;

impl Classifier {
    pub fn classify(&self, snapshot: &AttributeSnapshot, rules: &RuleSet) -> MatchResult {
        match explain(snapshot, rules) {
            Some(detail) => {
                log::debug!(
                    "[{}] '{}' matched keyword '{}' on '{}'",
                    detail.category,
                    detail.value,
                    detail.keyword,
                    snapshot.primary_name
                );
                MatchResult::hit(detail.category)
            }
            None => MatchResult::miss(),
        }
    }
}
