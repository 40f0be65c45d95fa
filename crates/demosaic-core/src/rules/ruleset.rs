use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute class a keyword list applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Name,
    Mesh,
    Material,
    Shader,
    ShaderProperty,
    Texture,
    Component,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::Shader => "shader",
            Self::ShaderProperty => "shader_property",
            Self::Texture => "texture",
            Self::Component => "component",
        }
    }

    /// Categories whose match originates from the renderable rather than
    /// the entity itself.
    pub fn is_renderable(&self) -> bool {
        !matches!(self, Self::Name | Self::Component)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized list of case-insensitive substring keywords.
///
/// Entries are trimmed and lowercased; blank entries are dropped. An empty
/// set never matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Parse a comma-separated configuration value, e.g. `"mosaic, censor"`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// First keyword contained in `haystack`, ignoring case.
    pub fn find_in(&self, haystack: &str) -> Option<&str> {
        if haystack.is_empty() || self.keywords.is_empty() {
            return None;
        }
        let lowered = haystack.to_lowercase();
        self.iter().find(|keyword| lowered.contains(*keyword))
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.find_in(haystack).is_some()
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.keywords
    }
}

/// Complete rule set: one exclusion list plus one keyword list per category.
///
/// Replaced wholesale on reload, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub exclusion: KeywordSet,
    #[serde(default)]
    pub name: KeywordSet,
    #[serde(default)]
    pub mesh: KeywordSet,
    #[serde(default)]
    pub material: KeywordSet,
    #[serde(default)]
    pub shader: KeywordSet,
    #[serde(default)]
    pub shader_property: KeywordSet,
    #[serde(default)]
    pub texture: KeywordSet,
    #[serde(default)]
    pub component: KeywordSet,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    pub fn keywords(&self, category: Category) -> &KeywordSet {
        match category {
            Category::Name => &self.name,
            Category::Mesh => &self.mesh,
            Category::Material => &self.material,
            Category::Shader => &self.shader,
            Category::ShaderProperty => &self.shader_property,
            Category::Texture => &self.texture,
            Category::Component => &self.component,
        }
    }

    /// True when `primary_name` hits the exclusion list.
    pub fn is_excluded(&self, primary_name: &str) -> bool {
        self.exclusion.matches(primary_name)
    }

    /// True when no category can ever match.
    pub fn is_inert(&self) -> bool {
        [
            &self.name,
            &self.mesh,
            &self.material,
            &self.shader,
            &self.shader_property,
            &self.texture,
            &self.component,
        ]
        .iter()
        .all(|set| set.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: RuleSet,
}

impl RuleSetBuilder {
    pub fn exclusion<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules.exclusion = KeywordSet::new(keywords);
        self
    }

    pub fn category<I, S>(mut self, category: Category, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = KeywordSet::new(keywords);
        match category {
            Category::Name => self.rules.name = set,
            Category::Mesh => self.rules.mesh = set,
            Category::Material => self.rules.material = set,
            Category::Shader => self.rules.shader = set,
            Category::ShaderProperty => self.rules.shader_property = set,
            Category::Texture => self.rules.texture = set,
            Category::Component => self.rules.component = set,
        }
        self
    }

    pub fn build(self) -> RuleSet {
        self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parse_trims_and_drops_blanks() {
        let set = KeywordSet::parse(" Mosaic , ,censor,,  ");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["mosaic", "censor"]);
    }

    #[test]
    fn test_keyword_duplicates_harmless() {
        let set = KeywordSet::parse("mosaic,mosaic");
        assert_eq!(set.len(), 2);
        assert!(set.matches("MOSAIC_Plane"));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = KeywordSet::parse("");
        assert!(set.is_empty());
        assert!(!set.matches("anything"));
        assert!(!set.matches(""));
    }

    #[test]
    fn test_empty_haystack_never_matches() {
        let set = KeywordSet::parse("mosaic");
        assert!(!set.matches(""));
    }

    #[test]
    fn test_builder_routes_categories() {
        let rules = RuleSet::builder()
            .category(Category::Texture, ["pix"])
            .exclusion(["safe"])
            .build();
        assert!(rules.keywords(Category::Texture).matches("PIXEL"));
        assert!(rules.keywords(Category::Name).is_empty());
        assert!(rules.is_excluded("mosaic_SAFE"));
        assert!(!rules.is_inert());
        assert!(RuleSet::default().is_inert());
    }

    #[test]
    fn test_ruleset_serde_normalizes() {
        let rules: RuleSet =
            serde_json::from_str(r#"{"name": [" Censor ", ""], "exclusion": ["UI"]}"#).unwrap();
        assert_eq!(rules.name.iter().collect::<Vec<_>>(), vec!["censor"]);
        assert!(rules.is_excluded("ui_root"));
    }
}
