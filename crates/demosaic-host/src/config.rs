use anyhow::{Context, Result};
use demosaic_core::{
    KeywordConfig, KeywordSet, MaterialHandle, Mutator, RemoveStrategy, SchedulerConfig,
    SuppressionConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `demosaic.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub general: GeneralConfig,
    pub scan: SchedulerConfig,
    pub keywords: KeywordConfig,
    pub advanced: AdvancedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Master switch. When false the host loads the scene and does nothing.
    pub enabled: bool,

    /// `disable`, `destroy` or `transparent` (aliases `deactivate`, `substitute`).
    pub remove_mode: String,

    /// Key that requests a full sweep from a scripted key press.
    pub manual_scan_key: String,

    /// Shared transparent material used by the transparent mode. Absent
    /// means existing materials are faded in place instead.
    pub transparent_material: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remove_mode: "disable".to_string(),
            manual_scan_key: "F10".to_string(),
            transparent_material: Some("Transparent".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub method_suppression: bool,

    /// Comma-separated method-name keywords.
    pub method_disable_keywords: String,

    /// Comma-separated assembly names. Empty scans every non-framework assembly.
    pub method_patch_target_assemblies: String,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            method_suppression: true,
            method_disable_keywords: "censor,mosaic".to_string(),
            method_patch_target_assemblies: "Assembly-CSharp".to_string(),
        }
    }
}

impl HostConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load the file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Every problem found, empty when the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(e) = self.remove_strategy() {
            errors.push(format!("[general] remove_mode: {}", e));
        }
        if self.general.manual_scan_key.trim().is_empty() {
            errors.push("[general] manual_scan_key must not be empty".to_string());
        }
        if let Err(e) = self.scan.validate() {
            errors.push(format!("[scan] {}", e));
        }
        if self.keywords.to_rule_set().is_inert() {
            errors.push("[keywords] every keyword list is empty".to_string());
        }

        errors
    }

    pub fn remove_strategy(&self) -> demosaic_core::Result<RemoveStrategy> {
        self.general.remove_mode.parse()
    }

    pub fn mutator(&self) -> demosaic_core::Result<Mutator> {
        let material = self
            .general
            .transparent_material
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(MaterialHandle::new);
        Ok(Mutator::new(self.remove_strategy()?, material))
    }

    pub fn suppression_config(&self) -> SuppressionConfig {
        SuppressionConfig {
            enabled: self.advanced.method_suppression,
            keywords: KeywordSet::parse(&self.advanced.method_disable_keywords),
            target_assemblies: Vec::new(),
        }
        .with_target_assemblies(self.advanced.method_patch_target_assemblies.split(','))
    }

    /// The key matches `manual_scan_key`, ignoring case.
    pub fn is_manual_scan_key(&self, key: &str) -> bool {
        key.trim()
            .eq_ignore_ascii_case(self.general.manual_scan_key.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: HostConfig = toml::from_str(
            r#"
            [general]
            remove_mode = "Transparent"

            [scan]
            batch_size = 100
            periodic_interval = 2.5

            [keywords]
            exclusions = "ui, hud"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_empty());
        assert_eq!(config.remove_strategy().unwrap(), RemoveStrategy::Substitute);
        assert_eq!(config.scan.batch_size, 100);
        assert_eq!(config.scan.periodic_interval, Duration::from_millis(2500));
        assert_eq!(config.scan.scene_load_delay, Duration::from_millis(1500));
        assert!(config.keywords.to_rule_set().is_excluded("HUD_mosaic"));
        assert_eq!(config.general.manual_scan_key, "F10");
    }

    #[test]
    fn test_validate_collects_every_error() {
        let mut config = HostConfig::default();
        config.general.remove_mode = "explode".into();
        config.general.manual_scan_key = " ".into();
        config.scan.batch_size = 0;

        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("remove_mode"));
    }

    #[test]
    fn test_suppression_targets_are_split() {
        let mut config = HostConfig::default();
        config.advanced.method_patch_target_assemblies = "Assembly-CSharp, Plugins,".into();
        let suppression = config.suppression_config();
        assert_eq!(suppression.target_assemblies, vec!["Assembly-CSharp", "Plugins"]);
        assert!(suppression.keywords.matches("ApplyMosaic"));
    }

    #[test]
    fn test_blank_material_means_fade() {
        let mut config = HostConfig::default();
        config.general.transparent_material = Some("  ".into());
        assert!(config.mutator().unwrap().transparent_material().is_none());
        assert!(config.is_manual_scan_key("f10"));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = HostConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: HostConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
