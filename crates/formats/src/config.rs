use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use catalog::{CatalogError, LabelCatalog};
use foundation::{DEFAULT_NOISE_LABEL, LabelIndex};
use gpu::RenderMode;
use layers::ColoringMode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TILE_SIZE: u32 = 50;
pub const DEFAULT_PREVIEW_SIZE: u32 = 150;
pub const DEFAULT_SPRITE_IMAGE: &str = "sprite.png";

/// Viewer settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Label whose points the filtered view drops (`0` or `-1` in practice).
    pub noise_label: LabelIndex,
    /// Edge length of one square sprite in the sheet.
    pub tile_size: u32,
    /// Edge length of the hover preview the sprite is scaled into.
    pub preview_size: u32,
    pub sprite_image: String,
    pub coloring: ColoringMode,
    pub render_mode: RenderMode,
    pub show_noise: bool,
    /// `#rrggbb` colors replacing the built-in palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            noise_label: DEFAULT_NOISE_LABEL,
            tile_size: DEFAULT_TILE_SIZE,
            preview_size: DEFAULT_PREVIEW_SIZE,
            sprite_image: DEFAULT_SPRITE_IMAGE.to_string(),
            coloring: ColoringMode::ByLabel,
            render_mode: RenderMode::Points,
            show_noise: true,
            palette: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
    Catalog(CatalogError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
            ConfigError::Catalog(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ViewerConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::Invalid("tile_size must be positive".to_string()));
        }
        if self.preview_size == 0 {
            return Err(ConfigError::Invalid(
                "preview_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Label catalog for `label_names` under this config's noise label and palette.
    pub fn build_catalog(&self, label_names: &[String]) -> Result<LabelCatalog, ConfigError> {
        let catalog = LabelCatalog::from_label_names(label_names, self.noise_label);
        match &self.palette {
            Some(p) => catalog.with_palette_hex(p.as_slice()).map_err(ConfigError::Catalog),
            None => Ok(catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::DEFAULT_PALETTE;
    use foundation::Rgba;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = ViewerConfig::from_json_str("{}").expect("config");
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.tile_size, 50);
        assert_eq!(cfg.coloring, ColoringMode::ByLabel);
        assert!(cfg.show_noise);
        assert_eq!(cfg.sprite_image, DEFAULT_SPRITE_IMAGE);
    }

    #[test]
    fn parses_overrides() {
        let cfg = ViewerConfig::from_json_str(
            r##"{ "noise_label": -1, "coloring": "default", "render_mode": "sprites",
                 "show_noise": false, "palette": ["#ff0000"], "sprite_image": "sheet.png" }"##,
        )
        .expect("config");
        assert_eq!(cfg.noise_label, -1);
        assert_eq!(cfg.sprite_image, "sheet.png");
        assert_eq!(cfg.coloring, ColoringMode::Default);
        assert_eq!(cfg.render_mode, RenderMode::Sprites);
        assert!(!cfg.show_noise);

        let cat = cfg.build_catalog(&[]).expect("catalog");
        assert_eq!(cat.noise_label(), -1);
        assert_eq!(cat.color(5), Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            ViewerConfig::from_json_str(r#"{ "tile_size": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ViewerConfig::from_json_str(r#"{ "tile_sise": 10 }"#),
            Err(ConfigError::Parse(_))
        ));
        let cfg = ViewerConfig {
            palette: Some(vec!["blue".to_string()]),
            ..ViewerConfig::default()
        };
        assert!(matches!(
            cfg.build_catalog(&[]),
            Err(ConfigError::Catalog(CatalogError::InvalidColor(_)))
        ));
    }

    #[test]
    fn default_catalog_uses_builtin_palette() {
        let cat = ViewerConfig::default()
            .build_catalog(&["noise".to_string()])
            .expect("catalog");
        assert_eq!(cat.palette(), &DEFAULT_PALETTE[..]);
    }
}
