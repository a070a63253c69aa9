//! Shared configuration loader for the convo toolchain.
//!
//! `defaults/convo.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ConvoConfig`].
//! Each section converts into the library type it configures.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use convo_babel::extract::ExtractSelectors;
use convo_babel::render::{Color, PageGeometry, RenderStyle};
use convo_babel::sanitize::TitleRules;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/convo.default.toml");

/// Name of the optional per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = "convo.toml";

/// Top-level configuration consumed by convo applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvoConfig {
    pub export: ExportConfig,
    pub extract: ExtractConfig,
    pub pdf: PdfConfig,
}

/// Artifact naming.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub fallback_title: String,
    pub max_title_len: usize,
}

impl From<&ExportConfig> for TitleRules {
    fn from(config: &ExportConfig) -> Self {
        TitleRules {
            fallback: config.fallback_title.clone(),
            max_len: config.max_title_len,
        }
    }
}

/// Share page selectors.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub turn: String,
    pub user_text: String,
    pub assistant: String,
    pub title: String,
}

impl From<&ExtractConfig> for ExtractSelectors {
    fn from(config: &ExtractConfig) -> Self {
        ExtractSelectors {
            turn: config.turn.clone(),
            user_text: config.user_text.clone(),
            assistant: config.assistant.clone(),
            title: config.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    pub page: PageConfig,
    pub style: StyleConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl From<&PageConfig> for PageGeometry {
    fn from(config: &PageConfig) -> Self {
        PageGeometry {
            width: config.width,
            height: config.height,
            margin: config.margin,
        }
    }
}

/// Mirrors every knob of [`RenderStyle`]; colors are `[r, g, b]`.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    pub size_normal: f32,
    pub size_code: f32,
    pub size_table: f32,
    pub size_title: f32,
    pub size_meta: f32,
    pub heading_base: f32,
    pub heading_step: f32,
    pub heading_min: f32,

    pub color_user: [u8; 3],
    pub color_assistant: [u8; 3],
    pub color_default: [u8; 3],
    pub color_meta: [u8; 3],
    pub color_alert: [u8; 3],

    pub indent: f32,
    pub list_indent_factor: f32,
    pub line_spacing: f32,
    pub paragraph_spacing: f32,
    pub heading_spacing: f32,
    pub label_spacing: f32,
    pub list_item_spacing: f32,
    pub rule_spacing: f32,
    pub header_spacing: f32,

    pub rule_width: f32,
    pub rule_dash: f32,
    pub error_break_threshold: f32,

    pub table_separator: String,
    pub bullet: String,
    pub error_marker: String,
    pub content_unavailable: String,
}

impl From<&StyleConfig> for RenderStyle {
    fn from(config: &StyleConfig) -> Self {
        RenderStyle {
            size_normal: config.size_normal,
            size_code: config.size_code,
            size_table: config.size_table,
            size_title: config.size_title,
            size_meta: config.size_meta,
            heading_base: config.heading_base,
            heading_step: config.heading_step,
            heading_min: config.heading_min,
            color_user: Color::from(config.color_user),
            color_assistant: Color::from(config.color_assistant),
            color_default: Color::from(config.color_default),
            color_meta: Color::from(config.color_meta),
            color_alert: Color::from(config.color_alert),
            indent: config.indent,
            list_indent_factor: config.list_indent_factor,
            line_spacing: config.line_spacing,
            paragraph_spacing: config.paragraph_spacing,
            heading_spacing: config.heading_spacing,
            label_spacing: config.label_spacing,
            list_item_spacing: config.list_item_spacing,
            rule_spacing: config.rule_spacing,
            header_spacing: config.header_spacing,
            rule_width: config.rule_width,
            rule_dash: config.rule_dash,
            error_break_threshold: config.error_break_threshold,
            table_separator: config.table_separator.clone(),
            bullet: config.bullet.clone(),
            error_marker: config.error_marker.clone(),
            content_unavailable: config.content_unavailable.clone(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ConvoConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ConvoConfig, ConfigError> {
    Loader::new().build()
}
