//! Editor configuration
//!
//! Supports JSON and TOML files. Sections:
//! - History settings (undo depth)
//! - Machine settings (work area per head type, used for canvas coordinates)
//! - Notice templates shown while a long-running process stage is active

use lubankit_core::{HeadType, ProcessStage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Placeholder replaced by the percentage in running notices.
pub const PROGRESS_PLACEHOLDER: &str = "{progress}";

/// Undo/redo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of undoable entries per surface
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Work area size in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineSize {
    pub x: f64,
    pub y: f64,
}

impl MachineSize {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Machine work area per head type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    pub laser: MachineSize,
    pub cnc: MachineSize,
}

impl MachineSettings {
    /// Work area of a head type
    pub fn size_for(&self, head_type: HeadType) -> MachineSize {
        match head_type {
            HeadType::Laser => self.laser,
            HeadType::Cnc => self.cnc,
        }
    }
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            laser: MachineSize::new(400.0, 400.0),
            cnc: MachineSize::new(300.0, 300.0),
        }
    }
}

/// Notices for one process stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeTemplates {
    /// Shown while running; contains `{progress}`
    pub running: String,
    pub success: String,
    pub failed: String,
}

impl NoticeTemplates {
    fn new(running: &str, success: &str, failed: &str) -> Self {
        Self {
            running: running.to_string(),
            success: success.to_string(),
            failed: failed.to_string(),
        }
    }
}

/// Notice templates per process stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeSettings {
    pub generate_tool_path: NoticeTemplates,
    pub upload_image: NoticeTemplates,
    pub process_image: NoticeTemplates,
    pub svg_clipping: NoticeTemplates,
    pub resize_image: NoticeTemplates,
}

impl NoticeSettings {
    /// Templates for a process stage; `None` for the empty sentinel
    pub fn for_stage(&self, stage: ProcessStage) -> Option<&NoticeTemplates> {
        match stage {
            ProcessStage::Empty => None,
            ProcessStage::GenerateToolPathAndPreview => Some(&self.generate_tool_path),
            ProcessStage::UploadImage => Some(&self.upload_image),
            ProcessStage::ProcessImage => Some(&self.process_image),
            ProcessStage::SvgClipping => Some(&self.svg_clipping),
            ProcessStage::ResizeImage => Some(&self.resize_image),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &NoticeTemplates)> {
        [
            ("notices.generate_tool_path", &self.generate_tool_path),
            ("notices.upload_image", &self.upload_image),
            ("notices.process_image", &self.process_image),
            ("notices.svg_clipping", &self.svg_clipping),
            ("notices.resize_image", &self.resize_image),
        ]
        .into_iter()
    }
}

impl Default for NoticeSettings {
    fn default() -> Self {
        Self {
            generate_tool_path: NoticeTemplates::new(
                "Generating toolpath... {progress}%",
                "Generated toolpath successfully.",
                "Failed to generate toolpath.",
            ),
            upload_image: NoticeTemplates::new(
                "Loading object {progress}%",
                "Loaded object successfully.",
                "Failed to load object.",
            ),
            process_image: NoticeTemplates::new(
                "Processing image {progress}%",
                "Processed image successfully.",
                "Failed to process image.",
            ),
            svg_clipping: NoticeTemplates::new(
                "Clipping SVG {progress}%",
                "SVG clipped successfully.",
                "Failed to clip SVG.",
            ),
            resize_image: NoticeTemplates::new(
                "Resizing image {progress}%",
                "Resized image successfully.",
                "Failed to resize image.",
            ),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistorySettings,
    pub machines: MachineSettings,
    pub notices: NoticeSettings,
}

impl Config {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config location (`<config dir>/lubankit/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("lubankit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("No platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => return Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => return Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.history.max_depth == 0 {
            return Err(SettingsError::invalid("history.max_depth", "must be > 0"));
        }

        for (key, size) in [
            ("machines.laser", self.machines.laser),
            ("machines.cnc", self.machines.cnc),
        ] {
            if !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0) {
                return Err(SettingsError::invalid(key, "work area must be positive"));
            }
        }

        for (key, templates) in self.notices.iter() {
            if !templates.running.contains(PROGRESS_PLACEHOLDER) {
                return Err(SettingsError::invalid(
                    key,
                    format!("running notice must contain {}", PROGRESS_PLACEHOLDER),
                ));
            }
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
