//! Process and step stages reported to the UI.
//!
//! A [`ProcessStage`] names a whole long-running session (one progress
//! profile); a [`StepStage`] is one weighted checkpoint inside it, and also
//! the value the UI shows as "current stage", with explicit success/failed
//! counterparts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a registered progress profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ProcessStage {
    /// No active session.
    #[default]
    Empty,
    /// Generate every tool path, then preview the result.
    GenerateToolPathAndPreview,
    /// Upload an image and turn it into a model.
    UploadImage,
    /// Re-process an image model with new settings.
    ProcessImage,
    /// Clip selected SVG models against each other.
    SvgClipping,
    /// Resize image models, waiting for each image to load.
    ResizeImage,
}

impl ProcessStage {
    /// True for the no-session sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, ProcessStage::Empty)
    }
}

impl fmt::Display for ProcessStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessStage::Empty => "Empty",
            ProcessStage::GenerateToolPathAndPreview => "GenerateToolPathAndPreview",
            ProcessStage::UploadImage => "UploadImage",
            ProcessStage::ProcessImage => "ProcessImage",
            ProcessStage::SvgClipping => "SvgClipping",
            ProcessStage::ResizeImage => "ResizeImage",
        };
        f.write_str(name)
    }
}

/// Checkpoint inside a process stage, and the UI-visible stage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum StepStage {
    #[default]
    Empty,
    GeneratingToolPath,
    GenerateToolPathSuccess,
    GenerateToolPathFailed,
    PreviewingToolPath,
    PreviewToolPathSuccess,
    PreviewToolPathFailed,
    UploadingImage,
    UploadImageSuccess,
    UploadImageFailed,
    ProcessingImage,
    ProcessImageSuccess,
    ProcessImageFailed,
    ResizingImage,
    ResizeImageSuccess,
    ResizeImageFailed,
    SvgClipping,
    SvgClippingSuccess,
    SvgClippingFailed,
}

impl StepStage {
    /// Success counterpart of a running stage; terminal stages map to themselves.
    pub fn success(&self) -> StepStage {
        match self {
            StepStage::GeneratingToolPath => StepStage::GenerateToolPathSuccess,
            StepStage::PreviewingToolPath => StepStage::PreviewToolPathSuccess,
            StepStage::UploadingImage => StepStage::UploadImageSuccess,
            StepStage::ProcessingImage => StepStage::ProcessImageSuccess,
            StepStage::ResizingImage => StepStage::ResizeImageSuccess,
            StepStage::SvgClipping => StepStage::SvgClippingSuccess,
            other => *other,
        }
    }

    /// Failed counterpart of a running stage; terminal stages map to themselves.
    pub fn failed(&self) -> StepStage {
        match self {
            StepStage::GeneratingToolPath => StepStage::GenerateToolPathFailed,
            StepStage::PreviewingToolPath => StepStage::PreviewToolPathFailed,
            StepStage::UploadingImage => StepStage::UploadImageFailed,
            StepStage::ProcessingImage => StepStage::ProcessImageFailed,
            StepStage::ResizingImage => StepStage::ResizeImageFailed,
            StepStage::SvgClipping => StepStage::SvgClippingFailed,
            other => *other,
        }
    }

    /// Whether this is a `_FAILED` stage.
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            StepStage::GenerateToolPathFailed
                | StepStage::PreviewToolPathFailed
                | StepStage::UploadImageFailed
                | StepStage::ProcessImageFailed
                | StepStage::ResizeImageFailed
                | StepStage::SvgClippingFailed
        )
    }
}

impl fmt::Display for StepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
