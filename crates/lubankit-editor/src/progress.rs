//! Weighted progress of long-running editor sessions.
//!
//! A profile registered under a [`ProcessStage`] is an ascending list of
//! checkpoints. Each checkpoint covers the range between the previous
//! checkpoint's percent and its own; a checkpoint may repeat N times (one
//! per tool path, say), splitting its range into N equal slices.

use std::collections::HashMap;

use lubankit_core::{ProcessStage, ProgressError, StepStage};
use lubankit_settings::{NoticeSettings, NoticeTemplates, PROGRESS_PLACEHOLDER};

/// One checkpoint as registered by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageCheckpoint {
    pub stage: StepStage,
    /// Cumulative share of the whole session reached when this stage ends
    pub percent: f64,
}

impl StageCheckpoint {
    pub const fn new(stage: StepStage, percent: f64) -> Self {
        Self { stage, percent }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct WeightedStage {
    stage: StepStage,
    start_percent: f64,
    percent: f64,
}

/// A registered profile with its notices.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    stages: Vec<WeightedStage>,
    notices: NoticeTemplates,
}

impl ProgressState {
    fn new(checkpoints: &[StageCheckpoint], notices: NoticeTemplates) -> Result<Self, ProgressError> {
        if checkpoints.is_empty() {
            return Err(ProgressError::InvalidStages {
                reason: "no stages".to_string(),
            });
        }
        let mut stages = Vec::with_capacity(checkpoints.len());
        let mut start_percent = 0.0;
        for checkpoint in checkpoints {
            if !(checkpoint.percent > start_percent && checkpoint.percent <= 1.0) {
                return Err(ProgressError::InvalidStages {
                    reason: format!(
                        "{} percent {} must be in ({}, 1]",
                        checkpoint.stage, checkpoint.percent, start_percent
                    ),
                });
            }
            stages.push(WeightedStage {
                stage: checkpoint.stage,
                start_percent,
                percent: checkpoint.percent,
            });
            start_percent = checkpoint.percent;
        }
        Ok(Self { stages, notices })
    }

    fn position(&self, stage: StepStage) -> Option<usize> {
        self.stages.iter().position(|s| s.stage == stage)
    }

    /// Step stages of this profile in order.
    pub fn stages(&self) -> impl Iterator<Item = StepStage> + '_ {
        self.stages.iter().map(|s| s.stage)
    }
}

/// Session outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStatus {
    #[default]
    Empty,
    Running,
    Success,
    Failed,
}

/// Tracks the active session of one editing surface.
#[derive(Debug, Clone, Default)]
pub struct ProgressStatesManager {
    profiles: HashMap<ProcessStage, ProgressState>,
    process_stage: ProcessStage,
    /// Remaining repeats per stage
    counts: Vec<u32>,
    total_counts: Vec<u32>,
    stage_index: usize,
    progress: f64,
    status: ProgressStatus,
}

impl ProgressStatesManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager with the editor's built-in profiles.
    pub fn with_default_profiles(notices: &NoticeSettings) -> Self {
        use StepStage::*;

        let profiles: [(ProcessStage, &[StageCheckpoint]); 5] = [
            (
                ProcessStage::UploadImage,
                &[
                    StageCheckpoint::new(UploadingImage, 0.5),
                    StageCheckpoint::new(ProcessingImage, 1.0),
                ],
            ),
            (
                ProcessStage::ProcessImage,
                &[StageCheckpoint::new(ProcessingImage, 1.0)],
            ),
            (
                ProcessStage::GenerateToolPathAndPreview,
                &[
                    StageCheckpoint::new(GeneratingToolPath, 0.8),
                    StageCheckpoint::new(PreviewingToolPath, 1.0),
                ],
            ),
            (
                ProcessStage::SvgClipping,
                &[StageCheckpoint::new(StepStage::SvgClipping, 1.0)],
            ),
            (
                ProcessStage::ResizeImage,
                &[StageCheckpoint::new(ResizingImage, 1.0)],
            ),
        ];

        let mut manager = Self::new();
        for (process_stage, checkpoints) in profiles {
            let Some(templates) = notices.for_stage(process_stage) else {
                continue;
            };
            if let Err(err) = manager.push(process_stage, checkpoints, templates.clone()) {
                tracing::warn!("Skipping progress profile {}: {}", process_stage, err);
            }
        }
        manager
    }

    /// Register (or replace) a profile.
    pub fn push(
        &mut self,
        process_stage: ProcessStage,
        checkpoints: &[StageCheckpoint],
        notices: NoticeTemplates,
    ) -> Result<(), ProgressError> {
        if process_stage.is_empty() {
            return Err(ProgressError::UnknownProcessStage(process_stage.to_string()));
        }
        let state = ProgressState::new(checkpoints, notices)?;
        self.profiles.insert(process_stage, state);
        Ok(())
    }

    pub fn profile(&self, process_stage: ProcessStage) -> Option<&ProgressState> {
        self.profiles.get(&process_stage)
    }

    /// Begin a session. `counts[i]` is how many times stage `i` repeats;
    /// missing or zero entries count once.
    pub fn start_progress(&mut self, process_stage: ProcessStage, counts: &[u32]) -> Result<(), ProgressError> {
        let profile = self
            .profiles
            .get(&process_stage)
            .ok_or_else(|| ProgressError::UnknownProcessStage(process_stage.to_string()))?;
        let total_counts: Vec<u32> = (0..profile.stages.len())
            .map(|i| counts.get(i).copied().unwrap_or(1).max(1))
            .collect();

        self.process_stage = process_stage;
        self.counts = total_counts.clone();
        self.total_counts = total_counts;
        self.stage_index = 0;
        self.progress = 0.0;
        self.status = ProgressStatus::Running;
        tracing::debug!("Progress started for {}", process_stage);
        Ok(())
    }

    /// Report `fraction` of the current repeat of `stage` as done.
    ///
    /// Returns the session progress, which never decreases and never
    /// exceeds 1. Stages outside the active profile leave it unchanged.
    pub fn update_progress(&mut self, stage: StepStage, fraction: f64) -> f64 {
        let Some(profile) = self.profiles.get(&self.process_stage) else {
            return self.progress;
        };
        let Some(index) = profile.position(stage) else {
            tracing::debug!("{} is not part of {}", stage, self.process_stage);
            return self.progress;
        };
        let weighted = &profile.stages[index];
        let total = f64::from(self.total_counts.get(index).copied().unwrap_or(1));
        let remaining = f64::from(self.counts.get(index).copied().unwrap_or(1));
        let completed = (total - remaining).max(0.0);
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };

        let value = weighted.start_percent
            + (weighted.percent - weighted.start_percent) * (completed + fraction) / total;
        let value = value.clamp(0.0, 1.0);
        if value > self.progress {
            self.progress = value;
        }
        self.progress
    }

    /// Consume one repeat of the current stage, moving to the next stage
    /// once all repeats are done.
    pub fn start_next_step(&mut self) {
        let Some(count) = self.counts.get_mut(self.stage_index) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count == 0 && self.stage_index + 1 < self.counts.len() {
            self.stage_index += 1;
        }
    }

    /// Stage the session is currently in.
    pub fn current_stage(&self) -> Option<StepStage> {
        let profile = self.profiles.get(&self.process_stage)?;
        profile.stages.get(self.stage_index).map(|s| s.stage)
    }

    /// End the session. The manager can start a new one afterwards.
    pub fn finish_progress(&mut self, success: bool) {
        if success {
            self.status = ProgressStatus::Success;
            self.progress = 1.0;
        } else {
            self.status = ProgressStatus::Failed;
        }
        self.counts.clear();
        self.total_counts.clear();
        self.stage_index = 0;
    }

    pub fn reset(&mut self) {
        self.process_stage = ProcessStage::Empty;
        self.status = ProgressStatus::Empty;
        self.progress = 0.0;
        self.counts.clear();
        self.total_counts.clear();
        self.stage_index = 0;
    }

    /// Notice for `process_stage` under the current status.
    pub fn get_notice(&self, process_stage: ProcessStage, progress: f64) -> String {
        let Some(profile) = self.profiles.get(&process_stage) else {
            return String::new();
        };
        let notices = &profile.notices;
        match self.status {
            ProgressStatus::Empty => String::new(),
            ProgressStatus::Running => notices
                .running
                .replace(PROGRESS_PLACEHOLDER, &format!("{:.0}", progress * 100.0)),
            ProgressStatus::Success => notices.success.clone(),
            ProgressStatus::Failed => notices.failed.clone(),
        }
    }

    pub fn state(&self) -> ProgressStatus {
        self.status
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn process_stage(&self) -> ProcessStage {
        self.process_stage
    }
}
