//! Freehand drawing state.
//!
//! While the canvas is in draw mode, the path being drawn or edited lives in
//! the draw group as a list of line fragments. Finishing the gesture turns
//! the fragments back into a single path string.

use lubankit_core::{FragmentId, IdAllocator, ModelId, SceneError};
use serde::{Deserialize, Serialize};

use super::path::parse_path_data;

/// Canvas interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CanvasMode {
    #[default]
    Select,
    Draw,
}

/// One polyline of a drawn path, in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFragment {
    pub fragment_id: FragmentId,
    pub points: Vec<[f64; 2]>,
    pub closed: bool,
}

impl LineFragment {
    /// `M x y L x y ... [Z]` path data for this fragment.
    pub fn to_path_data(&self) -> String {
        let mut parts = Vec::with_capacity(self.points.len() + 1);
        for (i, [x, y]) in self.points.iter().enumerate() {
            let command = if i == 0 { 'M' } else { 'L' };
            parts.push(format!("{} {} {}", command, fmt_coord(*x), fmt_coord(*y)));
        }
        if self.closed && !parts.is_empty() {
            parts.push("Z".to_string());
        }
        parts.join(" ")
    }
}

fn fmt_coord(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

/// Draw tool state and the fragments of the path under construction.
#[derive(Debug, Clone, Default)]
pub struct DrawGroup {
    mode: CanvasMode,
    editing: Option<ModelId>,
    lines: Vec<LineFragment>,
    /// Points of the stroke currently under the cursor
    pending_points: Vec<[f64; 2]>,
    ids: IdAllocator,
}

impl DrawGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    pub fn is_drawing(&self) -> bool {
        self.mode == CanvasMode::Draw
    }

    /// Element being edited, `None` when drawing a new path.
    pub fn editing(&self) -> Option<ModelId> {
        self.editing
    }

    /// Enter draw mode, optionally loading an existing path for editing.
    pub fn start(&mut self, editing: Option<ModelId>, path: Option<&str>) {
        self.mode = CanvasMode::Draw;
        self.editing = editing;
        self.lines.clear();
        self.reset_operation();
        if let Some(path) = path {
            for (points, closed) in parse_path_data(path) {
                let fragment_id = self.next_fragment_id();
                self.lines.push(LineFragment {
                    fragment_id,
                    points,
                    closed,
                });
            }
        }
    }

    /// Leave draw mode, returning the fragments drawn so far.
    pub fn finish(&mut self) -> Vec<LineFragment> {
        self.mode = CanvasMode::Select;
        self.editing = None;
        self.reset_operation();
        std::mem::take(&mut self.lines)
    }

    pub fn next_fragment_id(&mut self) -> FragmentId {
        FragmentId(self.ids.allocate())
    }

    pub fn add_line(&mut self, line: LineFragment) {
        self.ids.observe(line.fragment_id.get());
        self.lines.push(line);
    }

    pub fn remove_line(&mut self, fragment_id: FragmentId) -> Result<LineFragment, SceneError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.fragment_id == fragment_id)
            .ok_or(SceneError::DrawFragmentNotFound { fragment_id })?;
        Ok(self.lines.remove(index))
    }

    pub fn line(&self, fragment_id: FragmentId) -> Option<&LineFragment> {
        self.lines.iter().find(|l| l.fragment_id == fragment_id)
    }

    pub fn lines(&self) -> &[LineFragment] {
        &self.lines
    }

    pub fn replace_lines(&mut self, lines: Vec<LineFragment>) {
        for line in &lines {
            self.ids.observe(line.fragment_id.get());
        }
        self.lines = lines;
    }

    /// Record a point of the stroke in progress.
    pub fn push_pending_point(&mut self, point: [f64; 2]) {
        self.pending_points.push(point);
    }

    pub fn pending_points(&self) -> &[[f64; 2]] {
        &self.pending_points
    }

    /// Drop the stroke in progress.
    pub fn reset_operation(&mut self) {
        self.pending_points.clear();
    }

    /// Path data of all fragments.
    pub fn path_data(&self) -> String {
        lines_to_path_data(&self.lines)
    }
}

/// Join fragments into one path string.
pub fn lines_to_path_data(lines: &[LineFragment]) -> String {
    lines
        .iter()
        .map(LineFragment::to_path_data)
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
