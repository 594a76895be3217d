//! Identifiers shared by every editing surface.
//!
//! Models, tool paths and draw fragments are referenced by id rather than by
//! pointer so that an operation whose referent has disappeared can report a
//! clean `NotFound` error instead of touching stale data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Editing surface. Each head type owns an independent scene and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadType {
    /// Laser engraving/cutting surface.
    Laser,
    /// CNC carving surface.
    Cnc,
}

impl HeadType {
    /// All head types, in a stable order.
    pub const ALL: [HeadType; 2] = [HeadType::Laser, HeadType::Cnc];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadType::Laser => "laser",
            HeadType::Cnc => "cnc",
        }
    }
}

impl fmt::Display for HeadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "laser" => Ok(HeadType::Laser),
            "cnc" => Ok(HeadType::Cnc),
            other => Err(Error::other(format!("Unknown head type: {}", other))),
        }
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value.
            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a model (and of its SVG element) within one surface.
    ModelId,
    "model"
);
numeric_id!(
    /// Identifier of a tool path within one surface.
    ToolPathId,
    "toolpath"
);
numeric_id!(
    /// Identifier of a freehand line fragment in the draw group.
    FragmentId,
    "fragment"
);

/// Correlates a worker task request with its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a new unique task ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying uuid.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", &self.0.to_string()[..8])
    }
}

/// Monotonic id allocator used by the scene groups.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Allocator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Make sure ids handed out later never collide with `id`.
    pub fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
