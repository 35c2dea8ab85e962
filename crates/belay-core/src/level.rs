//! Hierarchy levels and their schema
//!
//! The catalog is a strict containment tree:
//! country → region → area → sub-area → crag → {wall | path} → ... → point.
//! Every level is described by a static [`LevelSchema`] which is the single
//! source of truth for parent/child relationships, sibling ordering and
//! visibility state.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A level of the catalog hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Country,
    Region,
    Area,
    SubArea,
    Crag,
    Wall,
    Route,
    Pitch,
    Point,
    Path,
    PathPoint,
}

/// Static description of one hierarchy level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSchema {
    /// Level of the parent resource, `None` for the root level
    pub parent: Option<ResourceKind>,
    /// Child levels, each resolved and attached independently
    pub children: &'static [ResourceKind],
    /// Siblings at this level form a `first`/`next` chain
    pub orderable: bool,
    /// Resources at this level carry a visibility state
    pub stateful: bool,
}

impl ResourceKind {
    /// All levels, root first
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Country,
        ResourceKind::Region,
        ResourceKind::Area,
        ResourceKind::SubArea,
        ResourceKind::Crag,
        ResourceKind::Wall,
        ResourceKind::Route,
        ResourceKind::Pitch,
        ResourceKind::Point,
        ResourceKind::Path,
        ResourceKind::PathPoint,
    ];

    /// Schema for this level
    pub const fn schema(self) -> LevelSchema {
        use ResourceKind::*;
        match self {
            Country => LevelSchema {
                parent: None,
                children: &[Region],
                orderable: false,
                stateful: false,
            },
            Region => LevelSchema {
                parent: Some(Country),
                children: &[Area],
                orderable: false,
                stateful: false,
            },
            Area => LevelSchema {
                parent: Some(Region),
                children: &[SubArea],
                orderable: false,
                stateful: false,
            },
            SubArea => LevelSchema {
                parent: Some(Area),
                children: &[Crag],
                orderable: false,
                stateful: false,
            },
            Crag => LevelSchema {
                parent: Some(SubArea),
                children: &[Wall, Path],
                orderable: false,
                stateful: true,
            },
            Wall => LevelSchema {
                parent: Some(Crag),
                children: &[Route],
                orderable: true,
                stateful: false,
            },
            Route => LevelSchema {
                parent: Some(Wall),
                children: &[Pitch],
                orderable: true,
                stateful: false,
            },
            Pitch => LevelSchema {
                parent: Some(Route),
                children: &[Point],
                orderable: true,
                stateful: false,
            },
            Point => LevelSchema {
                parent: Some(Pitch),
                children: &[],
                orderable: true,
                stateful: false,
            },
            Path => LevelSchema {
                parent: Some(Crag),
                children: &[PathPoint],
                orderable: false,
                stateful: false,
            },
            PathPoint => LevelSchema {
                parent: Some(Path),
                children: &[],
                orderable: true,
                stateful: false,
            },
        }
    }

    pub const fn parent(self) -> Option<ResourceKind> {
        self.schema().parent
    }

    pub const fn children(self) -> &'static [ResourceKind] {
        self.schema().children
    }

    pub const fn is_orderable(self) -> bool {
        self.schema().orderable
    }

    pub const fn is_stateful(self) -> bool {
        self.schema().stateful
    }

    pub const fn is_root(self) -> bool {
        self.schema().parent.is_none()
    }

    /// Whether `child` is one of this level's child levels
    pub fn has_child(self, child: ResourceKind) -> bool {
        self.children().contains(&child)
    }

    /// Whether any level above this one carries a visibility state
    ///
    /// Used to decide if a direct lookup must also check its ancestors.
    pub fn has_stateful_ancestor(self) -> bool {
        let mut current = self.parent();
        while let Some(kind) = current {
            if kind.is_stateful() {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Stable lowercase name used in storage keys and on the command line
    pub const fn as_str(self) -> &'static str {
        use ResourceKind::*;
        match self {
            Country => "country",
            Region => "region",
            Area => "area",
            SubArea => "sub-area",
            Crag => "crag",
            Wall => "wall",
            Route => "route",
            Pitch => "pitch",
            Point => "point",
            Path => "path",
            PathPoint => "path-point",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}
