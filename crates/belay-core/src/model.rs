//! Resource data model
//!
//! Each hierarchy level has its own struct made of identity fields, an
//! attribute set and, where the level's schema asks for it, capability
//! fields (`link` for ordered siblings, `state` for visibility). The
//! capability traits below are implemented selectively so that generic
//! code can branch on what a level can do instead of on which level it is.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::level::ResourceKind;

/// Identifier of a resource, unique within its level
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Position of a resource in its sibling chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Head of the chain
    pub first: bool,
    /// Following sibling, `None` on the tail
    pub next: Option<ResourceId>,
}

impl ChainLink {
    pub fn new(first: bool, next: Option<ResourceId>) -> Self {
        Self { first, next }
    }

    /// Link for the head of a chain
    pub fn head(next: Option<ResourceId>) -> Self {
        Self::new(true, next)
    }

    /// Link for a non-head node
    pub fn after(next: Option<ResourceId>) -> Self {
        Self::new(false, next)
    }
}

/// Review state of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    InReview,
    Public,
}

impl Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::InReview => write!(f, "IN_REVIEW"),
            Visibility::Public => write!(f, "PUBLIC"),
        }
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

pub trait Identified {
    fn id(&self) -> &ResourceId;
}

/// A concrete hierarchy level
pub trait Level: Identified {
    const KIND: ResourceKind;

    fn parent_id(&self) -> Option<&ResourceId>;
}

/// Siblings of this type form a singly linked chain
pub trait HasOrder: Identified {
    fn is_first(&self) -> bool;
    fn next(&self) -> Option<&ResourceId>;
}

/// Carries a review state that gates unprivileged reads
pub trait HasVisibility {
    fn visibility(&self) -> Visibility;
}

/// Has one or more child levels
pub trait HasChildren {
    fn child_kinds(&self) -> &'static [ResourceKind];
}

// ---------------------------------------------------------------------------
// Attribute sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAttributes {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAttributes {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaAttributes {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAreaAttributes {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CragAttributes {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub state: Visibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallAttributes {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAttributes {
    pub name: String,
    pub description: Option<String>,
    pub grade: Option<u8>,
    pub grade_modifier: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchAttributes {
    pub description: Option<String>,
    pub grade: Option<u8>,
    pub grade_modifier: Option<String>,
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointAttributes {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathAttributes {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPointAttributes {
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: ResourceId,
    pub attributes: CountryAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: ResourceId,
    pub country_id: ResourceId,
    pub attributes: RegionAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: ResourceId,
    pub region_id: ResourceId,
    pub attributes: AreaAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubArea {
    pub id: ResourceId,
    pub area_id: ResourceId,
    pub attributes: SubAreaAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crag {
    pub id: ResourceId,
    pub sub_area_id: ResourceId,
    pub attributes: CragAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: ResourceId,
    pub crag_id: ResourceId,
    pub attributes: WallAttributes,
    pub link: ChainLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: ResourceId,
    pub wall_id: ResourceId,
    pub attributes: RouteAttributes,
    pub link: ChainLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub id: ResourceId,
    pub route_id: ResourceId,
    pub attributes: PitchAttributes,
    pub link: ChainLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: ResourceId,
    pub pitch_id: ResourceId,
    pub attributes: PointAttributes,
    pub link: ChainLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: ResourceId,
    pub crag_id: ResourceId,
    pub attributes: PathAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub id: ResourceId,
    pub path_id: ResourceId,
    pub attributes: PathPointAttributes,
    pub link: ChainLink,
}

macro_rules! impl_level {
    ($ty:ident, root) => {
        impl Identified for $ty {
            fn id(&self) -> &ResourceId {
                &self.id
            }
        }

        impl Level for $ty {
            const KIND: ResourceKind = ResourceKind::$ty;

            fn parent_id(&self) -> Option<&ResourceId> {
                None
            }
        }
    };
    ($ty:ident, $parent:ident) => {
        impl Identified for $ty {
            fn id(&self) -> &ResourceId {
                &self.id
            }
        }

        impl Level for $ty {
            const KIND: ResourceKind = ResourceKind::$ty;

            fn parent_id(&self) -> Option<&ResourceId> {
                Some(&self.$parent)
            }
        }
    };
}

impl_level!(Country, root);
impl_level!(Region, country_id);
impl_level!(Area, region_id);
impl_level!(SubArea, area_id);
impl_level!(Crag, sub_area_id);
impl_level!(Wall, crag_id);
impl_level!(Route, wall_id);
impl_level!(Pitch, route_id);
impl_level!(Point, pitch_id);
impl_level!(Path, crag_id);
impl_level!(PathPoint, path_id);

macro_rules! impl_has_order {
    ($($ty:ident),*) => {
        $(
            impl HasOrder for $ty {
                fn is_first(&self) -> bool {
                    self.link.first
                }

                fn next(&self) -> Option<&ResourceId> {
                    self.link.next.as_ref()
                }
            }
        )*
    };
}

impl_has_order!(Wall, Route, Pitch, Point, PathPoint);

macro_rules! impl_has_children {
    ($($ty:ident),*) => {
        $(
            impl HasChildren for $ty {
                fn child_kinds(&self) -> &'static [ResourceKind] {
                    <$ty as Level>::KIND.children()
                }
            }
        )*
    };
}

impl_has_children!(Country, Region, Area, SubArea, Crag, Wall, Route, Pitch, Path);

impl HasVisibility for Crag {
    fn visibility(&self) -> Visibility {
        self.attributes.state
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A record at any level of the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Country(Country),
    Region(Region),
    Area(Area),
    SubArea(SubArea),
    Crag(Crag),
    Wall(Wall),
    Route(Route),
    Pitch(Pitch),
    Point(Point),
    Path(Path),
    PathPoint(PathPoint),
}

macro_rules! on_level {
    ($resource:expr, $level:ident => $body:expr) => {
        match $resource {
            Resource::Country($level) => $body,
            Resource::Region($level) => $body,
            Resource::Area($level) => $body,
            Resource::SubArea($level) => $body,
            Resource::Crag($level) => $body,
            Resource::Wall($level) => $body,
            Resource::Route($level) => $body,
            Resource::Pitch($level) => $body,
            Resource::Point($level) => $body,
            Resource::Path($level) => $body,
            Resource::PathPoint($level) => $body,
        }
    };
}

fn kind_of<L: Level>(_: &L) -> ResourceKind {
    L::KIND
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        on_level!(self, r => kind_of(r))
    }

    pub fn id(&self) -> &ResourceId {
        on_level!(self, r => &r.id)
    }

    pub fn parent_id(&self) -> Option<&ResourceId> {
        on_level!(self, r => r.parent_id())
    }

    /// Chain position, present only on orderable levels
    pub fn link(&self) -> Option<&ChainLink> {
        match self {
            Resource::Wall(r) => Some(&r.link),
            Resource::Route(r) => Some(&r.link),
            Resource::Pitch(r) => Some(&r.link),
            Resource::Point(r) => Some(&r.link),
            Resource::PathPoint(r) => Some(&r.link),
            _ => None,
        }
    }

    /// Review state, present only on stateful levels
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            Resource::Crag(r) => Some(r.visibility()),
            _ => None,
        }
    }

    /// Child levels, empty for leaf levels
    pub fn child_kinds(&self) -> &'static [ResourceKind] {
        match self {
            Resource::Country(r) => r.child_kinds(),
            Resource::Region(r) => r.child_kinds(),
            Resource::Area(r) => r.child_kinds(),
            Resource::SubArea(r) => r.child_kinds(),
            Resource::Crag(r) => r.child_kinds(),
            Resource::Wall(r) => r.child_kinds(),
            Resource::Route(r) => r.child_kinds(),
            Resource::Pitch(r) => r.child_kinds(),
            Resource::Path(r) => r.child_kinds(),
            Resource::Point(_) | Resource::PathPoint(_) => &[],
        }
    }

    /// Attribute set of this resource, detached from identity and capabilities
    pub fn attributes(&self) -> Attributes {
        match self {
            Resource::Country(r) => Attributes::Country(r.attributes.clone()),
            Resource::Region(r) => Attributes::Region(r.attributes.clone()),
            Resource::Area(r) => Attributes::Area(r.attributes.clone()),
            Resource::SubArea(r) => Attributes::SubArea(r.attributes.clone()),
            Resource::Crag(r) => Attributes::Crag(r.attributes.clone()),
            Resource::Wall(r) => Attributes::Wall(r.attributes.clone()),
            Resource::Route(r) => Attributes::Route(r.attributes.clone()),
            Resource::Pitch(r) => Attributes::Pitch(r.attributes.clone()),
            Resource::Point(r) => Attributes::Point(r.attributes),
            Resource::Path(r) => Attributes::Path(r.attributes.clone()),
            Resource::PathPoint(r) => Attributes::PathPoint(r.attributes),
        }
    }
}

impl Identified for Resource {
    fn id(&self) -> &ResourceId {
        Resource::id(self)
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Attribute set of any level, used as a creation spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attributes {
    Country(CountryAttributes),
    Region(RegionAttributes),
    Area(AreaAttributes),
    SubArea(SubAreaAttributes),
    Crag(CragAttributes),
    Wall(WallAttributes),
    Route(RouteAttributes),
    Pitch(PitchAttributes),
    Point(PointAttributes),
    Path(PathAttributes),
    PathPoint(PathPointAttributes),
}

impl Attributes {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Attributes::Country(_) => ResourceKind::Country,
            Attributes::Region(_) => ResourceKind::Region,
            Attributes::Area(_) => ResourceKind::Area,
            Attributes::SubArea(_) => ResourceKind::SubArea,
            Attributes::Crag(_) => ResourceKind::Crag,
            Attributes::Wall(_) => ResourceKind::Wall,
            Attributes::Route(_) => ResourceKind::Route,
            Attributes::Pitch(_) => ResourceKind::Pitch,
            Attributes::Point(_) => ResourceKind::Point,
            Attributes::Path(_) => ResourceKind::Path,
            Attributes::PathPoint(_) => ResourceKind::PathPoint,
        }
    }

    /// Human readable prefix for a generated id
    ///
    /// Named levels use their name; anonymous levels derive it from the parent.
    pub fn id_prefix(&self, parent_id: Option<&ResourceId>) -> String {
        let parent = parent_id.map(ResourceId::as_str).unwrap_or_default();
        match self {
            Attributes::Country(a) => a.name.clone(),
            Attributes::Region(a) => a.name.clone(),
            Attributes::Area(a) => a.name.clone(),
            Attributes::SubArea(a) => a.name.clone(),
            Attributes::Crag(a) => a.name.clone(),
            Attributes::Wall(a) => a.name.clone(),
            Attributes::Route(a) => a.name.clone(),
            Attributes::Pitch(_) => format!("{parent}-pitch"),
            Attributes::Point(_) => format!("{parent}-point"),
            Attributes::Path(_) => format!("{parent}-path"),
            Attributes::PathPoint(_) => format!("{parent}-path-point"),
        }
    }

    /// Build a resource from this attribute set
    ///
    /// `parent_id` must be present exactly when the level has a parent and
    /// `link` exactly when the level is orderable.
    pub fn into_resource(
        self,
        id: ResourceId,
        parent_id: Option<ResourceId>,
        link: Option<ChainLink>,
    ) -> Result<Resource, ModelError> {
        let kind = self.kind();
        if kind.is_root() && parent_id.is_some() {
            return Err(ModelError::UnexpectedParent { kind });
        }
        if !kind.is_orderable() && link.is_some() {
            return Err(ModelError::UnexpectedLink { kind });
        }
        let parent = || parent_id.clone().ok_or(ModelError::MissingParent { kind });
        let link = || link.clone().ok_or(ModelError::MissingLink { kind });

        let resource = match self {
            Attributes::Country(attributes) => Resource::Country(Country { id, attributes }),
            Attributes::Region(attributes) => Resource::Region(Region {
                id,
                country_id: parent()?,
                attributes,
            }),
            Attributes::Area(attributes) => Resource::Area(Area {
                id,
                region_id: parent()?,
                attributes,
            }),
            Attributes::SubArea(attributes) => Resource::SubArea(SubArea {
                id,
                area_id: parent()?,
                attributes,
            }),
            Attributes::Crag(attributes) => Resource::Crag(Crag {
                id,
                sub_area_id: parent()?,
                attributes,
            }),
            Attributes::Wall(attributes) => Resource::Wall(Wall {
                id,
                crag_id: parent()?,
                attributes,
                link: link()?,
            }),
            Attributes::Route(attributes) => Resource::Route(Route {
                id,
                wall_id: parent()?,
                attributes,
                link: link()?,
            }),
            Attributes::Pitch(attributes) => Resource::Pitch(Pitch {
                id,
                route_id: parent()?,
                attributes,
                link: link()?,
            }),
            Attributes::Point(attributes) => Resource::Point(Point {
                id,
                pitch_id: parent()?,
                attributes,
                link: link()?,
            }),
            Attributes::Path(attributes) => Resource::Path(Path {
                id,
                crag_id: parent()?,
                attributes,
            }),
            Attributes::PathPoint(attributes) => Resource::PathPoint(PathPoint {
                id,
                path_id: parent()?,
                attributes,
                link: link()?,
            }),
        };
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(id: &str, first: bool, next: Option<&str>) -> Resource {
        Attributes::Wall(WallAttributes {
            name: id.to_uppercase(),
        })
        .into_resource(
            ResourceId::from(id),
            Some(ResourceId::from("crag-1")),
            Some(ChainLink::new(first, next.map(ResourceId::from))),
        )
        .unwrap()
    }

    #[test]
    fn test_resource_accessors() {
        let resource = wall("w1", true, Some("w2"));
        assert_eq!(resource.kind(), ResourceKind::Wall);
        assert_eq!(resource.id().as_str(), "w1");
        assert_eq!(resource.parent_id().map(ResourceId::as_str), Some("crag-1"));
        assert_eq!(
            resource.link(),
            Some(&ChainLink::head(Some(ResourceId::from("w2"))))
        );
        assert_eq!(resource.visibility(), None);
        assert_eq!(resource.child_kinds(), &[ResourceKind::Route]);
    }

    #[test]
    fn test_capabilities_on_level_structs() {
        let Resource::Wall(w) = wall("w1", false, None) else {
            panic!("expected a wall");
        };
        assert!(!w.is_first());
        assert!(w.next().is_none());
        assert_eq!(w.child_kinds(), &[ResourceKind::Route]);
    }

    #[test]
    fn test_leaf_levels_have_no_child_kinds() {
        let point = Attributes::Point(PointAttributes {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        })
        .into_resource("pt".into(), Some("p1".into()), Some(ChainLink::head(None)))
        .unwrap();
        assert!(point.child_kinds().is_empty());

        let path = Attributes::Path(PathAttributes::default())
            .into_resource("approach".into(), Some("index".into()), None)
            .unwrap();
        assert_eq!(path.child_kinds(), &[ResourceKind::PathPoint]);
    }

    #[test]
    fn test_crag_visibility() {
        let crag = Attributes::Crag(CragAttributes {
            name: "Index".into(),
            description: None,
            location: None,
            state: Visibility::InReview,
        })
        .into_resource(ResourceId::from("index"), Some("sub".into()), None)
        .unwrap();
        assert_eq!(crag.visibility(), Some(Visibility::InReview));
        assert!(crag.link().is_none());
    }

    #[test]
    fn test_into_resource_rejects_mismatches() {
        let country = Attributes::Country(CountryAttributes { name: "US".into() });
        assert_eq!(
            country
                .clone()
                .into_resource("us".into(), Some("x".into()), None),
            Err(ModelError::UnexpectedParent {
                kind: ResourceKind::Country
            })
        );
        assert_eq!(
            country.into_resource("us".into(), None, Some(ChainLink::head(None))),
            Err(ModelError::UnexpectedLink {
                kind: ResourceKind::Country
            })
        );

        let point = Attributes::Point(PointAttributes {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        });
        assert_eq!(
            point.clone().into_resource("p".into(), Some("pitch".into()), None),
            Err(ModelError::MissingLink {
                kind: ResourceKind::Point
            })
        );
        assert_eq!(
            point.into_resource("p".into(), None, Some(ChainLink::head(None))),
            Err(ModelError::MissingParent {
                kind: ResourceKind::Point
            })
        );
    }

    #[test]
    fn test_id_prefix() {
        let pitch = Attributes::Pitch(PitchAttributes {
            description: None,
            grade: Some(10),
            grade_modifier: None,
            distance: None,
        });
        assert_eq!(pitch.id_prefix(Some(&"route-7".into())), "route-7-pitch");

        let wall = Attributes::Wall(WallAttributes {
            name: "Upper Town Wall".into(),
        });
        assert_eq!(wall.id_prefix(Some(&"crag".into())), "Upper Town Wall");
    }

    #[test]
    fn test_attributes_round_trip_through_resource() {
        let resource = wall("w9", true, None);
        assert_eq!(
            resource.attributes(),
            Attributes::Wall(WallAttributes { name: "W9".into() })
        );
    }

    #[test]
    fn test_postcard_encoding() {
        let resource = wall("w1", true, Some("w2"));
        let bytes = postcard::to_allocvec(&resource).unwrap();
        let decoded: Resource = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, resource);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(wall("w1", true, None)).unwrap();
        assert_eq!(json["wall"]["crag_id"], "crag-1");
        assert_eq!(json["wall"]["link"]["first"], true);
        assert_eq!(
            serde_json::to_value(Visibility::InReview).unwrap(),
            "IN_REVIEW"
        );
    }
}
