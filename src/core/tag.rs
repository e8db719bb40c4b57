//! Closed registry of entity tags used for cache invalidation
//!
//! Every cacheable resource kind served by the backend has exactly one
//! [`EntityTag`]. Read endpoints *provide* tags, write endpoints
//! *invalidate* them, and the cache layer intersects the two sets to
//! decide which live queries must refetch.
//!
//! The registry is a closed enum rather than interned strings: referring
//! to a tag that does not exist is a compile error, not a runtime one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category label identifying one logical resource group
///
/// The set is fixed at build time. Adding a backend resource kind means
/// adding a variant here (and a row in `EntityTag::ALL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityTag {
    Author,
    Blog,
    Committee,
    Contact,
    Department,
    Event,
    Partner,
    Program,
    Publication,
    Research,
    Slider,
    Tag,
    Video,
    User,
}

impl EntityTag {
    /// All registered tags, in declaration order
    pub const ALL: [EntityTag; 14] = [
        EntityTag::Author,
        EntityTag::Blog,
        EntityTag::Committee,
        EntityTag::Contact,
        EntityTag::Department,
        EntityTag::Event,
        EntityTag::Partner,
        EntityTag::Program,
        EntityTag::Publication,
        EntityTag::Research,
        EntityTag::Slider,
        EntityTag::Tag,
        EntityTag::Video,
        EntityTag::User,
    ];

    /// The canonical singular name (e.g. "event")
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityTag::Author => "author",
            EntityTag::Blog => "blog",
            EntityTag::Committee => "committee",
            EntityTag::Contact => "contact",
            EntityTag::Department => "department",
            EntityTag::Event => "event",
            EntityTag::Partner => "partner",
            EntityTag::Program => "program",
            EntityTag::Publication => "publication",
            EntityTag::Research => "research",
            EntityTag::Slider => "slider",
            EntityTag::Tag => "tag",
            EntityTag::Video => "video",
            EntityTag::User => "user",
        }
    }

    /// The REST collection path for this kind (e.g. "/events")
    pub fn base_path(&self) -> &'static str {
        match self {
            EntityTag::Author => "/authors",
            EntityTag::Blog => "/blogs",
            EntityTag::Committee => "/committees",
            EntityTag::Contact => "/contacts",
            EntityTag::Department => "/departments",
            EntityTag::Event => "/events",
            EntityTag::Partner => "/partners",
            EntityTag::Program => "/programs",
            EntityTag::Publication => "/publications",
            EntityTag::Research => "/research",
            EntityTag::Slider => "/sliders",
            EntityTag::Tag => "/tags",
            EntityTag::Video => "/videos",
            EntityTag::User => "/users",
        }
    }

    fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`EntityTag`]s, stored as a bitmask
///
/// Cheap to copy and compare; intersection is a single AND. This is the
/// currency of the invalidation machinery: descriptors carry a `TagSet`
/// and invalidation events carry a `TagSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TagSet(u32);

impl TagSet {
    /// The empty set
    pub const EMPTY: TagSet = TagSet(0);

    /// A set containing a single tag
    pub const fn single(tag: EntityTag) -> Self {
        TagSet(1 << (tag as u32))
    }

    /// Build a set from any iterator of tags
    pub fn from_tags<I: IntoIterator<Item = EntityTag>>(tags: I) -> Self {
        let mut set = TagSet::EMPTY;
        for tag in tags {
            set.insert(tag);
        }
        set
    }

    pub fn insert(&mut self, tag: EntityTag) {
        self.0 |= tag.bit();
    }

    pub fn contains(&self, tag: EntityTag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// True if the two sets share at least one tag
    pub fn intersects(&self, other: TagSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(&self, other: TagSet) -> TagSet {
        TagSet(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the tags in the set, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = EntityTag> + '_ {
        EntityTag::ALL.iter().copied().filter(|t| self.contains(*t))
    }
}

impl From<EntityTag> for TagSet {
    fn from(tag: EntityTag) -> Self {
        TagSet::single(tag)
    }
}

impl FromIterator<EntityTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = EntityTag>>(iter: I) -> Self {
        TagSet::from_tags(iter)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|t| t.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
