//! Hierarchical gameplay tags.
//!
//! A tag is a dot-separated identifier such as `State.Overclock.Lv2`. Tags serve
//! two purposes in the combat layer:
//! - selecting which attribute a data-driven effect modifies (`Data.Stats.*`)
//! - marking boolean character state (`State.*`) in a [`TagContainer`]
//!
//! Queries are hierarchical: a container holding `State.Overclock.Lv2` matches a
//! query for `State.Overclock`.
pub mod native;

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// Hierarchical, dot-separated tag identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GameplayTag(Cow<'static, str>);

impl GameplayTag {
    /// Creates a tag from a static string without validation.
    ///
    /// Used for the native tag table, whose strings are known to be well formed.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a tag from a runtime string, returning `None` for malformed names.
    pub fn request(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        is_valid_name(&name).then(|| Self(Cow::Owned(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the tag is syntactically usable.
    pub fn is_valid(&self) -> bool {
        is_valid_name(&self.0)
    }

    /// Returns true if `self` equals `other` or is one of its descendants.
    pub fn matches(&self, other: &GameplayTag) -> bool {
        let this = self.as_str();
        let parent = other.as_str();
        this == parent
            || (this.len() > parent.len()
                && this.starts_with(parent)
                && this.as_bytes()[parent.len()] == b'.')
    }

    /// Iterates over the tag's ancestors, nearest first.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        let name = self.as_str();
        name.char_indices()
            .rev()
            .filter(|(_, c)| *c == '.')
            .map(move |(idx, _)| &name[..idx])
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('.')
            .all(|segment| !segment.is_empty() && !segment.chars().any(char::is_whitespace))
}

/// Set of loose tags currently held by a character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagContainer {
    tags: BTreeSet<GameplayTag>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Returns false if it was already held.
    pub fn add(&mut self, tag: GameplayTag) -> bool {
        self.tags.insert(tag)
    }

    /// Removes a tag. Returns false if it was not held.
    pub fn remove(&mut self, tag: &GameplayTag) -> bool {
        self.tags.remove(tag)
    }

    /// Exact membership test.
    pub fn has_exact(&self, tag: &GameplayTag) -> bool {
        self.tags.contains(tag)
    }

    /// Hierarchical membership test: true if the tag or any descendant is held.
    pub fn has_matching(&self, query: &GameplayTag) -> bool {
        self.tags.iter().any(|held| held.matches(query))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameplayTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
