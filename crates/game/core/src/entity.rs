use std::fmt;

use glam::Vec3;

/// Unique identifier for any character tracked by the combat layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::PLAYER
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World-space placement of a character.
///
/// `forward` is kept normalized; hit shapes are projected along it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub location: Vec3,
    pub forward: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        location: Vec3::ZERO,
        forward: Vec3::X,
    };

    pub fn new(location: Vec3, forward: Vec3) -> Self {
        Self {
            location,
            forward: forward.try_normalize().unwrap_or(Vec3::X),
        }
    }

    pub fn at(location: Vec3) -> Self {
        Self {
            location,
            forward: Vec3::X,
        }
    }

    /// Point `distance` units ahead of the character.
    pub fn ahead(&self, distance: f32) -> Vec3 {
        self.location + self.forward * distance
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
