//! Layer masks for collision filtering.
//!
//! Every collider in the world sits on one or more layers. Queries carry a
//! mask and only see colliders whose layers intersect it, which is how the
//! ground sensor tells "something is below me" apart from "I am standing on
//! walkable ground".

use serde::{Deserialize, Serialize};

/// A 32-bit set of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// No layers at all. Queries with this mask never hit anything.
    pub const NONE: Self = Self(0);

    /// General static geometry: walls, props, ceilings.
    pub const DEFAULT: Self = Self(1 << 0);

    /// Surfaces a character may stand on.
    pub const GROUND: Self = Self(1 << 1);

    /// Other characters' bodies.
    pub const PLAYER: Self = Self(1 << 2);

    /// Non-blocking volumes.
    pub const TRIGGER: Self = Self(1 << 3);

    /// Loose objects that block movement but are never walkable.
    pub const PROPS: Self = Self(1 << 4);

    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Everything a character capsule collides with.
    pub const CHARACTER_SOLID: Self =
        Self(Self::DEFAULT.0 | Self::GROUND.0 | Self::PLAYER.0 | Self::PROPS.0);

    /// Layers that count as ground for the default locomotion profile.
    pub const WALKABLE: Self = Self(Self::DEFAULT.0 | Self::GROUND.0);

    /// Mask containing only layer `index` (0..32).
    #[inline]
    pub const fn layer(index: u32) -> Self {
        Self(1 << (index & 31))
    }

    /// Check if these layers contain all of `other`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any layer is shared.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for LayerMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
