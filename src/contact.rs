//! Contact data and per-step ground accumulation.
//!
//! The physics engine reports contacts; the controller only keeps the ones
//! that count as ground support and sums their normals until the next
//! state refresh.

use bevy::prelude::*;

use crate::slope::WORLD_UP;

/// A single contact point reported by the collision system.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceContact {
    /// World position of the contact point.
    pub point: Vec3,
    /// Surface normal at the contact, pointing toward the actor.
    pub normal: Vec3,
}

impl SurfaceContact {
    /// Create a contact.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Whether this contact supports the actor for the given threshold.
    ///
    /// Compares the cosine of the angle between the normal and world up
    /// against `min_ground_dot_product`; equality counts as ground.
    #[inline]
    pub fn is_ground(&self, min_ground_dot_product: f32) -> bool {
        self.normal.dot(WORLD_UP) >= min_ground_dot_product
    }
}

/// Ground support gathered between two clears.
///
/// Cumulative: every evaluation adds to what is already there. Only
/// [`GroundContact::clear`] resets it.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundContact {
    on_ground: bool,
    normal_sum: Vec3,
    count: u32,
}

impl GroundContact {
    /// Classify `contacts` and accumulate the grounding ones.
    ///
    /// Returns how many of the given contacts counted as ground.
    pub fn accumulate<I>(&mut self, contacts: I, min_ground_dot_product: f32) -> u32
    where
        I: IntoIterator<Item = SurfaceContact>,
    {
        let mut added = 0;
        for contact in contacts {
            if contact.is_ground(min_ground_dot_product) {
                self.on_ground = true;
                self.normal_sum += contact.normal;
                added += 1;
            }
        }
        self.count += added;
        added
    }

    /// Whether any grounding contact has been seen since the last clear.
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Unnormalized sum of grounding normals.
    #[inline]
    pub fn normal_sum(&self) -> Vec3 {
        self.normal_sum
    }

    /// Number of grounding contacts since the last clear.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Drop everything gathered so far.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
