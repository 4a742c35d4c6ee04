// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collidable bodies and their shapes.

use fuse_fixed::{Fix, Fix2};
use fuse_geom::Aabb;
use serde::{Deserialize, Serialize};

/// Collider shape, centered on the body position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Disc of the given radius.
    Circle {
        /// Radius (non-negative).
        radius: Fix,
    },
    /// Axis-aligned box with the given half extents.
    Box {
        /// Half width and half height (non-negative).
        half_extents: Fix2,
    },
}

impl Shape {
    /// Bounding box of the shape placed at `center`.
    pub fn aabb(&self, center: Fix2) -> Aabb {
        match *self {
            Self::Circle { radius } => {
                Aabb::from_center_half_extents(center, Fix2::new(radius, radius))
            }
            Self::Box { half_extents } => Aabb::from_center_half_extents(center, half_extents),
        }
    }

    /// Distance from the center to the shape's boundary along the unit
    /// direction `normal`.
    pub fn support(&self, normal: Fix2) -> Fix {
        match *self {
            Self::Circle { radius } => radius,
            Self::Box { half_extents } => {
                normal.x.abs() * half_extents.x + normal.y.abs() * half_extents.y
            }
        }
    }
}

/// Whether collision resolution may move a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mobility {
    /// Never moved by integration or resolution.
    Static,
    /// Integrated every tick and pushed out of static bodies.
    Dynamic,
}

/// How a body interacts with blast segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlastResponse {
    /// Transparent to blasts.
    Ignore,
    /// Stops the blast in this direction.
    Block,
    /// Receives damage; does not stop the blast.
    Damage,
    /// Receives damage and stops the blast.
    BlockAndDamage,
}

impl BlastResponse {
    /// `true` for [`BlastResponse::Block`] and [`BlastResponse::BlockAndDamage`].
    pub const fn blocks(self) -> bool {
        matches!(self, Self::Block | Self::BlockAndDamage)
    }

    /// `true` for [`BlastResponse::Damage`] and [`BlastResponse::BlockAndDamage`].
    pub const fn takes_damage(self) -> bool {
        matches!(self, Self::Damage | Self::BlockAndDamage)
    }
}

/// A collidable entity as seen by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Body {
    /// Opaque entity handle; unique within a simulation.
    pub handle: u32,
    /// Center position.
    pub position: Fix2,
    /// Units per second; applied to dynamic bodies only.
    pub velocity: Fix2,
    /// Collider shape.
    pub shape: Shape,
    /// Static or dynamic.
    pub mobility: Mobility,
    /// Sensors report contacts but are never resolved.
    pub sensor: bool,
    /// Blast interaction.
    pub blast: BlastResponse,
}

impl Body {
    /// A resting dynamic body with no blast interaction.
    pub fn dynamic(handle: u32, position: Fix2, shape: Shape) -> Self {
        Self {
            handle,
            position,
            velocity: Fix2::ZERO,
            shape,
            mobility: Mobility::Dynamic,
            sensor: false,
            blast: BlastResponse::Ignore,
        }
    }

    /// A static body that blocks blasts.
    pub fn wall(handle: u32, position: Fix2, half_extents: Fix2) -> Self {
        Self {
            handle,
            position,
            velocity: Fix2::ZERO,
            shape: Shape::Box { half_extents },
            mobility: Mobility::Static,
            sensor: false,
            blast: BlastResponse::Block,
        }
    }

    /// Sets the velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Fix2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the blast response.
    #[must_use]
    pub fn with_blast(mut self, blast: BlastResponse) -> Self {
        self.blast = blast;
        self
    }

    /// Marks the body as a sensor.
    #[must_use]
    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    /// Current bounding box.
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.position)
    }

    /// `true` for static bodies.
    pub fn is_static(&self) -> bool {
        self.mobility == Mobility::Static
    }
}
