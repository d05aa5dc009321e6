//! Level geometry, spawn points and moving platforms.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use stride_physics::collision::{ColliderId, CollisionWorld, LayerMask};

/// A game level containing collision geometry and spawn points.
#[derive(Debug)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Collision world for physics.
    pub collision: CollisionWorld,

    /// Player spawn points.
    pub spawn_points: Vec<SpawnPoint>,

    /// Kinematic platforms moved every tick.
    pub platforms: Vec<MovingPlatform>,
}

/// A spawn point for players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Feet position in world space.
    pub position: Vec3,

    /// Initial facing (yaw in degrees).
    pub facing: f32,
}

/// A kinematic box shuttling between two points, pausing at each end.
#[derive(Debug, Clone)]
pub struct MovingPlatform {
    pub collider: ColliderId,
    pub low: Vec3,
    pub high: Vec3,
    /// Travel speed in meters/second.
    pub speed: f32,
    /// Pause at each end in seconds.
    pub dwell: f32,
    progress: f32,
    rising: bool,
    wait: f32,
}

impl MovingPlatform {
    pub fn new(collider: ColliderId, low: Vec3, high: Vec3, speed: f32, dwell: f32) -> Self {
        Self {
            collider,
            low,
            high,
            speed,
            dwell,
            progress: 0.0,
            rising: true,
            wait: 0.0,
        }
    }

    /// Current center of the platform.
    pub fn center(&self) -> Vec3 {
        self.low.lerp(self.high, self.progress)
    }

    /// Advance by `dt` seconds and return the new center.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        if self.wait > 0.0 {
            self.wait -= dt;
            return self.center();
        }

        let travel = (self.high - self.low).length();
        if travel <= f32::EPSILON {
            return self.center();
        }

        let step = self.speed * dt / travel;
        if self.rising {
            self.progress += step;
            if self.progress >= 1.0 {
                self.progress = 1.0;
                self.rising = false;
                self.wait = self.dwell;
            }
        } else {
            self.progress -= step;
            if self.progress <= 0.0 {
                self.progress = 0.0;
                self.rising = true;
                self.wait = self.dwell;
            }
        }
        self.center()
    }
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn_points: Vec::new(),
            platforms: Vec::new(),
        }
    }

    /// Test level with a piece of every surface the controller handles.
    pub fn test_arena() -> Self {
        let mut level = Self::new("test_arena", "Test Arena");

        // Floor
        level.collision.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            LayerMask::GROUND,
        );

        // Walls
        let wall_height = 5.0;
        let wall_thickness = 0.5;
        let arena_size = 50.0;

        for (center, half_extents) in [
            (
                Vec3::new(0.0, wall_height / 2.0, -arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            (
                Vec3::new(0.0, wall_height / 2.0, arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            (
                Vec3::new(arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
            (
                Vec3::new(-arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
        ] {
            level.collision.add_box(center, half_extents, LayerMask::DEFAULT);
        }

        // Walkable 30 degree ramp
        level.collision.add_oriented_box(
            Vec3::new(10.0, 0.0, -15.0),
            Vec3::new(4.0, 0.25, 3.0),
            Quat::from_rotation_z(30f32.to_radians()),
            LayerMask::GROUND,
        );

        // 60 degree ramp, too steep to stand on
        level.collision.add_oriented_box(
            Vec3::new(-10.0, 0.0, -15.0),
            Vec3::new(4.0, 0.25, 3.0),
            Quat::from_rotation_z(-60f32.to_radians()),
            LayerMask::GROUND,
        );

        // Crouch tunnel: roof underside at 1.7m
        level.collision.add_box(
            Vec3::new(0.0, 2.2, 20.0),
            Vec3::new(5.0, 0.5, 2.0),
            LayerMask::DEFAULT,
        );

        // Low step
        level.collision.add_box(
            Vec3::new(-20.0, 0.1, 15.0),
            Vec3::new(3.0, 0.1, 3.0),
            LayerMask::GROUND,
        );

        // Lift
        let low = Vec3::new(20.0, 0.25, 20.0);
        let high = low + Vec3::Y * 3.0;
        let lift = level
            .collision
            .add_kinematic_box(low, Vec3::new(2.0, 0.25, 2.0), LayerMask::GROUND);
        level
            .platforms
            .push(MovingPlatform::new(lift, low, high, 1.5, 1.0));

        // Spawn points
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(-20.0, 0.0, 0.0),
            facing: 0.0,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(20.0, 0.0, 0.0),
            facing: 180.0,
        });

        level
    }

    /// Get a player spawn point.
    pub fn get_player_spawn(&self, index: usize) -> Option<&SpawnPoint> {
        self.spawn_points.get(index)
    }

    /// Get the number of player spawn points.
    pub fn player_spawn_count(&self) -> usize {
        self.spawn_points.len()
    }

    /// Move every platform and its collider.
    pub fn update_platforms(&mut self, dt: f32) {
        for platform in &mut self.platforms {
            let center = platform.advance(dt);
            if !self.collision.set_brush_center(platform.collider, center) {
                log::warn!("platform collider {:?} is missing", platform.collider);
            }
        }
    }
}
