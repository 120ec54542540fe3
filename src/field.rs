//! Timed asteroid spawner. Every `spawn_interval` seconds a new asteroid
//! appears just beyond one of the four screen edges, drifting inward.

use log::debug;
use rand::Rng;

use crate::config::GameConfig;
use crate::constants::*;
use crate::entities::Asteroid;
use crate::types::Vector2D;

/// Screen side an asteroid enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] =
        [SpawnEdge::Left, SpawnEdge::Right, SpawnEdge::Top, SpawnEdge::Bottom];

    /// Unit direction pointing into the playfield.
    pub fn inward(self) -> Vector2D {
        match self {
            SpawnEdge::Left => Vector2D::new(1.0, 0.0),
            SpawnEdge::Right => Vector2D::new(-1.0, 0.0),
            SpawnEdge::Top => Vector2D::new(0.0, 1.0),
            SpawnEdge::Bottom => Vector2D::new(0.0, -1.0),
        }
    }

    /// Maps `t` in [0, 1] along the edge, pushed `margin` units off-screen.
    pub fn point(self, t: f64, width: f64, height: f64, margin: f64) -> Vector2D {
        match self {
            SpawnEdge::Left => Vector2D::new(-margin, t * height),
            SpawnEdge::Right => Vector2D::new(width + margin, t * height),
            SpawnEdge::Top => Vector2D::new(t * width, -margin),
            SpawnEdge::Bottom => Vector2D::new(t * width, height + margin),
        }
    }
}

pub struct AsteroidField {
    elapsed: f64,
    spawn_interval: f64,
    min_radius: f64,
    max_radius: f64,
    kinds: u32,
    width: f64,
    height: f64,
}

impl AsteroidField {
    pub fn new(config: &GameConfig) -> Self {
        AsteroidField {
            elapsed: 0.0,
            spawn_interval: config.asteroid_spawn_interval,
            min_radius: config.asteroid_min_radius,
            max_radius: config.asteroid_max_radius(),
            kinds: config.asteroid_kinds,
            width: config.screen_width,
            height: config.screen_height,
        }
    }

    #[cfg(test)]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Largest tier's radius; spawns sit this far outside the screen.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Advances the spawn timer, returning a fresh asteroid once the
    /// interval has been strictly exceeded.
    pub fn update(&mut self, dt: f64, rng: &mut impl Rng) -> Option<Asteroid> {
        self.elapsed += dt;
        if self.elapsed <= self.spawn_interval {
            return None;
        }
        self.elapsed = 0.0;

        let edge = SpawnEdge::ALL[rng.gen_range(0..SpawnEdge::ALL.len())];
        Some(self.spawn_from(edge, rng))
    }

    pub fn spawn_from(&self, edge: SpawnEdge, rng: &mut impl Rng) -> Asteroid {
        let speed = rng.gen_range(ASTEROID_SPAWN_MIN_SPEED..=ASTEROID_SPAWN_MAX_SPEED) as f64;
        let jitter = ASTEROID_SPAWN_JITTER_DEGREES;
        let jitter = rng.gen_range(-jitter..=jitter) as f64;
        let velocity = edge.inward().scale(speed).rotate_degrees(jitter);
        let along = rng.gen_range(0.0..=1.0);
        let position = edge.point(along, self.width, self.height, self.max_radius);
        let tier = rng.gen_range(1..=self.kinds);
        let radius = self.min_radius * tier as f64;

        debug!(
            "Spawning tier {} asteroid from {:?} at ({:.1}, {:.1}), speed {}",
            tier, edge, position.x, position.y, speed
        );
        Asteroid::new(position, radius, velocity)
    }
}
