use std::collections::HashSet;

use log::{debug, info};
use rand::rngs::StdRng;
use slotmap::{SlotMap, new_key_type};

use crate::config::GameConfig;
use crate::entities::{Asteroid, CircleBody, Controls, Player, Shot};
use crate::field::AsteroidField;
use crate::rendering::Renderer;
use crate::types::{Rgb, Vector2D};

new_key_type! {
    pub struct EntityKey;
}

/// Everything besides the player that lives in the arena.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Shot(Shot),
    Asteroid(Asteroid),
}

impl Entity {
    pub fn body(&self) -> &CircleBody {
        match self {
            Entity::Shot(shot) => &shot.body,
            Entity::Asteroid(asteroid) => &asteroid.body,
        }
    }

    pub fn update(&mut self, dt: f64) {
        match self {
            Entity::Shot(shot) => shot.update(dt),
            Entity::Asteroid(asteroid) => asteroid.update(dt),
        }
    }

    pub fn draw(&self, renderer: &mut impl Renderer, color: Rgb, line_width: u16) {
        match self {
            Entity::Shot(shot) => shot.draw(renderer, color, line_width),
            Entity::Asteroid(asteroid) => asteroid.draw(renderer, color, line_width),
        }
    }
}

/// Structural change deferred until no pass is walking the arena.
enum WorldCommand {
    Despawn(EntityKey),
    Spawn(Entity),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    GameOver,
}

pub struct World {
    player: Player,
    entities: SlotMap<EntityKey, Entity>,
    field: AsteroidField,
    rng: StdRng,
    pending: Vec<WorldCommand>,
    min_radius: f64,
    width: f64,
    height: f64,
    despawn_offscreen: bool,
}

impl World {
    pub fn new(config: &GameConfig, rng: StdRng) -> Self {
        let center = Vector2D::new(config.screen_width / 2.0, config.screen_height / 2.0);
        World {
            player: Player::new(center, config),
            entities: SlotMap::with_key(),
            field: AsteroidField::new(config),
            rng,
            pending: Vec::new(),
            min_radius: config.asteroid_min_radius,
            width: config.screen_width,
            height: config.screen_height,
            despawn_offscreen: config.despawn_offscreen,
        }
    }

    #[cfg(test)]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[cfg(test)]
    pub fn field(&self) -> &AsteroidField {
        &self.field
    }

    #[cfg(test)]
    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn asteroids(&self) -> impl Iterator<Item = (EntityKey, &Asteroid)> {
        self.entities.iter().filter_map(|(key, entity)| match entity {
            Entity::Asteroid(asteroid) => Some((key, asteroid)),
            Entity::Shot(_) => None,
        })
    }

    pub fn shots(&self) -> impl Iterator<Item = (EntityKey, &Shot)> {
        self.entities.iter().filter_map(|(key, entity)| match entity {
            Entity::Shot(shot) => Some((key, shot)),
            Entity::Asteroid(_) => None,
        })
    }

    pub fn asteroid_count(&self) -> usize {
        self.asteroids().count()
    }

    pub fn shot_count(&self) -> usize {
        self.shots().count()
    }

    /// Player, arena entities and the spawner.
    #[cfg(test)]
    pub fn updatable_count(&self) -> usize {
        self.entities.len() + 2
    }

    /// Player and arena entities.
    #[cfg(test)]
    pub fn drawable_count(&self) -> usize {
        self.entities.len() + 1
    }

    pub fn spawn(&mut self, entity: Entity) -> EntityKey {
        self.entities.insert(entity)
    }

    /// Runs one simulation frame: movement, firing, shot hits, then the
    /// player check.
    pub fn step(&mut self, dt: f64, controls: &Controls) -> FrameOutcome {
        self.advance(dt, controls);

        if controls.fire {
            self.fire();
        }

        self.resolve_shot_hits();

        if self.despawn_offscreen {
            self.despawn_offscreen_entities();
        }

        if self.player_hit() {
            let position = self.player.body.position;
            info!(
                "Game over! Player hit at ({:.1}, {:.1}) with {} asteroids and {} shots live",
                position.x,
                position.y,
                self.asteroid_count(),
                self.shot_count()
            );
            return FrameOutcome::GameOver;
        }
        FrameOutcome::Continue
    }

    fn advance(&mut self, dt: f64, controls: &Controls) {
        self.player.update(dt, controls);
        for (_, entity) in self.entities.iter_mut() {
            entity.update(dt);
        }
        // Newly spawned asteroids start moving next frame.
        if let Some(asteroid) = self.field.update(dt, &mut self.rng) {
            self.spawn(Entity::Asteroid(asteroid));
        }
    }

    fn fire(&mut self) {
        if let Some(shot) = self.player.shoot() {
            self.spawn(Entity::Shot(shot));
        }
    }

    /// Read-only scan over every asteroid/shot pair, then one batch of
    /// removals and fragment insertions.
    fn resolve_shot_hits(&mut self) {
        let shots: Vec<(EntityKey, CircleBody)> =
            self.shots().map(|(key, shot)| (key, shot.body)).collect();
        let mut spent: HashSet<EntityKey> = HashSet::new();
        let mut destroyed: Vec<EntityKey> = Vec::new();

        for (asteroid_key, asteroid) in self.asteroids() {
            let mut hit = false;
            for (shot_key, shot) in &shots {
                if spent.contains(shot_key) || !shot.overlaps(&asteroid.body) {
                    continue;
                }
                spent.insert(*shot_key);
                hit = true;
            }
            if hit {
                destroyed.push(asteroid_key);
            }
        }

        for shot_key in spent {
            self.pending.push(WorldCommand::Despawn(shot_key));
        }
        for asteroid_key in destroyed {
            self.queue_split(asteroid_key);
        }
        self.apply_pending();
    }

    fn queue_split(&mut self, key: EntityKey) {
        let asteroid = match self.entities.get(key) {
            Some(Entity::Asteroid(asteroid)) => *asteroid,
            _ => return,
        };

        self.pending.push(WorldCommand::Despawn(key));
        if let Some(fragments) = asteroid.split(self.min_radius, &mut self.rng) {
            for fragment in fragments {
                self.pending.push(WorldCommand::Spawn(Entity::Asteroid(fragment)));
            }
        }
    }

    fn apply_pending(&mut self) {
        for command in std::mem::take(&mut self.pending) {
            match command {
                WorldCommand::Despawn(key) => {
                    self.entities.remove(key);
                }
                WorldCommand::Spawn(entity) => {
                    self.entities.insert(entity);
                }
            }
        }
    }

    fn despawn_offscreen_entities(&mut self) {
        let margin = self.field.max_radius();
        let (width, height) = (self.width, self.height);
        let before = self.entities.len();

        self.entities.retain(|_, entity| {
            let body = entity.body();
            let reach = margin + body.radius;
            (-reach..=width + reach).contains(&body.position.x)
                && (-reach..=height + reach).contains(&body.position.y)
        });

        let removed = before - self.entities.len();
        if removed > 0 {
            debug!("Despawned {} off-screen entities", removed);
        }
    }

    fn player_hit(&self) -> bool {
        self.asteroids().any(|(_, asteroid)| asteroid.body.overlaps(&self.player.body))
    }

    pub fn draw(
        &self,
        renderer: &mut impl Renderer,
        background: Rgb,
        foreground: Rgb,
        line_width: u16,
    ) {
        renderer.clear(background);
        self.player.draw(renderer, foreground, line_width);
        for (_, entity) in &self.entities {
            entity.draw(renderer, foreground, line_width);
        }
    }
}
