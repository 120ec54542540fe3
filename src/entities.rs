use log::debug;
use rand::Rng;

use crate::config::GameConfig;
use crate::constants::*;
use crate::rendering::Renderer;
use crate::types::{Rgb, Vector2D};

// --- Shared circle geometry ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleBody {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub radius: f64,
}

impl CircleBody {
    pub fn new(position: Vector2D, radius: f64) -> Self {
        CircleBody { position, velocity: Vector2D::ZERO, radius: radius.max(0.0) }
    }

    pub fn with_velocity(mut self, velocity: Vector2D) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn update(&mut self, dt: f64) {
        self.position = self.position.add(self.velocity.scale(dt));
    }

    /// Touching circles count as overlapping.
    pub fn overlaps(&self, other: &CircleBody) -> bool {
        self.position.distance_to(other.position) <= self.radius + other.radius
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Left,  // Counter-clockwise
    Right, // Clockwise
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Thrust {
    Forward,
    Back,
}

/// Held-key snapshot for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust_forward: bool,
    pub thrust_back: bool,
    pub fire: bool,
}

// --- Player ship ---
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: CircleBody,
    pub heading: f64, // Degrees
    pub shoot_cooldown_remaining: f64,
    pub turn_speed: f64,
    pub move_speed: f64,
    pub shot_radius: f64,
    pub shot_speed: f64,
    pub shoot_cooldown: f64,
}

impl Player {
    pub fn new(position: Vector2D, config: &GameConfig) -> Self {
        // A full cooldown at start delays the first shot by one interval.
        let initial_cooldown = if config.shot_ready_at_start { 0.0 } else { config.shot_cooldown };
        Player {
            body: CircleBody::new(position, config.player_radius),
            heading: 0.0,
            shoot_cooldown_remaining: initial_cooldown,
            turn_speed: config.player_turn_speed,
            move_speed: config.player_speed,
            shot_radius: config.shot_radius,
            shot_speed: config.shot_speed,
            shoot_cooldown: config.shot_cooldown,
        }
    }

    pub fn forward(&self) -> Vector2D {
        Vector2D::from_heading(self.heading)
    }

    pub fn turn(&mut self, direction: Turn, dt: f64) {
        let sign = match direction {
            Turn::Left => -1.0,
            Turn::Right => 1.0,
        };
        self.heading += self.turn_speed * sign * dt;
    }

    pub fn thrust(&mut self, direction: Thrust, dt: f64) {
        let sign = match direction {
            Thrust::Forward => 1.0,
            Thrust::Back => -1.0,
        };
        let step = self.forward().scale(self.move_speed * sign * dt);
        self.body.position = self.body.position.add(step);
    }

    pub fn update(&mut self, dt: f64, controls: &Controls) {
        self.shoot_cooldown_remaining -= dt;

        if controls.turn_left {
            self.turn(Turn::Left, dt);
        }
        if controls.turn_right {
            self.turn(Turn::Right, dt);
        }
        if controls.thrust_forward {
            self.thrust(Thrust::Forward, dt);
        }
        if controls.thrust_back {
            self.thrust(Thrust::Back, dt);
        }
    }

    pub fn can_shoot(&self) -> bool {
        self.shoot_cooldown_remaining <= 0.0
    }

    /// Fires one shot along the current heading if the cooldown has run out.
    /// The cooldown is topped up rather than reset, so leftover time carries over.
    pub fn shoot(&mut self) -> Option<Shot> {
        if !self.can_shoot() {
            return None;
        }
        self.shoot_cooldown_remaining += self.shoot_cooldown;
        let velocity = self.forward().scale(self.shot_speed);
        Some(Shot::new(self.body.position, self.shot_radius, velocity))
    }

    /// Tip followed by the two rear corners. Render-only; collisions use the circle.
    pub fn silhouette(&self) -> [Vector2D; 3] {
        let forward = self.forward();
        let right = Vector2D::from_heading(self.heading + 90.0).scale(self.body.radius / 1.5);
        let position = self.body.position;
        let back = position.sub(forward.scale(self.body.radius));
        [
            position.add(forward.scale(self.body.radius)),
            back.sub(right),
            back.add(right),
        ]
    }

    pub fn draw(&self, renderer: &mut impl Renderer, color: Rgb, line_width: u16) {
        renderer.draw_polygon_outline(&self.silhouette(), color, line_width);
    }
}

// --- Shot ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub body: CircleBody,
}

impl Shot {
    pub fn new(position: Vector2D, radius: f64, velocity: Vector2D) -> Self {
        Shot { body: CircleBody::new(position, radius).with_velocity(velocity) }
    }

    pub fn update(&mut self, dt: f64) {
        self.body.update(dt);
    }

    pub fn draw(&self, renderer: &mut impl Renderer, color: Rgb, line_width: u16) {
        renderer.draw_circle_outline(self.body.position, self.body.radius, color, line_width);
    }
}

// --- Asteroid ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Asteroid {
    pub body: CircleBody,
}

impl Asteroid {
    pub fn new(position: Vector2D, radius: f64, velocity: Vector2D) -> Self {
        Asteroid { body: CircleBody::new(position, radius).with_velocity(velocity) }
    }

    pub fn update(&mut self, dt: f64) {
        self.body.update(dt);
    }

    /// Fragments left behind when this asteroid is destroyed. Asteroids at or
    /// below `min_radius` leave nothing; larger ones break into two pieces one
    /// tier smaller, deflected symmetrically off the parent's heading and sped up.
    pub fn split(&self, min_radius: f64, rng: &mut impl Rng) -> Option<[Asteroid; 2]> {
        if self.body.radius <= min_radius {
            return None;
        }

        let angle = rng.gen_range(ASTEROID_SPLIT_MIN_ANGLE..=ASTEROID_SPLIT_MAX_ANGLE);
        let radius = self.body.radius - min_radius;
        let position = self.body.position;
        let left = self.body.velocity.rotate_degrees(angle).scale(ASTEROID_SPLIT_SPEEDUP);
        let right = self.body.velocity.rotate_degrees(-angle).scale(ASTEROID_SPLIT_SPEEDUP);

        debug!(
            "Split asteroid r={} at ({:.1}, {:.1}) by ±{:.1}°",
            self.body.radius, position.x, position.y, angle
        );
        Some([Asteroid::new(position, radius, left), Asteroid::new(position, radius, right)])
    }

    pub fn draw(&self, renderer: &mut impl Renderer, color: Rgb, line_width: u16) {
        renderer.draw_circle_outline(self.body.position, self.body.radius, color, line_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn circle(x: f64, y: f64, radius: f64) -> CircleBody {
        CircleBody::new(Vector2D::new(x, y), radius)
    }

    fn player() -> Player {
        Player::new(Vector2D::new(640.0, 360.0), &GameConfig::default())
    }

    #[test]
    fn overlap_is_symmetric_and_inclusive() {
        let a = circle(0.0, 0.0, 10.0);
        let touching = circle(25.0, 0.0, 15.0);
        let apart = circle(25.1, 0.0, 15.0);

        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(!a.overlaps(&apart));
        assert!(!apart.overlaps(&a));
    }

    #[test]
    fn body_moves_by_velocity_times_dt() {
        let mut body = circle(10.0, 10.0, 1.0).with_velocity(Vector2D::new(30.0, -60.0));
        body.update(0.5);
        assert_abs_diff_eq!(body.position.x, 25.0);
        assert_abs_diff_eq!(body.position.y, -20.0);
    }

    #[test]
    fn negative_radius_is_clamped() {
        assert_eq!(circle(0.0, 0.0, -3.0).radius, 0.0);
    }

    #[test]
    fn split_large_asteroid_yields_two_smaller_fragments() {
        let parent = Asteroid::new(Vector2D::new(100.0, 100.0), 60.0, Vector2D::new(50.0, 0.0));
        let mut rng = StdRng::seed_from_u64(11);

        let [a, b] = parent.split(20.0, &mut rng).expect("large asteroid splits");

        for fragment in [a, b] {
            assert_eq!(fragment.body.radius, 40.0);
            assert_eq!(fragment.body.position, Vector2D::new(100.0, 100.0));
            assert_relative_eq!(fragment.body.velocity.length(), 60.0, epsilon = 1e-9);
        }

        // Mirror images about the parent's heading (+x here).
        assert_abs_diff_eq!(a.body.velocity.x, b.body.velocity.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.body.velocity.y, -b.body.velocity.y, epsilon = 1e-9);

        let deflection = a.body.velocity.y.atan2(a.body.velocity.x).to_degrees().abs();
        let allowed = ASTEROID_SPLIT_MIN_ANGLE - 1e-9..=ASTEROID_SPLIT_MAX_ANGLE + 1e-9;
        assert!(allowed.contains(&deflection));
    }

    #[test]
    fn split_smallest_asteroid_leaves_nothing() {
        let parent = Asteroid::new(Vector2D::new(5.0, 5.0), 20.0, Vector2D::new(0.0, 40.0));
        let mut rng = StdRng::seed_from_u64(3);
        assert!(parent.split(20.0, &mut rng).is_none());
    }

    #[test]
    fn first_shot_waits_one_cooldown() {
        let mut player = player();
        assert!(player.shoot().is_none());

        player.update(PLAYER_SHOOT_COOLDOWN, &Controls::default());
        assert!(player.shoot().is_some());
    }

    #[test]
    fn shot_ready_at_start_skips_the_initial_delay() {
        let config = GameConfig { shot_ready_at_start: true, ..GameConfig::default() };
        let mut player = Player::new(Vector2D::ZERO, &config);
        assert!(player.shoot().is_some());
    }

    #[test]
    fn second_shot_inside_cooldown_is_ignored() {
        let mut player = player();
        player.shoot_cooldown_remaining = 0.0;

        let shot = player.shoot().expect("cooldown elapsed");
        assert_eq!(shot.body.position, player.body.position);
        assert_relative_eq!(shot.body.velocity.length(), PLAYER_SHOOT_SPEED);

        player.update(PLAYER_SHOOT_COOLDOWN / 2.0, &Controls::default());
        assert!(player.shoot().is_none());
    }

    #[test]
    fn cooldown_is_additive() {
        let mut player = player();
        player.shoot_cooldown_remaining = -0.1;
        player.shoot().expect("cooldown elapsed");
        let expected = PLAYER_SHOOT_COOLDOWN - 0.1;
        assert_abs_diff_eq!(player.shoot_cooldown_remaining, expected, epsilon = 1e-12);
    }

    #[test]
    fn turning_left_and_right_cancel_out() {
        let mut player = player();
        let controls = Controls { turn_left: true, turn_right: true, ..Controls::default() };
        player.update(0.25, &controls);
        assert_abs_diff_eq!(player.heading, 0.0);

        player.update(0.1, &Controls { turn_left: true, ..Controls::default() });
        assert_abs_diff_eq!(player.heading, -30.0, epsilon = 1e-9);
    }

    #[test]
    fn thrust_moves_along_heading() {
        let mut player = player();
        player.heading = 90.0;
        player.update(0.5, &Controls { thrust_forward: true, ..Controls::default() });
        // Heading 90° points along -x.
        assert_abs_diff_eq!(player.body.position.x, 540.0, epsilon = 1e-9);
        assert_abs_diff_eq!(player.body.position.y, 360.0, epsilon = 1e-9);

        player.update(0.5, &Controls { thrust_back: true, ..Controls::default() });
        assert_abs_diff_eq!(player.body.position.x, 640.0, epsilon = 1e-9);
    }

    #[test]
    fn silhouette_tip_leads_by_radius() {
        let player = player();
        let [tip, left, right] = player.silhouette();
        assert_eq!(tip, Vector2D::new(640.0, 380.0));
        assert_abs_diff_eq!(left.y, 340.0, epsilon = 1e-9);
        assert_abs_diff_eq!(right.y, 340.0, epsilon = 1e-9);
        assert_abs_diff_eq!((left.x - right.x).abs(), 2.0 * PLAYER_RADIUS / 1.5, epsilon = 1e-9);
    }
}
