use crate::types::Rgb;

// --- Screen Settings ---
pub const SCREEN_WIDTH: f64 = 1280.0; // World units
pub const SCREEN_HEIGHT: f64 = 720.0;

// --- Asteroid Settings ---
pub const ASTEROID_MIN_RADIUS: f64 = 20.0;
pub const ASTEROID_KINDS: u32 = 3; // Size tiers: radius = tier * ASTEROID_MIN_RADIUS
pub const ASTEROID_SPAWN_RATE: f64 = 0.8; // Seconds between spawns
pub const ASTEROID_SPAWN_MIN_SPEED: u32 = 40;
pub const ASTEROID_SPAWN_MAX_SPEED: u32 = 100;
pub const ASTEROID_SPAWN_JITTER_DEGREES: i32 = 30;
pub const ASTEROID_SPLIT_MIN_ANGLE: f64 = 20.0; // Degrees
pub const ASTEROID_SPLIT_MAX_ANGLE: f64 = 50.0;
pub const ASTEROID_SPLIT_SPEEDUP: f64 = 1.2;

// --- Player Settings ---
pub const PLAYER_RADIUS: f64 = 20.0;
pub const PLAYER_TURN_SPEED: f64 = 300.0; // Degrees per second
pub const PLAYER_SPEED: f64 = 200.0; // Units per second

// --- Shot Settings ---
pub const SHOT_RADIUS: f64 = 5.0;
pub const PLAYER_SHOOT_SPEED: f64 = 500.0;
pub const PLAYER_SHOOT_COOLDOWN: f64 = 0.3; // Seconds

// --- Game Loop ---
pub const FRAME_RATE: u32 = 60;
// Held-key emulation for terminals without release events. A single press is
// held until auto-repeat would have started; after that each repeat refreshes
// a shorter hold.
pub const KEY_REPEAT_DELAY_MS: u64 = 600;
pub const KEY_HOLD_TIMEOUT_MS: u64 = 150;

// --- Visual Settings ---
pub const BACKGROUND_COLOR: Rgb = Rgb::BLACK;
pub const ASSET_COLOR: Rgb = Rgb::WHITE;
pub const LINE_WIDTH: u16 = 2;

// --- Headless Mode ---
pub const DEBUG_COLUMNS: u16 = 80;
pub const DEBUG_ROWS: u16 = 24;
pub const DEBUG_MAX_FRAMES: u64 = 120;

pub const LOG_FILE: &str = "asteroid-field.log";
