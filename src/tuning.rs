//! Data-driven game balance
//!
//! All values are per second (or per second squared). Spawn chances are
//! "probability per 60 Hz frame" and get rescaled to the actual step.

use serde::{Deserialize, Serialize};

/// Cube jumper balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JumperTuning {
    pub gravity: f32,
    /// Longest useful charge (seconds)
    pub max_charge: f32,
    /// Jump power gained over a full charge
    pub max_jump_power: f32,
    /// Jump power of an instant tap
    pub min_jump_power: f32,
    /// Horizontal speed per unit of jump power
    pub horizontal_per_power: f32,
    pub launch_vertical_speed: f32,
    pub platform_distance: (f32, f32),
    pub platform_height: (f32, f32),
    pub platform_size: (f32, f32),
    /// Platforms kept alive, oldest retired first
    pub platforms_kept: usize,
    pub fall_floor: f32,
    pub landing_base_points: u64,
    pub landing_combo_points: u64,
    /// Standing still longer than this breaks the combo (seconds)
    pub combo_window: f32,
}

impl Default for JumperTuning {
    fn default() -> Self {
        Self {
            gravity: 18.0,
            max_charge: 1.0,
            max_jump_power: 8.0,
            min_jump_power: 2.0,
            horizontal_per_power: 1.05,
            launch_vertical_speed: 6.0,
            platform_distance: (3.0, 7.0),
            platform_height: (-1.0, 1.0),
            platform_size: (2.0, 4.0),
            platforms_kept: 5,
            fall_floor: -20.0,
            landing_base_points: 10,
            landing_combo_points: 5,
            combo_window: 2.0,
        }
    }
}

/// Endless runner balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    pub lanes: [f32; 3],
    pub lane_speed: f32,
    pub start_speed: f32,
    pub acceleration: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub ground_y: f32,
    pub duck_y: f32,
    pub obstacle_chance: f32,
    pub obstacle_spawn_z: (f32, f32),
    pub coin_chance: f32,
    pub coin_spawn_z: (f32, f32),
    pub coin_y: f32,
    pub coin_bonus: f32,
    pub retire_behind: f32,
    pub lives: u8,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            lanes: [-3.0, 0.0, 3.0],
            lane_speed: 12.0,
            start_speed: 18.0,
            acceleration: 0.36,
            jump_speed: 24.0,
            gravity: 72.0,
            ground_y: 1.0,
            duck_y: 0.6,
            obstacle_chance: 0.01,
            obstacle_spawn_z: (-70.0, -50.0),
            coin_chance: 0.03,
            coin_spawn_z: (-50.0, -30.0),
            coin_y: 1.5,
            coin_bonus: 5.0,
            retire_behind: 5.0,
            lives: 1,
        }
    }
}

/// Space shooter balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub move_speed: f32,
    pub bounds: (f32, f32),
    pub fire_cooldown: f32,
    pub bullet_speed: f32,
    pub enemy_bullet_speed: f32,
    pub asteroid_chance: f32,
    pub asteroid_size: (f32, f32),
    pub asteroid_spawn_z: f32,
    pub asteroid_drift: f32,
    pub asteroid_speed: (f32, f32),
    pub enemy_base_chance: f32,
    pub enemy_chance_per_level: f32,
    pub enemy_spawn_z: f32,
    pub enemy_speed: f32,
    pub enemy_health: u8,
    pub enemy_fire_interval: f32,
    pub enemy_fire_chance: f32,
    pub crash_radius: f32,
    pub bullet_hit_radius: f32,
    pub asteroid_hit_points: u64,
    pub asteroid_destroy_points: u64,
    pub enemy_destroy_points: u64,
    pub points_per_level: u64,
    pub explosion_particles: usize,
    pub particle_speed: f32,
    pub retire_behind: f32,
    pub bullet_range: f32,
    pub lives: u8,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            move_speed: 18.0,
            bounds: (10.0, 8.0),
            fire_cooldown: 0.25,
            bullet_speed: 60.0,
            enemy_bullet_speed: 30.0,
            asteroid_chance: 0.02,
            asteroid_size: (0.5, 2.0),
            asteroid_spawn_z: -50.0,
            asteroid_drift: 3.0,
            asteroid_speed: (12.0, 30.0),
            enemy_base_chance: 0.005,
            enemy_chance_per_level: 0.002,
            enemy_spawn_z: -40.0,
            enemy_speed: 9.0,
            enemy_health: 2,
            enemy_fire_interval: 2.0,
            enemy_fire_chance: 0.02,
            crash_radius: 0.75,
            bullet_hit_radius: 1.0,
            asteroid_hit_points: 10,
            asteroid_destroy_points: 50,
            enemy_destroy_points: 100,
            points_per_level: 500,
            explosion_particles: 20,
            particle_speed: 15.0,
            retire_behind: 20.0,
            bullet_range: 60.0,
            lives: 3,
        }
    }
}

/// Checkpoint racing balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RacingTuning {
    pub acceleration: f32,
    pub max_speed: f32,
    /// Reverse speed limit as a fraction of `max_speed`
    pub reverse_ratio: f32,
    /// Speed multiplier per 60 Hz frame
    pub friction: f32,
    /// Heading change per unit travelled at full lock (radians)
    pub turn_rate: f32,
    /// Steering decay per 60 Hz frame when no input
    pub turn_decay: f32,
    /// Below this speed the car cannot steer
    pub min_steer_speed: f32,
    pub checkpoints: Vec<[f32; 3]>,
    pub checkpoint_radius: f32,
    pub par_time: f32,
    pub time_points: f32,
    pub checkpoint_points: u64,
}

impl Default for RacingTuning {
    fn default() -> Self {
        Self {
            acceleration: 72.0,
            max_speed: 90.0,
            reverse_ratio: 0.5,
            friction: 0.98,
            turn_rate: 0.05,
            turn_decay: 0.9,
            min_steer_speed: 6.0,
            checkpoints: vec![
                [10.0, 1.0, 0.0],
                [28.0, 1.0, 10.0],
                [15.0, 1.0, 33.0],
                [-10.0, 1.0, 25.0],
                [-18.0, 1.0, 8.0],
            ],
            checkpoint_radius: 3.0,
            par_time: 120.0,
            time_points: 10.0,
            checkpoint_points: 100,
        }
    }
}

/// Balance for every game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub jumper: JumperTuning,
    pub runner: RunnerTuning,
    pub shooter: ShooterTuning,
    pub racing: RacingTuning,
}

impl Tuning {
    /// Parse tuning overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json(r#"{"shooter": {"lives": 5}}"#).unwrap();
        assert_eq!(tuning.shooter.lives, 5);
        assert_eq!(tuning.shooter.enemy_health, 2);
        assert_eq!(tuning.runner.lanes, [-3.0, 0.0, 3.0]);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{not json").is_err());
    }
}
