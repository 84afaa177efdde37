//! Cube jumper: charge a jump, leap to the next platform, don't fall

use glam::Vec3;

use super::end_run;
use crate::sim::collision::is_landing;
use crate::sim::entity::{EntityBody, EntityId, EntityKind};
use crate::sim::kinematics::{below_world, step_entities, step_player};
use crate::sim::session::Terminal;
use crate::sim::state::GameState;
use crate::sim::tick::{FrameInput, GameEvent};

/// Height of the cube's center above a platform's center when standing
pub const STANDING_OFFSET: f32 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JumperState {
    /// Platform the player stands on (or jumped from)
    pub current: Option<EntityId>,
    /// Target platform
    pub next: Option<EntityId>,
    /// Seconds the jump button has been held
    pub charge: f32,
    /// Seconds spent standing since the last landing
    pub grounded_time: f32,
}

fn mode(mode: &mut super::GameMode) -> &mut JumperState {
    match mode {
        super::GameMode::CubeJumper(m) => m,
        _ => unreachable!("jumper rules on a non-jumper state"),
    }
}

pub fn setup(state: &mut GameState) {
    let t = &state.tuning.jumper;
    let size = state.spawner.range(t.platform_size.0, t.platform_size.1);
    let start = state
        .entities
        .spawn(Vec3::ZERO, Vec3::ZERO, EntityBody::Platform { size });
    state.player.pos = Vec3::new(0.0, STANDING_OFFSET, 0.0);
    let m = mode(&mut state.mode);
    m.current = start;
    m.next = None;
    spawn_next_platform(state);
}

/// Lead-distance rule: the next platform sits a random distance away at a
/// random bearing, slightly above or below the current one
fn spawn_next_platform(state: &mut GameState) {
    let current = mode(&mut state.mode).current;
    let origin = current
        .and_then(|id| state.entities.get(id))
        .map(|p| p.pos)
        .unwrap_or(Vec3::ZERO);

    let t = &state.tuning.jumper;
    let (dist, height, size) = (t.platform_distance, t.platform_height, t.platform_size);
    let distance = state.spawner.range(dist.0, dist.1);
    let bearing = state.spawner.range(0.0, std::f32::consts::TAU);
    let rise = state.spawner.range(height.0, height.1);
    let size = state.spawner.range(size.0, size.1);

    let pos = origin + Vec3::new(bearing.cos() * distance, rise, bearing.sin() * distance);
    let next = state
        .entities
        .spawn(pos, Vec3::ZERO, EntityBody::Platform { size });
    mode(&mut state.mode).next = next;

    // Retire the oldest platforms beyond the keep limit
    let kept = state.tuning.jumper.platforms_kept.max(2);
    while state.entities.count(EntityKind::Platform) > kept {
        let Some(oldest) = state.entities.first_of(EntityKind::Platform).map(|e| e.id) else {
            break;
        };
        state.entities.remove(oldest);
    }
}

fn launch(state: &mut GameState) {
    let t = state.tuning.jumper.clone();
    let (charge, next) = {
        let m = mode(&mut state.mode);
        (m.charge, m.next)
    };
    let target = next
        .and_then(|id| state.entities.get(id))
        .map(|p| p.pos);
    let Some(target) = target else {
        return;
    };

    let power = (charge / t.max_charge).clamp(0.0, 1.0) * t.max_jump_power + t.min_jump_power;
    let mut dir = target - state.player.pos;
    dir.y = 0.0;
    let dir = dir.normalize_or_zero();

    state.player.vel = dir * power * t.horizontal_per_power;
    state.player.vel.y = t.launch_vertical_speed;
    state.player.mode.airborne = true;
    state.player.mode.charging = false;
    mode(&mut state.mode).charge = 0.0;
    log::debug!("Jump with power {:.2}", power);
}

fn land(state: &mut GameState, platform: EntityId, scoring: bool, events: &mut Vec<GameEvent>) {
    let Some(top) = state.entities.get(platform).map(|p| p.pos.y) else {
        return;
    };
    state.player.pos.y = top + STANDING_OFFSET;
    state.player.vel = Vec3::ZERO;
    state.player.mode.airborne = false;
    mode(&mut state.mode).grounded_time = 0.0;

    if !scoring {
        state.session.reset_combo();
        return;
    }

    let t = &state.tuning.jumper;
    let points = t.landing_base_points + state.session.combo as u64 * t.landing_combo_points;
    state.session.add_score(points);
    state.session.bump_combo();
    events.push(GameEvent::Landed { platform, points });

    mode(&mut state.mode).current = Some(platform);
    spawn_next_platform(state);
}

pub fn step(state: &mut GameState, input: &FrameInput, dt: f32, events: &mut Vec<GameEvent>) {
    let t = state.tuning.jumper.clone();

    // Controls: hold to charge, release to jump
    if !state.player.mode.airborne {
        let m = mode(&mut state.mode);
        m.grounded_time += dt;
        let stalled = m.grounded_time > t.combo_window;
        if input.jump {
            m.charge = (m.charge + dt).min(t.max_charge);
            state.player.mode.charging = true;
        } else if state.player.mode.charging {
            launch(state);
        }
        if stalled {
            state.session.reset_combo();
        }
    }

    // Integrate
    step_player(&mut state.player, t.gravity, dt);
    step_entities(&mut state.entities, dt);

    if !state.player.mode.airborne {
        return;
    }

    if below_world(state.player.pos, t.fall_floor) {
        end_run(state, Terminal::GameOver, events);
        return;
    }

    // Landing: the target platform scores, the take-off platform only catches
    let (current, next) = {
        let m = mode(&mut state.mode);
        (m.current, m.next)
    };
    for (platform, scoring) in [(next, true), (current, false)] {
        let Some(id) = platform else { continue };
        let Some((pos, size)) = state.entities.get(id).and_then(|e| match e.body {
            EntityBody::Platform { size } => Some((e.pos, size)),
            _ => None,
        }) else {
            continue;
        };
        // Measured from the cube center, like the landing snap
        if is_landing(state.player.pos, state.player.vel, pos, size) {
            land(state, id, scoring, events);
            break;
        }
    }
}
