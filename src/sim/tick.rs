//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::boss::BossHit;
use super::cutscene::CutsceneId;
use super::enemy::EnemyHit;
use super::jammer::JammerHit;
use super::level::PLATFORMS;
use super::particles::{ParticleKind, spawn_burst, update_particles};
use super::rhythm::{InputOutcome, RhythmEvent, combo_multiplier};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Horizontal movement (-1 left .. 1 right)
    pub move_x: f32,
    pub jump: bool,
    pub attack: bool,
    /// Toggle rhythm mode
    pub toggle_rhythm: bool,
    /// Pause toggle
    pub pause: bool,
    /// Skip cutscene / tutorial
    pub skip: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.set_phase(GamePhase::Paused);
                return;
            }
            GamePhase::Paused => state.set_phase(GamePhase::Playing),
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver | GamePhase::Victory => return,
        GamePhase::Cutscene => {
            run_cutscene(state, input, dt);
            return;
        }
        GamePhase::Playing => {}
    }

    let first_event = state.events.len();
    state.time_ticks += 1;
    let time_secs = state.time_ticks as f32 * SIM_DT;

    // Decay screen shake
    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    if input.skip && state.tutorial.is_active() {
        state.tutorial.skip();
    }

    // Player movement
    let min_x = if state.boss_triggered { BOSS_ARENA_MIN_X } else { 0.0 };
    let max_x = state.jammer.barrier_x().unwrap_or(LEVEL_WIDTH);
    state.player.tick_timers(dt);
    let report = state
        .player
        .step(input.move_x, input.jump, dt, &PLATFORMS, min_x, max_x);
    if report.jumped {
        state.push_event(GameEvent::PlayerJumped);
    }

    // Rhythm mode toggle and beat clock
    if input.toggle_rhythm {
        let on = !state.rhythm.is_active();
        state.rhythm.toggle(on);
        state.push_event(GameEvent::RhythmToggled { on });
    }
    for event in state.rhythm.advance(dt) {
        match event {
            RhythmEvent::Beat { index, establishing } => {
                state.push_event(GameEvent::Beat { index, establishing });
            }
            RhythmEvent::TempoEstablished => state.push_event(GameEvent::TempoEstablished),
        }
    }

    if input.attack && state.player.can_attack() {
        start_attack(state);
    }
    resolve_attack(state);

    update_enemies(state, dt, time_secs);
    update_jammer(state, dt);
    update_boss(state, dt);
    collect_fragments(state);
    update_camera(state, dt);
    update_particles(&mut state.particles, dt);
    observe_progress(state, first_event);
    handle_death(state);

    // Ensure deterministic ordering
    state.normalize_order();
}

fn run_cutscene(state: &mut GameState, input: &TickInput, dt: f32) {
    let Some(scene) = state.cutscene.as_mut() else {
        state.set_phase(GamePhase::Playing);
        return;
    };
    if input.skip {
        scene.skip();
    }
    if !scene.advance(dt) {
        return;
    }

    let id = scene.id;
    state.cutscene = None;
    state.push_event(GameEvent::CutsceneFinished { id });
    match id {
        CutsceneId::Intro | CutsceneId::BossIntro => state.set_phase(GamePhase::Playing),
        CutsceneId::Outro => {
            state.set_phase(GamePhase::Victory);
            state.push_event(GameEvent::Victory);
        }
    }
}

/// Judge the input (in rhythm mode) and open a swing
fn start_attack(state: &mut GameState) {
    let origin = state.player.center();
    let tick = state.time_ticks;

    let grade = match state.rhythm.register_input(state.input_offset_ms) {
        InputOutcome::Judged(judgement) => {
            if judgement.grade.is_hit() {
                state.score += judgement.points;
                state.push_event(GameEvent::RhythmHit {
                    grade: judgement.grade,
                    combo: judgement.combo,
                    points: judgement.points,
                });
            } else {
                state.push_event(GameEvent::RhythmMiss {
                    combo_lost: judgement.combo_lost,
                });
            }
            spawn_burst(&mut state.particles, origin, judgement.grade.into(), 10, tick);
            Some(judgement.grade)
        }
        InputOutcome::Inactive | InputOutcome::NotReady => None,
    };

    let attack = state.player.begin_attack(grade);
    state.push_event(GameEvent::AttackStarted {
        on_beat: attack.is_on_beat(),
    });
}

/// Apply the active swing to everything it overlaps
fn resolve_attack(state: &mut GameState) {
    let (Some(hitbox), Some(attack)) = (state.player.attack_hitbox(), state.player.attack) else {
        return;
    };
    let tick = state.time_ticks;
    let multiplier = combo_multiplier(state.rhythm.combo);

    // Enemies (deferred to avoid borrow issues)
    let mut hits = Vec::new();
    let mut kills = Vec::new();
    for enemy in &mut state.enemies {
        if enemy.is_dead() || !hitbox.overlaps(&enemy.body()) {
            continue;
        }
        match enemy.take_hit(&attack) {
            EnemyHit::Ignored => {}
            EnemyHit::Damaged => hits.push((enemy.id, enemy.body().center())),
            EnemyHit::Killed => kills.push((enemy.id, enemy.kind, enemy.body().center())),
        }
    }
    for (id, pos) in hits {
        state.push_event(GameEvent::EnemyHit { id });
        spawn_burst(&mut state.particles, pos, ParticleKind::Spark, 6, tick + id as u64);
    }
    for (id, kind, pos) in kills {
        let points = (ENEMY_KILL_POINTS as f64 * multiplier).round() as u64;
        state.score += points;
        state.push_event(GameEvent::EnemyKilled { id, kind, points });
        spawn_burst(&mut state.particles, pos, ParticleKind::Debris, 16, tick + id as u64);
        state.shake(0.2);
    }
    state.enemies.retain(|e| !e.is_dead());

    // Jammer
    if state.jammer.is_active() && hitbox.overlaps(&state.jammer.body()) {
        let center = state.jammer.body().center();
        match state.jammer.take_hit(&attack) {
            JammerHit::Ignored => {}
            JammerHit::Deflected => {
                state.push_event(GameEvent::JammerDeflected);
                spawn_burst(&mut state.particles, center, ParticleKind::Spark, 4, tick);
            }
            JammerHit::Damaged { remaining } => {
                state.push_event(GameEvent::JammerHit { remaining });
                spawn_burst(&mut state.particles, center, ParticleKind::Data, 12, tick);
                state.shake(0.15);
            }
            JammerHit::Destroyed => {
                state.score += JAMMER_POINTS;
                state.push_event(GameEvent::JammerDestroyed);
                spawn_burst(&mut state.particles, center, ParticleKind::Data, 48, tick);
                state.reach_checkpoint(1);
                state.shake(0.6);
            }
        }
    }

    // Boss
    if state.boss.is_engaged() && hitbox.overlaps(&state.boss.body()) {
        let center = state.boss.center();
        match state.boss.take_hit(&attack) {
            BossHit::Ignored => {}
            BossHit::Damaged { remaining, .. } => {
                state.push_event(GameEvent::BossHit { remaining });
                spawn_burst(&mut state.particles, center, ParticleKind::Spark, 10, tick);
                state.shake(0.15);
            }
            BossHit::Defeated => {
                state.score += BOSS_POINTS;
                state.projectiles.clear();
                state.push_event(GameEvent::BossDefeated);
                spawn_burst(&mut state.particles, center, ParticleKind::Debris, 64, tick);
                state.shake(1.0);
                state.start_cutscene(CutsceneId::Outro);
            }
        }
    }
}

/// Damage the player from a source at `from_x`
fn damage_player(state: &mut GameState, amount: i32, from_x: f32) {
    if state.player.apply_damage(amount, from_x) {
        let health = state.player.health;
        state.push_event(GameEvent::PlayerDamaged { amount, health });
        state.shake(0.3);
    }
}

fn update_enemies(state: &mut GameState, dt: f32, time_secs: f32) {
    let player_center = state.player.center();
    let player_body = state.player.body();

    let mut contacts = Vec::new();
    for enemy in &mut state.enemies {
        enemy.update(dt, time_secs, player_center);
        if enemy.awake && enemy.body().overlaps(&player_body) {
            contacts.push(enemy.pos.x);
        }
    }
    for from_x in contacts {
        damage_player(state, ENEMY_CONTACT_DAMAGE, from_x);
    }
}

fn update_jammer(state: &mut GameState, dt: f32) {
    if !state.jammer.update(dt) {
        return;
    }
    let center = state.jammer.body().center();
    state.push_event(GameEvent::JammerPulse);
    spawn_burst(&mut state.particles, center, ParticleKind::Pulse, 20, state.time_ticks);
    if state.jammer.in_pulse_range(state.player.center()) {
        let from_x = state.jammer.pos.x;
        damage_player(state, JAMMER_PULSE_DAMAGE, from_x);
    }
}

fn update_boss(state: &mut GameState, dt: f32) {
    if !state.boss_triggered && state.player.pos.x >= BOSS_TRIGGER_X {
        state.boss_triggered = true;
        state.reach_checkpoint(2);
        state.boss.activate();
        state.push_event(GameEvent::BossActivated);
        state.start_cutscene(CutsceneId::BossIntro);
        return;
    }

    if state.boss.is_engaged() {
        let fired = state
            .boss
            .update(dt, state.player.center(), BOSS_ARENA_MIN_X, LEVEL_WIDTH);
        state.projectiles.extend(fired);

        if let Some(damage) = state.boss.contact_damage() {
            if state.boss.body().overlaps(&state.player.body()) {
                let from_x = state.boss.pos.x;
                damage_player(state, damage, from_x);
            }
        }
    }

    let player_body = state.player.body();
    let mut hits = Vec::new();
    for projectile in &mut state.projectiles {
        projectile.update(dt);
        if projectile.body().overlaps(&player_body) {
            hits.push((projectile.damage, projectile.pos.x));
            projectile.ttl = 0.0;
        }
    }
    state.projectiles.retain(|p| p.is_alive());
    for (damage, from_x) in hits {
        damage_player(state, damage, from_x);
    }
}

fn collect_fragments(state: &mut GameState) {
    let player_body = state.player.body();
    let mut collected = Vec::new();
    for fragment in &mut state.fragments {
        if !fragment.collected && fragment.body().overlaps(&player_body) {
            fragment.collected = true;
            collected.push((fragment.id, fragment.pos));
        }
    }
    for (id, pos) in collected {
        let first_time = state.lore.unlock(id);
        state.score += FRAGMENT_POINTS;
        state.push_event(GameEvent::FragmentCollected { id, first_time });
        spawn_burst(&mut state.particles, pos, ParticleKind::Data, 24, state.time_ticks);
        log::info!("Fragment {} recovered (new: {})", id, first_time);
    }
}

fn update_camera(state: &mut GameState, dt: f32) {
    let max_camera = LEVEL_WIDTH - VIEW_WIDTH;
    let target = (state.player.pos.x - VIEW_WIDTH * 0.4).clamp(0.0, max_camera);
    state.camera_x = crate::approach(state.camera_x, target, CAMERA_FOLLOW_RATE, dt).clamp(0.0, max_camera);
}

/// Let the tutorial and objectives see this tick's events
fn observe_progress(state: &mut GameState, first_event: usize) {
    let tick_events = state.events[first_event..].to_vec();

    let mut entered: Vec<_> = state.tutorial.observe_travel(state.player.travelled).into_iter().collect();
    for event in &tick_events {
        entered.extend(state.tutorial.observe(event));
    }
    for step in entered {
        state.push_event(GameEvent::TutorialAdvanced { step });
    }
    for event in &tick_events {
        if let Some(objective) = state.objectives.observe(event) {
            state.push_event(GameEvent::ObjectiveCompleted { objective });
        }
    }
}

fn handle_death(state: &mut GameState) {
    if !state.player.is_dead() {
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    let lives_left = state.lives;
    state.push_event(GameEvent::PlayerDied { lives_left });
    spawn_burst(
        &mut state.particles,
        state.player.center(),
        ParticleKind::Debris,
        32,
        state.time_ticks,
    );

    if state.rhythm.is_active() {
        state.rhythm.toggle(false);
        state.push_event(GameEvent::RhythmToggled { on: false });
    }
    state.projectiles.clear();

    if lives_left == 0 {
        state.set_phase(GamePhase::GameOver);
        state.push_event(GameEvent::GameOver);
        return;
    }

    let x = state.checkpoint_x();
    state.player.respawn(x);
    state.camera_x = (x - VIEW_WIDTH * 0.4).clamp(0.0, LEVEL_WIDTH - VIEW_WIDTH);
    log::info!("Respawned at checkpoint {} ({} lives left)", state.checkpoint, lives_left);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::{BossState, CHARGE_CONTACT_DAMAGE, PROJECTILE_DAMAGE};
    use crate::sim::jammer::JAMMER_WIDTH;
    use crate::sim::level;
    use crate::sim::tutorial::TutorialStep;
    use glam::Vec2;
    use crate::sim::objectives::ObjectiveKind;
    use crate::sim::rhythm::{HitGrade, RhythmPhase};
    use crate::sim::state::RunOptions;

    /// Ticks between beats at the default 120 bpm
    const TICKS_PER_BEAT: u32 = 60;
    /// Ticks from toggling rhythm on until beat 16 (first judged beat)
    const TICKS_TO_FIRST_JUDGED_BEAT: u32 = 1020;

    fn playing_state(seed: u64) -> GameState {
        let options = RunOptions {
            tutorial: false,
            skip_intro: true,
            ..Default::default()
        };
        let mut state = GameState::with_options(seed, &options);
        state.enemies.clear();
        state.drain_events();
        state
    }

    fn run(state: &mut GameState, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT);
        }
    }

    /// Toggle rhythm on and stop one tick before beat 16
    fn run_to_first_judged_beat(state: &mut GameState, idle: &TickInput) {
        let toggle = TickInput {
            toggle_rhythm: true,
            ..idle.clone()
        };
        tick(state, &toggle, SIM_DT);
        run(state, idle, TICKS_TO_FIRST_JUDGED_BEAT - 2);
        assert_eq!(state.rhythm.phase(), RhythmPhase::Steady);
    }

    #[test]
    fn test_intro_plays_then_skips() {
        let mut state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Cutscene);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Cutscene);
        assert_eq!(state.time_ticks, 0, "world frozen during cutscenes");

        let skip = TickInput {
            skip: true,
            ..Default::default()
        };
        tick(&mut state, &skip, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::CutsceneFinished { id: CutsceneId::Intro })
        );
    }

    #[test]
    fn test_intro_finishes_on_its_own() {
        let mut state = GameState::new(1);
        let ticks = (CutsceneId::Intro.total_duration() / SIM_DT).ceil() as u32 + 2;
        run(&mut state, &TickInput::default(), ticks);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = playing_state(12345);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let ticks = state.time_ticks;
        run(&mut state, &TickInput::default(), 10);
        assert_eq!(state.time_ticks, ticks);

        // Unpause
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_on_beat_attack_scores_and_builds_combo() {
        let mut state = playing_state(7);
        let idle = TickInput::default();
        let attack = TickInput {
            attack: true,
            ..Default::default()
        };

        run_to_first_judged_beat(&mut state, &idle);
        state.drain_events();

        tick(&mut state, &attack, SIM_DT);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::RhythmHit {
            grade: HitGrade::Excellent,
            combo: 1,
            points: 300,
        }));
        assert!(events.contains(&GameEvent::AttackStarted { on_beat: true }));
        assert_eq!(state.score, 300);

        run(&mut state, &idle, TICKS_PER_BEAT - 1);
        tick(&mut state, &attack, SIM_DT);
        assert_eq!(state.rhythm.combo, 2);
        assert_eq!(state.score, 300 + 330);
    }

    #[test]
    fn test_off_beat_attack_resets_combo() {
        let mut state = playing_state(7);
        let idle = TickInput::default();
        let attack = TickInput {
            attack: true,
            ..Default::default()
        };

        run_to_first_judged_beat(&mut state, &idle);
        tick(&mut state, &attack, SIM_DT);
        assert_eq!(state.rhythm.combo, 1);

        // A beat and a half later: 250 ms from either neighbour
        run(&mut state, &idle, TICKS_PER_BEAT + TICKS_PER_BEAT / 2 - 1);
        tick(&mut state, &attack, SIM_DT);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::RhythmMiss { combo_lost: 1 }));
        assert!(events.contains(&GameEvent::AttackStarted { on_beat: false }));
        assert_eq!(state.rhythm.combo, 0);
    }

    #[test]
    fn test_jammer_blocks_until_destroyed_on_beat() {
        let mut state = playing_state(3);
        state.jammer.pulse_timer = 1000.0;
        let barrier = state.jammer.barrier_x().unwrap();
        state.player.pos.x = barrier - PLAYER_WIDTH / 2.0 - 1.0;

        let push = TickInput {
            move_x: 1.0,
            ..Default::default()
        };
        run(&mut state, &push, 30);
        assert!(state.player.pos.x <= barrier - PLAYER_WIDTH / 2.0);

        // Plain swings bounce off
        let swing = TickInput {
            move_x: 1.0,
            attack: true,
            ..Default::default()
        };
        tick(&mut state, &swing, SIM_DT);
        assert!(state.drain_events().contains(&GameEvent::JammerDeflected));
        assert_eq!(state.jammer.hp, JAMMER_HP);

        // Four excellent swings on consecutive beats
        run(&mut state, &push, 40);
        run_to_first_judged_beat(&mut state, &push);
        for _ in 0..4 {
            tick(&mut state, &swing, SIM_DT);
            run(&mut state, &push, TICKS_PER_BEAT - 1);
        }

        assert!(!state.jammer.is_active());
        assert_eq!(state.checkpoint, 1);
        let jammer_objective = state.objectives.get(ObjectiveKind::DestroyJammer).unwrap();
        assert!(jammer_objective.complete);

        // Path is open
        run(&mut state, &push, 120);
        assert!(state.player.pos.x > JAMMER_X + 100.0);
    }

    #[test]
    fn test_fragment_pickup_unlocks_lore() {
        let mut state = playing_state(9);
        let fragment = level::fragments()[0];
        state.player.pos = fragment.pos - Vec2::new(0.0, 20.0);
        tick(&mut state, &TickInput::default(), SIM_DT);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::FragmentCollected {
            id: fragment.id,
            first_time: true
        }));
        assert!(state.lore.is_unlocked(fragment.id));
        assert_eq!(state.score, FRAGMENT_POINTS);
        assert_eq!(state.fragments_collected(), 1);

        // Already collected: nothing more
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, FRAGMENT_POINTS);
    }

    #[test]
    fn test_boss_trigger_plays_intro() {
        let mut state = playing_state(4);
        state.jammer.destroyed = true;
        state.player.pos.x = BOSS_TRIGGER_X + 5.0;
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.boss_triggered);
        assert!(state.boss.is_engaged());
        assert_eq!(state.checkpoint, 2);
        assert_eq!(state.phase, GamePhase::Cutscene);
        assert_eq!(state.cutscene.as_ref().map(|c| c.id), Some(CutsceneId::BossIntro));
    }

    #[test]
    fn test_boss_defeat_leads_to_victory() {
        let mut state = playing_state(4);
        state.jammer.destroyed = true;
        state.boss_triggered = true;
        state.boss.activate();
        state.boss.hp = 5;
        state.boss.pos.x = 5600.0;
        state.player.pos.x = 5600.0 - 40.0 - PLAYER_WIDTH / 2.0 - 10.0;
        state.player.facing = 1.0;

        let attack = TickInput {
            attack: true,
            ..Default::default()
        };
        tick(&mut state, &attack, SIM_DT);
        assert!(state.boss.is_defeated());
        assert_eq!(state.phase, GamePhase::Cutscene);
        assert_eq!(state.score, BOSS_POINTS);

        let skip = TickInput {
            skip: true,
            ..Default::default()
        };
        tick(&mut state, &skip, SIM_DT);
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(state.drain_events().contains(&GameEvent::Victory));
        assert!(state.is_finished());
    }

    #[test]
    fn test_death_respawns_then_game_over() {
        let mut state = playing_state(11);
        state.reach_checkpoint(1);
        state.jammer.destroyed = true;
        state.player.health = 0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.lives, PLAYER_LIVES - 1);
        assert_eq!(state.player.pos.x, level::checkpoints()[1]);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);

        state.lives = 1;
        state.player.health = 0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().contains(&GameEvent::GameOver));

        // Frozen afterwards
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_tutorial_advances_from_play() {
        let options = RunOptions {
            skip_intro: true,
            ..Default::default()
        };
        let mut state = GameState::with_options(2, &options);
        state.enemies.clear();
        let walk = TickInput {
            move_x: 1.0,
            ..Default::default()
        };
        run(&mut state, &walk, 70);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, SIM_DT);
        let steps: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::TutorialAdvanced { step } => Some(step),
                _ => None,
            })
            .collect();
        assert_eq!(steps, vec![TutorialStep::Jump, TutorialStep::Attack]);
    }

    #[test]
    fn test_player_steps_before_rhythm_events() {
        let mut state = playing_state(13);
        let input = TickInput {
            jump: true,
            toggle_rhythm: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        let events = state.drain_events();
        let jumped = events.iter().position(|e| *e == GameEvent::PlayerJumped);
        let toggled = events
            .iter()
            .position(|e| *e == GameEvent::RhythmToggled { on: true });
        assert!(jumped.is_some() && toggled.is_some());
        assert!(jumped < toggled);
    }

    #[test]
    fn test_jammer_pulse_hurts_nearby_player() {
        let mut state = playing_state(5);
        state.player.pos.x = JAMMER_X - JAMMER_WIDTH / 2.0 - 60.0;
        state.jammer.pulse_timer = SIM_DT / 2.0;
        tick(&mut state, &TickInput::default(), SIM_DT);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::JammerPulse));
        assert!(events.contains(&GameEvent::PlayerDamaged {
            amount: JAMMER_PULSE_DAMAGE,
            health: PLAYER_MAX_HEALTH - JAMMER_PULSE_DAMAGE,
        }));
        assert!(state.player.invuln > 0.0);

        // Out of range: the pulse fires but nobody is hurt
        let mut state = playing_state(5);
        state.player.pos.x = JAMMER_X - JAMMER_WIDTH / 2.0 - JAMMER_PULSE_RADIUS - 60.0;
        state.jammer.pulse_timer = SIM_DT / 2.0;
        tick(&mut state, &TickInput::default(), SIM_DT);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::JammerPulse));
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_arena_walls_hold_player() {
        let mut state = playing_state(6);
        state.jammer.destroyed = true;
        state.boss_triggered = true;
        state.boss.activate();
        state.boss.pos.x = BOSS_SPAWN_X;
        state.player.pos.x = BOSS_ARENA_MIN_X + 200.0;

        let walk_left = TickInput {
            move_x: -1.0,
            ..Default::default()
        };
        run(&mut state, &walk_left, 120);
        assert_eq!(state.player.pos.x, BOSS_ARENA_MIN_X + PLAYER_WIDTH / 2.0);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_boss_charge_and_volley_damage_player() {
        let mut state = playing_state(8);
        state.jammer.destroyed = true;
        state.boss_triggered = true;
        state.boss.activate();
        state.boss.pos.x = 5600.0;
        state.boss.state = BossState::Charge { t: 1.0, dir: -1.0 };
        state.player.pos.x = 5600.0 - 40.0 - 10.0;
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.drain_events().contains(&GameEvent::PlayerDamaged {
            amount: CHARGE_CONTACT_DAMAGE,
            health: PLAYER_MAX_HEALTH - CHARGE_CONTACT_DAMAGE,
        }));

        // Recovery ends in a volley aimed at the player
        let mut state = playing_state(8);
        state.jammer.destroyed = true;
        state.boss_triggered = true;
        state.boss.activate();
        state.boss.pos.x = 5600.0;
        state.boss.state = BossState::Recover { t: SIM_DT / 2.0 };
        state.player.pos.x = 5400.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.projectiles.len(), 3);

        let mut damage = Vec::new();
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            damage.extend(state.drain_events().into_iter().filter_map(|e| match e {
                GameEvent::PlayerDamaged { amount, .. } => Some(amount),
                _ => None,
            }));
        }
        assert_eq!(damage, vec![PROJECTILE_DAMAGE]);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH - PROJECTILE_DAMAGE);
    }

    #[test]
    fn test_camera_follows_and_clamps() {
        let mut state = playing_state(10);
        state.camera_x = 0.0;
        state.player.pos.x = 2000.0;
        let target = 2000.0 - VIEW_WIDTH * 0.4;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.camera_x > 0.0 && state.camera_x < target, "eases toward the player");

        run(&mut state, &TickInput::default(), 240);
        assert!((state.camera_x - target).abs() < 1.0);

        // Right edge of the level
        state.jammer.destroyed = true;
        state.boss_triggered = true;
        state.player.pos.x = LEVEL_WIDTH - 20.0;
        run(&mut state, &TickInput::default(), 600);
        assert!(state.camera_x <= LEVEL_WIDTH - VIEW_WIDTH);
        assert!((state.camera_x - (LEVEL_WIDTH - VIEW_WIDTH)).abs() < 1.0);

        // Left edge
        state.boss_triggered = false;
        state.player.pos.x = 20.0;
        run(&mut state, &TickInput::default(), 600);
        assert!(state.camera_x >= 0.0);
        assert!(state.camera_x < 1.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                skip: true,
                ..Default::default()
            },
            TickInput {
                move_x: 1.0,
                toggle_rhythm: true,
                ..Default::default()
            },
            TickInput {
                move_x: 1.0,
                jump: true,
                ..Default::default()
            },
            TickInput {
                attack: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..200 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT);
                tick(&mut state2, input, SIM_DT);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.rhythm.stats, state2.rhythm.stats);
    }
}
