//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::{GameEvent, HitGrade};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Metronome click (accented on the downbeat)
    Beat { accent: bool },
    /// Rhythm hits by grade
    Excellent,
    Perfect,
    Good,
    /// Off-beat input
    Miss,
    /// Plain swing
    Swing,
    EnemyKill,
    /// Jammer took an on-beat strike
    JammerHit,
    /// Swing bounced off the jammer
    JammerDeflect,
    JammerPulse,
    JammerDestroyed,
    BossHit,
    BossDefeated,
    PlayerHurt,
    /// Lost Data fragment collected
    Pickup,
    GameOver,
    Victory,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent, metronome: bool) -> Option<Self> {
        match *event {
            GameEvent::Beat { index, .. } if metronome => Some(SoundEffect::Beat {
                accent: index % 4 == 0,
            }),
            GameEvent::RhythmHit { grade: HitGrade::Excellent, .. } => Some(SoundEffect::Excellent),
            GameEvent::RhythmHit { grade: HitGrade::Perfect, .. } => Some(SoundEffect::Perfect),
            GameEvent::RhythmHit { grade: HitGrade::Good, .. } => Some(SoundEffect::Good),
            GameEvent::RhythmMiss { .. } => Some(SoundEffect::Miss),
            GameEvent::AttackStarted { on_beat: false } => Some(SoundEffect::Swing),
            GameEvent::EnemyKilled { .. } => Some(SoundEffect::EnemyKill),
            GameEvent::JammerHit { .. } => Some(SoundEffect::JammerHit),
            GameEvent::JammerDeflected => Some(SoundEffect::JammerDeflect),
            GameEvent::JammerPulse => Some(SoundEffect::JammerPulse),
            GameEvent::JammerDestroyed => Some(SoundEffect::JammerDestroyed),
            GameEvent::BossHit { .. } => Some(SoundEffect::BossHit),
            GameEvent::BossDefeated => Some(SoundEffect::BossDefeated),
            GameEvent::PlayerDamaged { .. } => Some(SoundEffect::PlayerHurt),
            GameEvent::FragmentCollected { .. } => Some(SoundEffect::Pickup),
            GameEvent::GameOver => Some(SoundEffect::GameOver),
            GameEvent::Victory => Some(SoundEffect::Victory),
            _ => None,
        }
    }
}

/// Audio manager for the game
#[cfg(target_arch = "wasm32")]
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    metronome: bool,
}

#[cfg(target_arch = "wasm32")]
impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            metronome: true,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Pick up volume and metronome preferences
    pub fn apply_settings(&mut self, settings: &crate::Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.metronome = settings.metronome;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    /// Play the cue for every event that has one
    pub fn play_events(&self, events: &[GameEvent]) {
        for event in events {
            if let Some(effect) = SoundEffect::for_event(event, self.metronome) {
                self.play(effect);
            }
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Beat { accent } => self.play_click(ctx, vol, accent),
            SoundEffect::Excellent => self.play_chord(ctx, vol, &[880.0, 1320.0, 1760.0], 0.03),
            SoundEffect::Perfect => self.play_chord(ctx, vol, &[660.0, 990.0], 0.03),
            SoundEffect::Good => self.play_chord(ctx, vol, &[520.0], 0.0),
            SoundEffect::Miss => self.play_miss(ctx, vol),
            SoundEffect::Swing => self.play_swing(ctx, vol),
            SoundEffect::EnemyKill => self.play_enemy_kill(ctx, vol),
            SoundEffect::JammerHit => self.play_jammer_hit(ctx, vol),
            SoundEffect::JammerDeflect => self.play_deflect(ctx, vol),
            SoundEffect::JammerPulse => self.play_pulse(ctx, vol),
            SoundEffect::JammerDestroyed => self.play_explosion(ctx, vol),
            SoundEffect::BossHit => self.play_boss_hit(ctx, vol),
            SoundEffect::BossDefeated => self.play_explosion(ctx, vol),
            SoundEffect::PlayerHurt => self.play_hurt(ctx, vol),
            SoundEffect::Pickup => self.play_arpeggio(ctx, vol, &[600.0, 800.0, 1000.0], 0.08, OscillatorType::Sine),
            SoundEffect::GameOver => self.play_arpeggio(ctx, vol, &[400.0, 350.0, 300.0, 200.0], 0.2, OscillatorType::Sine),
            SoundEffect::Victory => self.play_arpeggio(
                ctx,
                vol,
                &[500.0, 600.0, 700.0, 800.0, 1000.0],
                0.1,
                OscillatorType::Triangle,
            ),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short percussive blip
    fn play_blip(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType, level: f32, length: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + length)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + length + 0.02).ok();
    }

    /// Metronome tick
    fn play_click(&self, ctx: &AudioContext, vol: f32, accent: bool) {
        let freq = if accent { 1500.0 } else { 1000.0 };
        self.play_blip(ctx, freq, OscillatorType::Square, vol * 0.12, 0.03);
    }

    /// Stacked sine partials, slightly staggered
    fn play_chord(&self, ctx: &AudioContext, vol: f32, freqs: &[f32], stagger: f64) {
        for (i, freq) in freqs.iter().enumerate() {
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + i as f64 * stagger;
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }
    }

    /// Notes played one after another
    fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, freqs: &[f32], step: f64, osc_type: OscillatorType) {
        for (i, freq) in freqs.iter().enumerate() {
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) {
                let t = ctx.current_time() + i as f64 * step;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    /// Miss - detuned buzz
    fn play_miss(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.18)
            .ok();
        osc.frequency().set_value_at_time(180.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(90.0, t + 0.18)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Swing - quick whoosh up
    fn play_swing(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(500.0, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }

    /// Enemy kill - crunchy drop
    fn play_enemy_kill(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency().set_value_at_time(600.0, t + 0.03).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(80.0, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.25).ok();
    }

    /// Jammer hit - glitchy static burst
    fn play_jammer_hit(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.frequency().set_value_at_time(120.0, t).ok();
            osc.frequency().set_value_at_time(400.0, t + 0.02).ok();
            osc.frequency().set_value_at_time(150.0, t + 0.04).ok();
            osc.frequency().set_value_at_time(350.0, t + 0.06).ok();
            osc.frequency().set_value_at_time(100.0, t + 0.1).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }

        // Sub bass punch
        if let Some((osc, gain)) = self.create_osc(ctx, 40.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }
    }

    /// Deflect - metallic clank
    fn play_deflect(&self, ctx: &AudioContext, vol: f32) {
        self.play_blip(ctx, 400.0, OscillatorType::Square, vol * 0.2, 0.12);
        self.play_blip(ctx, 250.0, OscillatorType::Triangle, vol * 0.15, 0.1);
    }

    /// Jammer pulse - low swell
    fn play_pulse(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 60.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.3, t + 0.1)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.4)
            .ok();
        osc.frequency().set_value_at_time(60.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(40.0, t + 0.4)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.45).ok();
    }

    /// Explosion - boom!
    fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.4)
            .ok();
        osc.frequency().set_value_at_time(100.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(30.0, t + 0.4)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();

        // Add high frequency crack
        if let Some((osc2, gain2)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain2.gain().set_value_at_time(vol * 0.2, t).ok();
            gain2
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc2.start().ok();
            osc2.stop_with_when(t + 0.15).ok();
        }
    }

    /// Boss hit - heavy thump
    fn play_boss_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.6, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.15)
            .ok();
        osc.frequency().set_value_at_time(150.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(50.0, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Player hurt - falling tone
    fn play_hurt(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 500.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.25)
            .ok();
        osc.frequency().set_value_at_time(500.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(150.0, t + 0.25)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }
}
