//! Rhythm-combat timing engine
//!
//! Tracks a beat clock while rhythm mode is on and judges attack inputs
//! against the nearest beat. The engine moves through three stages:
//!
//! 1. waiting for the first beat (lead-in after the mode is toggled on)
//! 2. tempo establishment (a fixed number of beats the player listens to)
//! 3. steady beat tracking, where inputs are scored
//!
//! Inputs are classified by absolute distance to the nearest beat against
//! three concentric windows (excellent / perfect / good). Anything outside
//! the good window is a miss and resets the combo.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum combo steps that still raise the multiplier (caps at 4.0x)
pub const MULTIPLIER_STEPS: u32 = 30;

/// Rhythm timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmConfig {
    /// Tempo in beats per minute
    pub bpm: f64,
    /// Beats counted before inputs are judged
    pub establish_beats: u32,
    /// Silent beats between toggling on and the first beat
    pub lead_in_beats: u32,
    /// Hit windows (half-widths, milliseconds)
    pub excellent_ms: f64,
    pub perfect_ms: f64,
    pub good_ms: f64,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            establish_beats: 16,
            lead_in_beats: 1,
            excellent_ms: 45.0,
            perfect_ms: 90.0,
            good_ms: 150.0,
        }
    }
}

/// Rejected rhythm configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("bpm {0} outside supported range 40-300")]
    BpmOutOfRange(f64),
    #[error("hit windows must satisfy 0 < excellent < perfect < good")]
    WindowsNotConcentric,
    #[error("good window {good_ms} ms must be below half the beat interval ({half_interval_ms} ms)")]
    WindowTooWide { good_ms: f64, half_interval_ms: f64 },
}

impl RhythmConfig {
    /// Milliseconds between beats
    pub fn interval_ms(&self) -> f64 {
        60_000.0 / self.bpm
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(40.0..=300.0).contains(&self.bpm) {
            return Err(ConfigError::BpmOutOfRange(self.bpm));
        }
        if !(0.0 < self.excellent_ms
            && self.excellent_ms < self.perfect_ms
            && self.perfect_ms < self.good_ms)
        {
            return Err(ConfigError::WindowsNotConcentric);
        }
        let half_interval_ms = self.interval_ms() / 2.0;
        if self.good_ms >= half_interval_ms {
            return Err(ConfigError::WindowTooWide {
                good_ms: self.good_ms,
                half_interval_ms,
            });
        }
        Ok(())
    }

    /// Grade a signed distance (ms) from a beat
    pub fn classify_offset(&self, delta_ms: f64) -> HitGrade {
        let d = delta_ms.abs();
        if d <= self.excellent_ms {
            HitGrade::Excellent
        } else if d <= self.perfect_ms {
            HitGrade::Perfect
        } else if d <= self.good_ms {
            HitGrade::Good
        } else {
            HitGrade::Miss
        }
    }
}

/// Timing grade for a single input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitGrade {
    Excellent,
    Perfect,
    Good,
    Miss,
}

impl HitGrade {
    pub fn is_hit(self) -> bool {
        self != HitGrade::Miss
    }

    /// Points before the combo multiplier
    pub fn base_points(self) -> u64 {
        match self {
            HitGrade::Excellent => 300,
            HitGrade::Perfect => 200,
            HitGrade::Good => 100,
            HitGrade::Miss => 0,
        }
    }

    /// Melee damage multiplier for an attack landed with this grade
    pub fn damage_multiplier(self) -> f32 {
        match self {
            HitGrade::Excellent => 3.0,
            HitGrade::Perfect => 2.0,
            HitGrade::Good => 1.5,
            HitGrade::Miss => 1.0,
        }
    }

    /// Rank, lower is better (used for ordering tests and UI sorting)
    pub fn rank(self) -> u8 {
        match self {
            HitGrade::Excellent => 0,
            HitGrade::Perfect => 1,
            HitGrade::Good => 2,
            HitGrade::Miss => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HitGrade::Excellent => "excellent",
            HitGrade::Perfect => "perfect",
            HitGrade::Good => "good",
            HitGrade::Miss => "miss",
        }
    }
}

/// Combo score multiplier: 1.0 at combo 1, +0.1 per step, capped at 4.0
pub fn combo_multiplier(combo: u32) -> f64 {
    1.0 + combo.saturating_sub(1).min(MULTIPLIER_STEPS) as f64 * 0.1
}

/// Where the beat clock is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RhythmPhase {
    /// Rhythm mode disabled
    Off,
    /// Mode enabled, lead-in running
    WaitingForFirstBeat,
    /// Counting the calibration beats
    Establishing { beats_seen: u32 },
    /// Inputs are judged
    Steady,
}

/// Clock notifications produced by `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmEvent {
    /// A beat boundary was crossed
    Beat { index: u32, establishing: bool },
    /// Establishment finished, inputs are now judged
    TempoEstablished,
}

/// A judged input in steady state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judgement {
    pub grade: HitGrade,
    /// Beat the input was measured against
    pub beat: u32,
    /// Signed distance to that beat (negative = early)
    pub offset_ms: f64,
    /// Combo after this input
    pub combo: u32,
    /// Points awarded (0 on miss)
    pub points: u64,
    /// Combo that was lost (0 on hit)
    pub combo_lost: u32,
}

/// Result of feeding an input to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputOutcome {
    /// Rhythm mode is off, input is a plain attack
    Inactive,
    /// Mode is on but no beat is judged yet
    NotReady,
    Judged(Judgement),
}

impl InputOutcome {
    pub fn grade(&self) -> Option<HitGrade> {
        match self {
            InputOutcome::Judged(j) => Some(j.grade),
            _ => None,
        }
    }
}

/// Per-grade counters for the current run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhythmStats {
    pub excellent: u32,
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
}

impl RhythmStats {
    fn record(&mut self, grade: HitGrade) {
        match grade {
            HitGrade::Excellent => self.excellent += 1,
            HitGrade::Perfect => self.perfect += 1,
            HitGrade::Good => self.good += 1,
            HitGrade::Miss => self.miss += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.excellent + self.perfect + self.good + self.miss
    }
}

/// Beat tracker and input judge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmSystem {
    pub config: RhythmConfig,
    phase: RhythmPhase,
    /// Clock since rhythm mode was toggled on
    song_ms: f64,
    /// Index of the next beat boundary not yet crossed
    next_beat: u32,
    /// Highest beat index already claimed by a hit
    last_consumed: Option<u32>,
    pub combo: u32,
    pub max_combo: u32,
    pub stats: RhythmStats,
    /// Most recent grade (for HUD flash)
    pub last_grade: Option<HitGrade>,
}

impl Default for RhythmSystem {
    fn default() -> Self {
        Self::new(RhythmConfig::default())
    }
}

impl RhythmSystem {
    pub fn new(config: RhythmConfig) -> Self {
        Self {
            config,
            phase: RhythmPhase::Off,
            song_ms: 0.0,
            next_beat: 0,
            last_consumed: None,
            combo: 0,
            max_combo: 0,
            stats: RhythmStats::default(),
            last_grade: None,
        }
    }

    pub fn phase(&self) -> RhythmPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != RhythmPhase::Off
    }

    pub fn song_ms(&self) -> f64 {
        self.song_ms
    }

    fn origin_ms(&self) -> f64 {
        self.config.lead_in_beats as f64 * self.config.interval_ms()
    }

    /// Song time of beat `index`
    pub fn beat_time_ms(&self, index: u32) -> f64 {
        self.origin_ms() + index as f64 * self.config.interval_ms()
    }

    /// Enable or disable rhythm mode
    ///
    /// Turning off clears the combo without counting a miss.
    pub fn toggle(&mut self, on: bool) {
        match (on, self.phase) {
            (true, RhythmPhase::Off) => {
                self.phase = RhythmPhase::WaitingForFirstBeat;
                self.song_ms = 0.0;
                self.next_beat = 0;
                self.last_consumed = None;
                log::info!("Rhythm mode on ({} bpm)", self.config.bpm);
            }
            (false, phase) if phase != RhythmPhase::Off => {
                self.phase = RhythmPhase::Off;
                self.combo = 0;
                self.last_grade = None;
                log::info!("Rhythm mode off");
            }
            _ => {}
        }
    }

    /// Advance the clock, reporting every beat crossed in order
    pub fn advance(&mut self, dt: f32) -> Vec<RhythmEvent> {
        let mut events = Vec::new();
        if self.phase == RhythmPhase::Off {
            return events;
        }

        self.song_ms += dt as f64 * 1000.0;

        while self.song_ms >= self.beat_time_ms(self.next_beat) {
            let index = self.next_beat;
            let establishing = index < self.config.establish_beats;
            events.push(RhythmEvent::Beat {
                index,
                establishing,
            });
            self.next_beat += 1;

            if self.phase != RhythmPhase::Steady {
                let beats_seen = index + 1;
                if beats_seen >= self.config.establish_beats {
                    self.phase = RhythmPhase::Steady;
                    events.push(RhythmEvent::TempoEstablished);
                    log::info!("Tempo established after {} beats", beats_seen);
                } else {
                    self.phase = RhythmPhase::Establishing { beats_seen };
                }
            }
        }

        events
    }

    /// Judge an attack input at the current clock
    ///
    /// `input_offset_ms` is the latency calibration added to the clock.
    pub fn register_input(&mut self, input_offset_ms: f64) -> InputOutcome {
        match self.phase {
            RhythmPhase::Off => return InputOutcome::Inactive,
            RhythmPhase::WaitingForFirstBeat | RhythmPhase::Establishing { .. } => {
                return InputOutcome::NotReady;
            }
            RhythmPhase::Steady => {}
        }

        let t = self.song_ms + input_offset_ms;
        let beat = self.nearest_beat(t);
        let offset_ms = t - self.beat_time_ms(beat);
        let already_consumed = self.last_consumed.is_some_and(|last| beat <= last);

        let grade = if already_consumed {
            HitGrade::Miss
        } else {
            self.config.classify_offset(offset_ms)
        };

        self.stats.record(grade);
        self.last_grade = Some(grade);

        let judgement = if grade.is_hit() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
            self.last_consumed = Some(beat);
            let points = (grade.base_points() as f64 * combo_multiplier(self.combo)).round() as u64;
            Judgement {
                grade,
                beat,
                offset_ms,
                combo: self.combo,
                points,
                combo_lost: 0,
            }
        } else {
            let combo_lost = self.combo;
            self.combo = 0;
            Judgement {
                grade,
                beat,
                offset_ms,
                combo: 0,
                points: 0,
                combo_lost,
            }
        };

        log::debug!(
            "beat {} {:+.1} ms -> {} (combo {})",
            beat,
            offset_ms,
            grade.as_str(),
            judgement.combo
        );

        InputOutcome::Judged(judgement)
    }

    /// Nearest judgeable beat to song time `t`
    fn nearest_beat(&self, t: f64) -> u32 {
        let raw = ((t - self.origin_ms()) / self.config.interval_ms()).round();
        let first = self.config.establish_beats as f64;
        raw.max(first) as u32
    }

    /// Progress through the current beat in [0, 1)
    pub fn beat_phase(&self) -> f32 {
        if self.phase == RhythmPhase::Off {
            return 0.0;
        }
        (self.song_ms / self.config.interval_ms()).fract() as f32
    }

    /// True while the clock sits inside the good window of a judgeable beat
    pub fn attack_window_open(&self) -> bool {
        if self.phase != RhythmPhase::Steady {
            return false;
        }
        let beat = self.nearest_beat(self.song_ms);
        (self.song_ms - self.beat_time_ms(beat)).abs() <= self.config.good_ms
    }

    /// Beats left before inputs are judged (None when off or steady)
    pub fn establish_remaining(&self) -> Option<u32> {
        match self.phase {
            RhythmPhase::WaitingForFirstBeat => Some(self.config.establish_beats),
            RhythmPhase::Establishing { beats_seen } => {
                Some(self.config.establish_beats.saturating_sub(beats_seen))
            }
            RhythmPhase::Off | RhythmPhase::Steady => None,
        }
    }

    /// Clear run counters (new game)
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }
}
