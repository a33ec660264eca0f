//! BARCODE: System Override entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use barcode_override::audio::AudioManager;
    use barcode_override::consts::*;
    use barcode_override::persistence::{self, PersistError};
    use barcode_override::platform::{self, InputState, KeyBindings, storage};
    use barcode_override::sim::{GameEvent, GamePhase, GameState, LoreLog, tick};
    use barcode_override::view::FrameSnapshot;
    use barcode_override::{HighScores, Settings};

    // Host hook: the page registers `window.barcodeRender(frame)` to draw
    #[wasm_bindgen(inline_js = "
        export function publish_frame(json) {
            const render = window.barcodeRender;
            if (typeof render === 'function') {
                render(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn publish_frame(json: &str);
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        high_scores: HighScores,
        lore: LoreLog,
        audio: AudioManager,
        bindings: KeyBindings,
        input: InputState,
        accumulator: f32,
        last_time: f64,
        // Track phase for auto-save and end-of-run bookkeeping
        last_phase: GamePhase,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let lore = load_lore();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);

            let state = GameState::with_options(seed, &settings.run_options()).with_lore(lore.clone());
            Self {
                last_phase: state.phase,
                state,
                settings,
                high_scores: HighScores::load(),
                lore,
                audio,
                bindings: KeyBindings::default(),
                input: InputState::new(),
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                // One-shot inputs are cleared once consumed
                let input = self.input.take_tick_input();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            let events = self.state.drain_events();
            self.audio.play_events(&events);
            self.handle_events(&events);

            let current_phase = self.state.phase;
            if current_phase != self.last_phase {
                match current_phase {
                    GamePhase::Paused => self.save_game(),
                    GamePhase::GameOver | GamePhase::Victory => self.finish_run(),
                    _ => {}
                }
                self.last_phase = current_phase;
            }
        }

        fn handle_events(&mut self, events: &[GameEvent]) {
            let new_lore = events
                .iter()
                .any(|e| matches!(e, GameEvent::FragmentCollected { first_time: true, .. }));
            if new_lore {
                self.lore = self.state.lore.clone();
                if let Err(e) = storage::save_json(LoreLog::STORAGE_KEY, &self.lore) {
                    log::warn!("Failed to save lore log: {}", e);
                }
            }
        }

        /// Record the result and drop the saved run
        fn finish_run(&mut self) {
            if self.high_scores.record_run(&self.state, platform::now_ms()).is_some() {
                self.high_scores.save();
            }
            persistence::clear();
        }

        /// Take new preferences from the page and persist them
        fn apply_settings(&mut self, settings: Settings) {
            self.audio.apply_settings(&settings);
            // Calibration applies at once; the tutorial flag waits for the next run
            self.state.input_offset_ms = settings.input_offset_ms;
            settings.save();
            self.settings = settings;
        }

        /// Publish the current frame to the host
        fn publish(&self) {
            match FrameSnapshot::capture(&self.state, &self.settings).to_json() {
                Ok(json) => publish_frame(&json),
                Err(e) => log::warn!("Snapshot failed: {}", e),
            }
        }

        /// Save game state to LocalStorage
        fn save_game(&self) {
            if let Err(e) = persistence::save(&self.state, platform::now_ms()) {
                log::warn!("Save failed: {}", e);
            }
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            self.state = GameState::with_options(seed, &self.settings.run_options()).with_lore(self.lore.clone());
            self.last_phase = self.state.phase;
            self.accumulator = 0.0;
            self.input.release_all();
        }

        /// Load game state from saved data
        fn load_state(&mut self, mut state: GameState) {
            // Resume paused so the player gets their bearings
            if state.phase == GamePhase::Playing {
                state.phase = GamePhase::Paused;
            }
            state.lore = self.lore.clone();
            self.state = state;
            self.last_phase = self.state.phase;
            self.accumulator = 0.0;
            self.input.release_all();
        }
    }

    /// Load the persistent lore log
    fn load_lore() -> LoreLog {
        match storage::load_json::<LoreLog>(LoreLog::STORAGE_KEY) {
            Ok(lore) => {
                log::info!("Loaded lore log ({} entries)", lore.len());
                lore
            }
            Err(PersistError::Missing) => LoreLog::new(),
            Err(e) => {
                log::warn!("Lore log unreadable ({}), starting fresh", e);
                LoreLog::new()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("BARCODE: System Override starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Check for saved game
        match persistence::load() {
            Ok(envelope) => {
                log::info!(
                    "Found saved game (score {}, checkpoint {})",
                    envelope.state.score,
                    envelope.state.checkpoint
                );
                game.borrow_mut().load_state(envelope.state);
            }
            Err(PersistError::Missing) => {}
            Err(e) => {
                log::warn!("Discarding saved game: {}", e);
                persistence::clear();
            }
        }

        // Set up input handlers
        setup_input_handlers(game.clone());

        // Set up restart button
        setup_restart_button(game.clone());

        // Set up auto-pause on visibility change
        setup_auto_pause(game.clone());

        // Let the page change settings
        setup_settings_hook(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("BARCODE: System Override running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                if g.input.key_down(&g.bindings, &event.key(), event.repeat()) {
                    event.prevent_default();
                    // Browsers only allow audio after a user gesture
                    g.audio.resume();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                g.input.key_up(&g.bindings, &event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.publish();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let seed = js_sys::Date::now() as u64;
                let mut g = game.borrow_mut();
                g.restart(seed);

                // Clear any saved game
                persistence::clear();

                log::info!("Game restarted with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Registers `window.barcodeApplySettings(json)`; returns the settings in effect
    fn setup_settings_hook(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(String) -> String>::new(move |json: String| {
            let mut g = game.borrow_mut();
            match Settings::from_json(&json) {
                Ok(settings) => g.apply_settings(settings),
                Err(e) => log::warn!("Ignoring settings from page: {}", e),
            }
            serde_json::to_string(&g.settings).unwrap_or_default()
        });
        let registered = js_sys::Reflect::set(
            &window,
            &JsValue::from_str("barcodeApplySettings"),
            closure.as_ref(),
        );
        if registered.is_err() {
            log::warn!("Could not register settings hook");
        }
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    // Auto-pause if playing
                    if g.state.phase == GamePhase::Playing {
                        g.input.release_all();
                        g.input.request_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.input.release_all();
                    g.input.request_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("BARCODE: System Override (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in the browser");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Skip the intro, walk right and swing on every beat for a while
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use barcode_override::Settings;
    use barcode_override::consts::SIM_DT;
    use barcode_override::sim::{GameState, TickInput, tick};
    use barcode_override::view::FrameSnapshot;

    let settings = Settings::load();
    let mut state = GameState::with_options(42, &settings.run_options());
    let ticks_per_beat = (state.rhythm.config.interval_ms() / 1000.0 / SIM_DT as f64).round() as u64;

    for t in 0..(120 * 30) {
        let input = TickInput {
            move_x: 1.0,
            skip: t == 0,
            toggle_rhythm: t == 1,
            jump: t % 90 == 45,
            attack: t > 1 && (t - 1) % ticks_per_beat == 0,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        state.drain_events();
        if state.is_finished() {
            break;
        }
    }

    let snapshot = FrameSnapshot::capture(&state, &settings);
    log::info!(
        "Demo finished: phase {:?}, score {}, max combo {}, x {:.0}",
        snapshot.phase,
        snapshot.hud.score,
        snapshot.hud.max_combo,
        state.player.pos.x
    );
    println!(
        "score {} | combo {} | lives {} | phase {:?}",
        snapshot.hud.score, snapshot.hud.max_combo, snapshot.hud.lives, snapshot.phase
    );
}
