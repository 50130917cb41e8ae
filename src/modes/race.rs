use anyhow::{Context, Result};
use crossterm::{
    event::{
        Event, EventStream, KeyEvent, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::collections::HashMap;
use std::io::{stderr, Stderr};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

use crate::assets::{AssetProvider, ProceduralAssets};
use crate::game::{RaceEngine, RaceState, Viewport};
use crate::input::{HeldKeys, InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{project_scene, Framebuffer, Minimap, Opponent, RaceView, Renderer, SceneInput};
use crate::rl::{load_q_table, save_q_table};
use crate::settings::Settings;
use crate::store::{speed_multiplier, JsonParameterStore, JsonScoreStore, ParameterStore, ScoreStore};

/// Longest simulated step; a stalled frame does not teleport the car
const MAX_DT: f64 = 0.1;

const HINT_MESSAGE: &str = "Use arrow keys to drive";
const HINT_DURATION: Duration = Duration::from_millis(800);
const NOT_LOGGED_IN_MESSAGE: &str = "Not logged in! Can't save";
const NOT_LOGGED_IN_DURATION: Duration = Duration::from_millis(2000);
const SAVE_FAILED_DURATION: Duration = Duration::from_millis(2000);

/// Options for an interactive race
#[derive(Debug, Clone, Default)]
pub struct RaceOptions {
    /// Name scores are saved under; saving is refused without one
    pub username: Option<String>,
    /// Q-table to warm-start the opponent from and save back on exit
    pub qtable_path: Option<PathBuf>,
}

/// Message shown over the road; the race is paused while it is up
#[derive(Debug, Clone)]
struct Overlay {
    message: String,
    until: Instant,
}

pub struct RaceMode {
    engine: RaceEngine,
    state: RaceState,
    assets: ProceduralAssets,
    framebuffer: Framebuffer,
    minimap: Minimap,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    held_keys: HeldKeys,
    scores: Box<dyn ScoreStore>,
    options: RaceOptions,
    overlay: Option<Overlay>,
    last_tick: Instant,
    should_quit: bool,
}

impl RaceMode {
    /// Build the track and the first race.
    ///
    /// An unreadable parameter store or Q-table is reported and the race
    /// starts with defaults instead.
    pub fn new(settings: &Settings, options: RaceOptions) -> Self {
        let mut game = settings.game.clone();
        let mut overrides = HashMap::new();

        match JsonParameterStore::open(&settings.parameters_path) {
            Ok(store) => {
                game.speed_multiplier = speed_multiplier(&store);
                overrides = store.values();
                info!(speed_multiplier = game.speed_multiplier, "Applied tuning parameters");
            }
            Err(err) => warn!("Using default tuning parameters: {:#}", err),
        }

        let q_table = options.qtable_path.as_ref().and_then(|path| {
            if !path.exists() {
                return None;
            }
            match load_q_table(path) {
                Ok(snapshot) => {
                    info!(path = ?path, states = snapshot.entries.len(), "Loaded Q-table");
                    Some(snapshot.q_table())
                }
                Err(err) => {
                    warn!("Starting with an empty Q-table: {:#}", err);
                    None
                }
            }
        });

        let assets = ProceduralAssets::new();
        let engine = RaceEngine::new(game, settings.agent.clone(), assets.decorations())
            .with_vehicle_overrides(overrides);
        let state = engine.new_race(q_table);
        let minimap = Minimap::from_track(engine.track());

        Self {
            engine,
            state,
            assets,
            framebuffer: Framebuffer::new(0, 0),
            minimap,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            held_keys: HeldKeys::default(),
            scores: Box::new(JsonScoreStore::new(settings.scores_path.clone())),
            options,
            overlay: None,
            last_tick: Instant::now(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;

        // Release events make held keys exact where the terminal supports them
        let enhanced = supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                stderr,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .context("Failed to enable key release events")?;
        }

        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run race loop with cleanup
        let result = self.run_race_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal, enhanced)?;

        self.save_q_table()?;

        result
    }

    async fn run_race_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let tick_rate = self.engine.config().tick_rate_hz.max(1);
        let mut tick_timer = interval(Duration::from_secs_f64(1.0 / tick_rate as f64));

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        self.metrics.on_race_start();
        self.last_tick = Instant::now();

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(Event::Key(key))) = maybe_event {
                        self.handle_key(key, Instant::now());
                    }
                }

                // Simulation tick
                _ = tick_timer.tick() => {
                    self.tick(Instant::now());
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let size = terminal.size().context("Failed to read terminal size")?;
                    self.paint_road(Rect::new(0, 0, size.width, size.height));

                    let view = RaceView {
                        state: &self.state,
                        road: &self.framebuffer,
                        minimap: &self.minimap,
                        metrics: &self.metrics,
                        overlay: self.overlay.as_ref().map(|o| o.message.as_str()),
                    };
                    let renderer = &self.renderer;
                    terminal.draw(|frame| {
                        renderer.render(frame, &view);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let action = self.input_handler.handle_key_event(key);

        // Only quit gets through while a message is up
        if self.overlay_active(now) {
            if action == KeyAction::Quit {
                self.should_quit = true;
            }
            return;
        }

        match action {
            KeyAction::Drive(drive_key) => {
                self.held_keys.handle(drive_key, key.kind, now);
            }
            _ if key.kind == crossterm::event::KeyEventKind::Release => {}
            KeyAction::Save => self.save_score(now),
            KeyAction::Restart => self.restart(now),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Unbound => self.show_overlay(HINT_MESSAGE, HINT_DURATION, now),
        }
    }

    /// Advance the race unless a message is showing
    fn tick(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_tick).as_secs_f64().min(MAX_DT);
        self.last_tick = now;

        if self.overlay_active(now) {
            return;
        }
        self.overlay = None;

        let input = self.held_keys.input(now);
        let result = self.engine.step(&mut self.state, &input, dt);
        if result.lap_completed {
            self.metrics.on_lap();
            info!(
                lap = self.state.laps.lap_count,
                best = ?self.state.laps.best_lap,
                "Lap completed"
            );
        }
    }

    /// Project the track into the framebuffer sized for a frame of `area`
    fn paint_road(&mut self, area: Rect) {
        self.framebuffer.resize_to(Renderer::road_area(area));

        let config = self.engine.config();
        let viewport = Viewport::new(
            self.framebuffer.width() as f64,
            self.framebuffer.height() as f64,
            config.camera_depth,
            config.road_width,
        );
        let input = SceneInput {
            position: self.state.position,
            player_x: self.state.player_x,
            camera_height: self.state.camera_height,
            render_distance: config.render_distance,
            road_half_width: config.road_half_width(),
            opponent: Some(Opponent {
                position: self.state.ai.position,
                lane: self.state.ai.lane,
            }),
        };

        let scene = project_scene(
            self.engine.track_mut(),
            &input,
            &viewport,
            self.assets.decorations(),
        );
        self.framebuffer.draw_scene(
            &scene,
            &self.assets,
            self.state.facing,
            self.state.background_offset,
        );
    }

    fn save_score(&mut self, now: Instant) {
        let Some(username) = self.options.username.clone() else {
            self.show_overlay(NOT_LOGGED_IN_MESSAGE, NOT_LOGGED_IN_DURATION, now);
            return;
        };

        match self.scores.save(&username, self.state.score) {
            Ok(()) => self.metrics.record_score(self.state.score),
            Err(err) => {
                warn!("Failed to save score: {:#}", err);
                self.show_overlay("Could not save score", SAVE_FAILED_DURATION, now);
            }
        }
    }

    /// New race on the same track; the opponent keeps what it has learned
    fn restart(&mut self, now: Instant) {
        self.metrics.on_race_end(self.state.score);
        let q_table = self.state.ai.q_table().clone();
        self.state = self.engine.new_race(Some(q_table));
        self.held_keys.clear();
        self.metrics.on_race_start();
        self.last_tick = now;
        info!(races = self.metrics.races_played, "Race restarted");
    }

    fn show_overlay(&mut self, message: &str, duration: Duration, now: Instant) {
        self.held_keys.clear();
        self.overlay = Some(Overlay {
            message: message.to_string(),
            until: now + duration,
        });
    }

    fn overlay_active(&self, now: Instant) -> bool {
        self.overlay.as_ref().is_some_and(|o| now < o.until)
    }

    fn save_q_table(&self) -> Result<()> {
        if let Some(path) = &self.options.qtable_path {
            save_q_table(&self.state.ai, path)
                .with_context(|| format!("Failed to save Q-table to {:?}", path))?;
            info!(path = ?path, states = self.state.ai.q_table().len(), "Saved Q-table");
        }
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        enhanced: bool,
    ) -> Result<()> {
        if enhanced {
            execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
                .context("Failed to restore keyboard mode")?;
        }
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
