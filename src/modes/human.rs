use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::{debug, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::game::{Direction, GameConfig, GameEngine, GameState, Phase};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Frame budget of the renderer, independent of the simulation rate
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Keyboard-driven game in the terminal
pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    pending_direction: Option<Direction>,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();

        Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_direction: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            "session over: {} games played, best score {}",
            self.metrics.games_played, self.metrics.best_score
        );

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.engine.config().tick_interval());
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut render_timer = interval(RENDER_INTERVAL);
        render_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => warn!("failed to read terminal event: {err}"),
                        None => self.should_quit = true,
                    }
                }

                _ = tick_timer.tick() => {
                    self.update_game();
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!("quit requested");
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };

        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Restart => {
                self.reset_game();
                self.start_game();
            }
            KeyAction::Turn(direction) => match self.state.phase {
                Phase::Start => self.start_game(),
                Phase::Playing => self.pending_direction = Some(direction),
                Phase::GameOver => {}
            },
            KeyAction::Other => {
                if self.state.phase == Phase::Start {
                    self.start_game();
                }
            }
        }
    }

    fn update_game(&mut self) {
        let requested = self.pending_direction.take();
        let outcome = self.engine.tick(&mut self.state, requested);

        let head = self.state.snake.head();
        if self.state.phase == Phase::Playing && !self.state.is_on_grid(head) {
            debug!("head {:?} is alive on the edge outside the drawn grid", head);
        }

        if let Some(cause) = outcome.death {
            let score = self.state.score();
            self.metrics.on_game_over(score);
            info!(
                "game over after {} ticks: {}, score {}",
                self.state.ticks,
                cause.describe(),
                score
            );
        }
    }

    fn start_game(&mut self) {
        self.engine.start(&mut self.state);
        self.metrics.on_game_start();
        info!(
            "game started on a {}x{} grid",
            self.state.grid_width, self.state.grid_height
        );
    }

    fn reset_game(&mut self) {
        self.state = self.engine.reset();
        self.pending_direction = None;
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_game_initialization() {
        let mode = HumanMode::new(GameConfig::default());
        assert_eq!(mode.state.phase, Phase::Start);
        assert_eq!(mode.state.score(), 0);
    }

    #[test]
    fn test_any_key_starts_game() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(key(KeyCode::Enter));
        assert_eq!(mode.state.phase, Phase::Playing);
    }

    #[test]
    fn test_only_last_direction_is_buffered() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(key(KeyCode::Char(' ')));

        mode.handle_event(key(KeyCode::Up));
        mode.handle_event(key(KeyCode::Down));
        assert_eq!(mode.pending_direction, Some(Direction::Down));

        mode.update_game();
        assert_eq!(mode.pending_direction, None);
        assert_eq!(mode.state.ticks, 1);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = |code| {
            Event::Key(KeyEvent::new_with_kind_and_state(
                code,
                KeyModifiers::NONE,
                KeyEventKind::Release,
                KeyEventState::NONE,
            ))
        };

        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(release(KeyCode::Enter));
        assert_eq!(mode.state.phase, Phase::Start);

        mode.handle_event(key(KeyCode::Enter));
        mode.handle_event(release(KeyCode::Up));
        assert_eq!(mode.state.phase, Phase::Playing);
        assert_eq!(mode.pending_direction, None);

        mode.handle_event(release(KeyCode::Esc));
        assert!(!mode.should_quit);
    }

    #[test]
    fn test_no_ticks_before_start() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.update_game();
        assert_eq!(mode.state.ticks, 0);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(key(KeyCode::Enter));
        mode.state.phase = Phase::GameOver;

        mode.handle_event(key(KeyCode::Up));
        assert_eq!(mode.state.phase, Phase::GameOver);

        mode.handle_event(key(KeyCode::Char('r')));
        assert_eq!(mode.state.phase, Phase::Playing);
        assert_eq!(mode.state.score(), 0);
        assert_eq!(mode.state.ticks, 0);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = HumanMode::new(GameConfig::default());
        mode.handle_event(key(KeyCode::Esc));
        assert!(mode.should_quit);
    }
}
