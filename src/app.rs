use std::time::{Duration, Instant};

use anyhow::Result;
use glam::{IVec2, UVec2, Vec2};
use sdl2::event::{Event, WindowEvent};
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::mouse::MouseButton;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;
use sdl2::{EventPump, Sdl};
use tracing::{debug, info, trace, warn};

use crate::config::GameConfig;
use crate::constants::{LOOP_TIME, WINDOW_SIZE};
use crate::error::GameError;
use crate::events::{GameCommand, GameEvent, SceneRequest};
use crate::game::Game;
use crate::input::{primary_command, Bindings};
use crate::systems::{
    Bounds, Chunk, Director, FloatingText, MusicState, Panel, Phase, Pickable, Position, Renderable, ScoreLedger,
    Viewport,
};

/// Text glyphs of the SDL2_gfx built-in font are 8x8 pixels.
const GLYPH: i32 = 8;

fn sleep(duration: Duration, focused: bool) {
    if focused {
        spin_sleep::sleep(duration);
    } else {
        std::thread::sleep(duration);
    }
}

/// Maps between world units and window pixels for the current camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// World coordinates of the window's top-left corner.
    origin: Vec2,
    pixels_per_unit: f32,
}

impl Projection {
    pub fn new(viewport: &Viewport, window: UVec2) -> Self {
        let pixels_per_unit = if viewport.half_height > 0.0 {
            window.y as f32 / (viewport.half_height * 2.0)
        } else {
            1.0
        };
        Self {
            origin: Vec2::new(-viewport.half_width, viewport.top()),
            pixels_per_unit,
        }
    }

    pub fn to_screen(&self, world: Vec2) -> IVec2 {
        let x = (world.x - self.origin.x) * self.pixels_per_unit;
        let y = (self.origin.y - world.y) * self.pixels_per_unit;
        IVec2::new(x.round() as i32, y.round() as i32)
    }

    pub fn to_world(&self, screen: IVec2) -> Vec2 {
        Vec2::new(
            self.origin.x + screen.x as f32 / self.pixels_per_unit,
            self.origin.y - screen.y as f32 / self.pixels_per_unit,
        )
    }

    pub fn rect(&self, center: Vec2, bounds: &Bounds) -> Option<Rect> {
        let top_left = self.to_screen(center + Vec2::new(-bounds.half_extents.x, bounds.half_extents.y));
        let size = (bounds.half_extents * 2.0 * self.pixels_per_unit).round();
        if size.x < 1.0 || size.y < 1.0 {
            return None;
        }
        Some(Rect::new(top_left.x, top_left.y, size.x as u32, size.y as u32))
    }
}

fn fill_color(chunk: Option<&Chunk>, pickable: Option<&Pickable>) -> Color {
    match (chunk, pickable) {
        (_, Some(Pickable::Trash { .. })) => Color::RGB(0x8b, 0x5a, 0x2b),
        (_, Some(Pickable::Bonus)) => Color::RGB(0x44, 0x00, 0x77),
        (_, Some(Pickable::Protected { .. })) => Color::RGB(0x2e, 0x8b, 0x57),
        (_, Some(Pickable::TutorialShadow(_))) => Color::RGBA(0x10, 0x10, 0x10, 0xc0),
        (_, Some(Pickable::Kayak(_))) => Color::RGB(0xe8, 0x6a, 0x1a),
        (Some(Chunk::River), None) => Color::RGB(0x1e, 0x5a, 0x78),
        (Some(Chunk::Skyline), None) => Color::RGB(0x70, 0x70, 0x78),
        (Some(Chunk::Special), None) => Color::RGB(0xc8, 0xa0, 0x3c),
        (None, None) => Color::RGB(0xff, 0x00, 0xff),
    }
}

/// Main application wrapper that manages SDL initialization, window lifecycle, and the game loop.
pub struct App {
    pub game: Game,
    config: GameConfig,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    bindings: Bindings,
    last_tick: Instant,
    focused: bool,
    // Keep SDL alive for the app lifetime
    _sdl_context: Sdl,
}

impl App {
    pub fn new(config: GameConfig) -> Result<Self> {
        info!("Initializing SDL2 application");
        let sdl_context = sdl2::init().map_err(GameError::Sdl)?;
        let video_subsystem = sdl_context.video().map_err(GameError::Sdl)?;
        let event_pump = sdl_context.event_pump().map_err(GameError::Sdl)?;

        let window = video_subsystem
            .window("River Sweep", WINDOW_SIZE.x, WINDOW_SIZE.y)
            .position_centered()
            .build()?;

        let mut canvas = window.into_canvas().accelerated().present_vsync().build()?;
        canvas.set_logical_size(WINDOW_SIZE.x, WINDOW_SIZE.y)?;
        canvas.set_blend_mode(BlendMode::Blend);
        debug!(renderer_info = ?canvas.info(), "Canvas renderer initialized");

        let game = Game::new(&config)?;

        Ok(App {
            game,
            config,
            canvas,
            event_pump,
            bindings: Bindings::default(),
            last_tick: Instant::now(),
            focused: true,
            _sdl_context: sdl_context,
        })
    }

    fn projection(&self) -> Option<Projection> {
        self.game
            .world
            .get_resource::<Viewport>()
            .map(|viewport| Projection::new(viewport, WINDOW_SIZE))
    }

    fn handle_events(&mut self) {
        let phase = self.game.phase();
        let projection = self.projection();

        let mut inputs: Vec<GameEvent> = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => inputs.push(GameCommand::Exit.into()),
                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::FocusGained => self.focused = true,
                    WindowEvent::FocusLost => self.focused = false,
                    _ => {}
                },
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    if let Some(command) = self.bindings.command_for(key, phase) {
                        trace!(%command, ?key, "Key bound to command");
                        inputs.push(command.into());
                    }
                }
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    x,
                    y,
                    ..
                } => match (phase.panel(), projection) {
                    // A click anywhere on a one-button panel presses it
                    (Some(_), _) => {
                        if let Some(command) = primary_command(phase) {
                            inputs.push(command.into());
                        }
                    }
                    (None, Some(projection)) => {
                        inputs.push(GameEvent::Click(projection.to_world(IVec2::new(x, y))));
                    }
                    (None, None) => {}
                },
                _ => {}
            }
        }

        for input in inputs {
            self.game.send(input);
        }
    }

    /// Performs a scene load requested by the game.
    fn load_scene(&mut self, request: SceneRequest) -> Result<()> {
        match request {
            SceneRequest::Title => {
                info!("Loading title scene");
                self.game = Game::new(&self.config)?;
            }
        }
        Ok(())
    }

    /// Executes a single frame of the game loop with consistent timing and optional sleep.
    ///
    /// Returns `true` if the game should continue running, `false` if the game requested exit.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();
        let dt = self.last_tick.elapsed().as_secs_f32();
        self.last_tick = start;

        self.handle_events();

        if self.game.tick(dt) {
            return false;
        }

        for request in self.game.take_scene_requests() {
            if let Err(e) = self.load_scene(request) {
                warn!(error = %e, "Scene load failed");
                return false;
            }
        }

        if let Err(e) = self.draw() {
            warn!(error = %e, "Frame draw failed");
        }

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                sleep(time, self.focused);
            }
        }

        true
    }

    fn draw(&mut self) -> Result<()> {
        let Some(projection) = self.projection() else {
            return Ok(());
        };

        self.canvas.set_draw_color(Color::RGB(0x87, 0xce, 0xeb));
        self.canvas.clear();

        let world = &mut self.game.world;
        let mut drawables: Vec<(u8, Color, Option<Rect>)> = world
            .query::<(&Position, &Bounds, &Renderable, Option<&Chunk>, Option<&Pickable>)>()
            .iter(world)
            .map(|(position, bounds, renderable, chunk, pickable)| {
                (
                    renderable.layer,
                    fill_color(chunk, pickable),
                    projection.rect(position.0, bounds),
                )
            })
            .collect();
        drawables.sort_by_key(|(layer, _, _)| *layer);

        for (_, color, rect) in drawables {
            if let Some(rect) = rect {
                self.canvas.set_draw_color(color);
                self.canvas.fill_rect(rect).map_err(GameError::Sdl)?;
            }
        }

        let popups: Vec<(IVec2, String, Color)> = world
            .query::<(&Position, &FloatingText)>()
            .iter(world)
            .map(|(position, popup)| {
                let (r, g, b) = popup.color;
                let alpha = (popup.alpha * 255.0).round() as u8;
                (projection.to_screen(position.0), popup.text.clone(), Color::RGBA(r, g, b, alpha))
            })
            .collect();
        for (at, text, color) in popups {
            let x = at.x - text.len() as i32 * GLYPH / 2;
            self.canvas.string(x as i16, at.y as i16, &text, color).map_err(GameError::Sdl)?;
        }

        self.draw_hud()?;
        self.draw_panel()?;

        self.canvas.present();
        Ok(())
    }

    fn text(&mut self, x: i32, y: i32, text: &str, color: Color) -> Result<()> {
        self.canvas.string(x as i16, y as i16, text, color).map_err(GameError::Sdl)?;
        Ok(())
    }

    fn centered_text(&mut self, y: i32, text: &str) -> Result<()> {
        let x = (WINDOW_SIZE.x as i32 - text.len() as i32 * GLYPH) / 2;
        self.text(x, y, text, Color::WHITE)
    }

    fn draw_hud(&mut self) -> Result<()> {
        let world = &self.game.world;
        let score = world
            .get_resource::<ScoreLedger>()
            .map(|s| s.display().to_string())
            .unwrap_or_default();
        let remaining = world
            .get_resource::<Director>()
            .filter(|d| d.phase() == Phase::MainGamePlaying)
            .map(|d| format!("Time: {}", d.time_remaining().ceil() as i32));
        let muted = world.get_resource::<MusicState>().is_some_and(|m| m.muted);

        self.text(12, 12, &score, Color::WHITE)?;
        if let Some(remaining) = remaining {
            self.text(WINDOW_SIZE.x as i32 - 12 - remaining.len() as i32 * GLYPH, 12, &remaining, Color::WHITE)?;
        }
        if muted {
            self.text(12, 28, "Muted", Color::RGB(0xcc, 0xcc, 0xcc))?;
        }

        let title = format!("River Sweep - {score}");
        self.canvas
            .window_mut()
            .set_title(&title)
            .map_err(|e| GameError::Sdl(e.to_string()))?;
        Ok(())
    }

    fn draw_panel(&mut self) -> Result<()> {
        let Some(director) = self.game.world.get_resource::<Director>() else {
            return Ok(());
        };
        let Some(panel) = director.phase().panel() else {
            return Ok(());
        };

        let lines: Vec<String> = match panel {
            Panel::Title => vec!["RIVER SWEEP".into(), String::new(), "Enter: Start".into(), "Esc: Quit".into()],
            Panel::TutorialIntro => vec![
                "Trash is floating down the river.".into(),
                "Click the shadows to find out what they are,".into(),
                "then decide: trash it or keep it.".into(),
                String::new(),
                "Enter: Let's go!".into(),
            ],
            Panel::ItemReveal => {
                let mut lines = vec![format!(
                    "Item {} of {}",
                    director.processed() + 1,
                    director.items_to_complete()
                )];
                if let Some(item) = director.revealed() {
                    lines.push(item.name.clone());
                    lines.push(item.description.clone());
                }
                lines.push(String::new());
                lines.push("T: Trash    K: Keep".into());
                lines
            }
            Panel::WildlifeWarning => vec![
                "That's wildlife! Animals belong in the river.".into(),
                "Enter: Try again".into(),
            ],
            Panel::KeepTrashWarning => vec![
                "That's trash! It doesn't belong in the river.".into(),
                "Enter: Try again".into(),
            ],
            Panel::ReadyToStart => vec!["Tutorial complete!".into(), "Enter: Start the real game".into()],
            Panel::GameOver => vec![
                "GAME OVER".into(),
                format!("Final score: {}", director.final_score().unwrap_or_default()),
                String::new(),
                "Enter: Play again".into(),
                "R: Replay tutorial".into(),
                "Backspace: Title".into(),
            ],
        };

        let height = (lines.len() as i32 + 2) * GLYPH * 2;
        let top = (WINDOW_SIZE.y as i32 - height) / 2;
        self.canvas
            .box_(
                24,
                top as i16,
                (WINDOW_SIZE.x as i32 - 24) as i16,
                (top + height) as i16,
                Color::RGBA(0, 0, 0, 0xc0),
            )
            .map_err(GameError::Sdl)?;

        for (i, line) in lines.iter().enumerate() {
            self.centered_text(top + GLYPH * 2 + i as i32 * GLYPH * 2, line)?;
        }
        Ok(())
    }
}
