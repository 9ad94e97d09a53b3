//! Terminal front end for the SR3D software renderer.

use std::io::{stdout, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use log::info;
use nalgebra::Vector3;
use sr3d_core::{Camera, Mesh, PerspectiveCamera, Renderer, Rgb, Screen};

pub mod screen;

pub use screen::TermScreen;

const BG_COLOR: Rgb = [255, 255, 255];

/// Field of view and depth range of the demo camera. The camera sits at
/// the origin looking along +Y; the mesh is pushed out in front of it.
const FOV: f32 = std::f32::consts::FRAC_PI_3;
const NEAR: f32 = 1.0;
const FAR: f32 = 12.0;
const MESH_DISTANCE: f32 = 6.0;

/// Interactive silhouette viewer for a single mesh.
pub struct TerminalApp {
    mesh: Mesh,
    camera: Camera,
    screen: TermScreen,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mut mesh: Mesh) -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        let screen = TermScreen::new(cols, rows);

        mesh.transform
            .set_translation(Vector3::new(0.0, MESH_DISTANCE, 0.0));

        // from_fov takes the height-to-width ratio of the surface, which
        // keeps the camera within the renderer's ratio tolerance.
        let ratio = screen.height() as f32 / screen.width() as f32;
        let camera = Camera::from(PerspectiveCamera::from_fov(FOV, NEAR, FAR, ratio));

        info!(
            "terminal surface {}x{} pixels, camera ratio {:.3}",
            screen.width(),
            screen.height(),
            camera.ratio()
        );

        Ok(Self {
            mesh,
            camera,
            screen,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.update();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.mesh.transform.rotate(0.1, 0.0, 0.0);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.mesh.transform.rotate(-0.1, 0.0, 0.0);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.mesh.transform.rotate(0.0, -0.1, 0.0);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.mesh.transform.rotate(0.0, 0.1, 0.0);
                }
                KeyCode::Char('e') => {
                    self.mesh.transform.rotate(0.0, 0.0, 0.1);
                }
                KeyCode::Char('r') => {
                    self.mesh.transform.rotate(0.0, 0.0, -0.1);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn update(&mut self) {
        // Continuous slow rotation for demo effect
        self.mesh.transform.rotate(0.01, 0.015, 0.0);
    }

    fn render(&mut self) -> Result<()> {
        Renderer::new(&self.camera, &self.mesh).render(&mut self.screen, BG_COLOR)?;

        // Draw UI overlay
        let mut stdout = stdout();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "SR3D Terminal Renderer | FPS: {:.1} | Controls: WASD/Arrows=Rotate E/R=Roll Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
