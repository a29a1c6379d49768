//! Windowed application: winit event loop around a [`FrameDriver`].
//!
//! Controls:
//! - `W`/`S` tilt the bowl forward and back, `A`/`D` tilt it sideways
//! - `R` levels the bowl and restores the initial particles
//! - `Space` pauses, `Escape` quits
//! - left-drag orbits the camera, the wheel zooms

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::driver::FrameDriver;
use crate::error::RunError;
use crate::gpu::WgpuBackend;
use crate::renderer::ParticleRenderer;
use crate::scene::SceneConfig;
use crate::simulation::FluidSim;
use crate::tilt::{TiltController, TiltInput};
use crate::time::Time;

/// Tilt keys currently held down.
#[derive(Debug, Clone, Copy, Default)]
struct HeldKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
}

impl HeldKeys {
    fn tilt_input(&self) -> TiltInput {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        TiltInput::new(axis(self.forward, self.back), axis(self.left, self.right))
    }
}

pub struct App {
    scene: SceneConfig,
    window: Option<Arc<Window>>,
    driver: Option<FrameDriver<TiltController, WgpuBackend>>,
    time: Time,
    keys: HeldKeys,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<RunError>,
}

impl App {
    pub fn new(scene: SceneConfig) -> Self {
        Self {
            scene,
            window: None,
            driver: None,
            time: Time::new(),
            keys: HeldKeys::default(),
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title("soup")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let mut backend = pollster::block_on(WgpuBackend::new(window.clone(), &self.scene.display))?;
        backend.camera.target = self.scene.container_center;

        let sim = FluidSim::with_source(&self.scene.spawn, self.scene.simulation)?;
        let mut renderer = ParticleRenderer::new(self.scene.display.clone());
        renderer.initialize_from_settings(&mut backend)?;

        self.driver = Some(FrameDriver::new(
            sim,
            renderer,
            self.scene.tilt_controller(),
            backend,
        ));
        self.window = Some(window);
        self.time.reset();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{}", error);
        self.error = Some(error);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(driver) = &mut self.driver {
            driver.teardown();
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;
        match code {
            KeyCode::KeyW => self.keys.forward = pressed,
            KeyCode::KeyS => self.keys.back = pressed,
            KeyCode::KeyA => self.keys.left = pressed,
            KeyCode::KeyD => self.keys.right = pressed,
            KeyCode::KeyR if pressed && !event.repeat => {
                if let Some(driver) = &mut self.driver {
                    if let Err(e) = driver.reset() {
                        self.fail(event_loop, e.into());
                        return;
                    }
                    log::info!("bowl levelled and particles reset");
                }
            }
            KeyCode::Space if pressed && !event.repeat => {
                self.time.toggle_pause();
                log::info!("{}", if self.time.is_paused() { "paused" } else { "resumed" });
            }
            KeyCode::Escape if pressed => self.shutdown(event_loop),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        let dt = self.time.update();
        driver.provider_mut().set_input(self.keys.tilt_input());

        match driver.backend_mut().begin_frame() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let backend = driver.backend_mut();
                let size = PhysicalSize::new(backend.config.width, backend.config.height);
                backend.resize(size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                self.shutdown(event_loop);
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {:?}", e);
                return;
            }
        }

        let status = driver.tick(dt);
        driver.backend_mut().end_frame();
        if let Err(e) = status {
            self.fail(event_loop, e.into());
            return;
        }

        if self.time.frame() % 30 == 0 {
            if let (Some(window), Ok(count)) = (&self.window, driver.sim().particle_count()) {
                window.set_title(&format!("soup - {} particles - {:.0} fps", count, self.time.fps()));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() && self.error.is_none() {
            if let Err(e) = self.start(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(driver) = &mut self.driver {
                    driver.backend_mut().resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let (Some((last_x, last_y)), Some(driver)) = (self.last_mouse_pos, &mut self.driver) {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        driver.backend_mut().camera.orbit(dx, dy);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.02,
                };
                if let Some(driver) = &mut self.driver {
                    driver.backend_mut().camera.zoom(lines);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(driver) = &mut self.driver {
            driver.teardown();
        }
    }
}

/// Open a window and run `scene` until it is closed.
pub fn run(scene: SceneConfig) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys_map_to_tilt() {
        let keys = HeldKeys {
            forward: true,
            left: true,
            ..Default::default()
        };
        assert_eq!(keys.tilt_input(), TiltInput::new(1.0, 1.0));

        let opposed = HeldKeys {
            left: true,
            right: true,
            back: true,
            ..Default::default()
        };
        assert_eq!(opposed.tilt_input(), TiltInput::new(-1.0, 0.0));
    }
}
