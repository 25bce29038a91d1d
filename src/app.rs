use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::bootstrap::{Bootstrap, DefaultRenderer};
use crate::dropzone::{DropEvent, DropSurface};
use crate::render::Renderer;
use crate::status::WindowPresenter;
use crate::viewer::Viewer;

const TITLE: &str = "glTF Drop Viewer";

pub struct App {
    bootstrap: Bootstrap,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer<DefaultRenderer>>,
    drop_surface: DropSurface,
    last_render_time: Instant,
}

impl App {
    pub fn new(bootstrap: Bootstrap) -> Self {
        App {
            bootstrap,
            window: None,
            viewer: None,
            drop_surface: DropSurface::new(),
            last_render_time: Instant::now(),
        }
    }

    pub fn create_event_loop() -> Result<EventLoop<()>, EventLoopError> {
        EventLoop::new()
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Window> {
        let attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_decorations(!self.bootstrap.context.options.kiosk);

        Ok(event_loop.create_window(attributes)?)
    }

    fn initialize_viewer(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let presenter = WindowPresenter::new(window.clone(), TITLE);
        let mut viewer = self.bootstrap.create_viewer(Box::new(presenter))?;

        self.window = Some(window);

        let startup = self.bootstrap.startup()?;
        pollster::block_on(startup.run(&mut viewer));

        self.viewer = Some(viewer);
        Ok(())
    }

    fn handle_drop_event(&mut self, event: DropEvent) {
        let viewer = match &mut self.viewer {
            Some(viewer) => viewer,
            None => return,
        };

        match event {
            DropEvent::DropStart => viewer.drop_started(),
            DropEvent::Drop(resources) => {
                pollster::block_on(viewer.load(resources));
            }
            DropEvent::DropError(message) => viewer.drop_failed(&message),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Application resumed");

        if self.window.is_some() {
            return;
        }

        let result = self
            .create_window(event_loop)
            .and_then(|window| self.initialize_viewer(Arc::new(window)));

        if let Err(error) = result {
            log::error!("Unable to start the viewer: {error:?}");
            event_loop.exit();
            return;
        }

        self.last_render_time = Instant::now();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        match &self.window {
            Some(window) if window.id() == window_id => {}
            _ => return,
        }

        if let Some(drop_event) = self.drop_surface.handle_window_event(&event) {
            self.handle_drop_event(drop_event);
        }

        if let WindowEvent::CloseRequested
        | WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
            ..
        } = event
        {
            event_loop.exit();
            return;
        }

        // The session only exists once something has been loaded.
        let renderer = match self.viewer.as_mut().and_then(Viewer::session) {
            Some(renderer) => renderer,
            None => return,
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::KeyR),
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let auto_rotate = renderer.controls().toggle_auto_rotate();
                log::info!("Auto-rotate {}", if auto_rotate { "on" } else { "off" });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::KeyC),
                        repeat: false,
                        ..
                    },
                ..
            } => {
                renderer.clear();
                log::info!("Scene cleared");
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = now - self.last_render_time;

                if renderer.update(delta_time) {
                    log::trace!("Camera at {:?}", renderer.scene().camera.translation);
                }

                self.last_render_time = now;
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                device_id: _,
                state,
                button,
            } => {
                renderer.controls().handle_mouse_input(button, state);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        let renderer = match self.viewer.as_mut().and_then(Viewer::session) {
            Some(renderer) => renderer,
            None => return,
        };

        if let DeviceEvent::MouseMotion { delta } = event {
            renderer
                .controls()
                .handle_mouse_movement(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(drop_event) = self.drop_surface.flush() {
            self.handle_drop_event(drop_event);
        }
    }
}
