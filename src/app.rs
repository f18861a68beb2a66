use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::ViewerConfig;
use crate::controller::SceneController;
use crate::deform::FrameScheduler;
use crate::events::ViewerIntent;
use crate::gfx::render::HeadlessRenderer;

/// Frame requests recorded by the controller, turned into redraws once the
/// event loop is about to wait
#[derive(Debug, Clone, Default)]
struct RedrawRequest(Rc<Cell<bool>>);

impl RedrawRequest {
    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl FrameScheduler for RedrawRequest {
    fn schedule_next_frame(&mut self) {
        self.0.set(true);
    }
}

pub struct AxisviewApp {
    config: ViewerConfig,
    queued: Vec<ViewerIntent>,
}

struct AppState {
    window: Option<Arc<Window>>,
    controller: SceneController,
    renderer: HeadlessRenderer,
    redraw: RedrawRequest,
    /// Set by the selection observer, consumed when the title is refreshed
    selection_presence: Rc<Cell<Option<bool>>>,
    cursor: PhysicalPosition<f64>,
    queued: Vec<ViewerIntent>,
}

impl AxisviewApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            queued: Vec::new(),
        }
    }

    /// Queue an intent to be handled once the window exists
    pub fn queue_intent(&mut self, intent: ViewerIntent) {
        self.queued.push(intent);
    }

    /// Queue a model file for import; it is read off the UI thread
    pub fn import_file(&mut self, path: impl Into<PathBuf>) {
        self.queue_intent(ViewerIntent::ImportFileRequested(path.into()));
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let redraw = RedrawRequest::default();
        let mut controller =
            SceneController::with_scheduler(self.config, Box::new(redraw.clone()));
        controller.initialize_scene();

        let selection_presence = Rc::new(Cell::new(None));
        let observer_slot = selection_presence.clone();
        controller
            .selection_mut()
            .on_selection_change(move |selected| observer_slot.set(Some(selected.is_some())));

        let mut state = AppState {
            window: None,
            controller,
            renderer: HeadlessRenderer::new(),
            redraw,
            selection_presence,
            cursor: PhysicalPosition::new(0.0, 0.0),
            queued: self.queued,
        };

        event_loop
            .run_app(&mut state)
            .context("event loop terminated with an error")?;
        log::info!(
            "Session ended after {} frames, {} buffer uploads",
            state.renderer.frames(),
            state.renderer.uploads()
        );
        Ok(())
    }
}

impl AppState {
    fn dispatch(&mut self, intent: ViewerIntent) {
        self.controller.handle_intent(intent);
        self.refresh_title();
    }

    /// Reflect selection presence in the title, which doubles as the deform control
    fn refresh_title(&mut self) {
        let Some(present) = self.selection_presence.take() else {
            return;
        };
        let Some(window) = self.window.as_ref() else {
            return;
        };

        let base = &self.controller.config().window.title;
        let selected_name = self
            .controller
            .selection()
            .selected()
            .and_then(|id| self.controller.scene().node(id))
            .map(|node| node.name.clone());
        let title = match (present, selected_name) {
            (true, Some(name)) => format!("{} - {} selected, press E to stretch", base, name),
            _ => format!("{} - click an object to select it", base),
        };
        window.set_title(&title);
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        self.controller
            .camera_manager_mut()
            .process_keyboard_event(event);

        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
            PhysicalKey::Code(KeyCode::KeyE) => self.dispatch(ViewerIntent::DeformRequested),
            PhysicalKey::Code(KeyCode::Delete | KeyCode::Backspace) => {
                self.dispatch(ViewerIntent::RemoveSelectedRequested)
            }
            _ => (),
        }
    }

    fn redraw(&mut self) {
        for outcome in self.controller.poll_imports() {
            if let Err(err) = outcome {
                if let Some(window) = self.window.as_ref() {
                    window.set_title(&format!("{} - {}", self.controller.config().window.title, err));
                }
            }
        }
        self.controller.advance();
        self.controller.render(&mut self.renderer);
        self.refresh_title();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = &self.controller.config().window;
        let attributes = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        match event_loop.create_window(attributes) {
            Ok(window) => {
                let window = Arc::new(window);
                let PhysicalSize { width, height } = window.inner_size();
                self.window = Some(window.clone());
                log::info!("Window created at {}x{}", width, height);

                self.dispatch(ViewerIntent::ViewportResized { width, height });
                for intent in std::mem::take(&mut self.queued) {
                    self.dispatch(intent);
                }
                window.request_redraw();
            }
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.dispatch(ViewerIntent::PointerDown {
                    x: self.cursor.x as f32,
                    y: self.cursor.y as f32,
                });
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::DroppedFile(path) => self.dispatch(ViewerIntent::ImportFileRequested(path)),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.dispatch(ViewerIntent::ViewportResized { width, height });
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        self.controller
            .camera_manager_mut()
            .process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.redraw.take() {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }
}
