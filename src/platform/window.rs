use super::PlatformError;
use crate::core::events::{EventKind, KioskEvent, ShellEvent};
use crate::core::navigation::APP_NAME;
use crate::settings::{Geometry, Settings};
use crate::Kiosk;
use std::sync::Arc;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Fullscreen, Window, WindowBuilder};

/// The kiosk's single top-level window.
pub struct KioskWindow {
    window: Arc<Window>,
}

impl KioskWindow {
    pub fn new(
        target: &EventLoopWindowTarget<ShellEvent>,
        settings: &Settings,
    ) -> Result<Self, PlatformError> {
        let geometry = settings.geometry;
        let mut builder = WindowBuilder::new()
            .with_title(APP_NAME)
            .with_inner_size(LogicalSize::new(geometry.width, geometry.height));
        if let Some((x, y)) = geometry.position {
            builder = builder.with_position(PhysicalPosition::new(x, y));
        }
        if settings.start_fullscreen {
            builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = builder
            .build(target)
            .map_err(|e| PlatformError::WindowCreationFailed(e.to_string()))?;

        Ok(Self {
            window: Arc::new(window),
        })
    }

    /// Keeps the window title and fullscreen state in step with the kiosk.
    pub fn attach(&self, kiosk: &Kiosk) {
        let window = self.window.clone();
        kiosk.add_listener(EventKind::TitleChanged, move |event| {
            if let KioskEvent::TitleChanged(title) = event {
                window.set_title(title);
            }
        });

        let window = self.window.clone();
        kiosk.add_listener(EventKind::FullscreenChanged, move |event| {
            if let KioskEvent::FullscreenChanged(on) = event {
                window.set_fullscreen(on.then(|| Fullscreen::Borderless(None)));
            }
        });
    }

    /// Current size and position, in the form stored in the geometry file.
    pub fn geometry(&self) -> Geometry {
        let size: LogicalSize<u32> = self
            .window
            .inner_size()
            .to_logical(self.window.scale_factor());
        let geometry = Geometry::new(size.width.max(1), size.height.max(1));
        match self.window.outer_position() {
            Ok(position) => geometry.with_position(position.x, position.y),
            Err(_) => geometry,
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }
}
