use std::sync::Arc;

use parking_lot::RwLock;
use winit::dpi::PhysicalSize;

/// Provides the current viewport dimensions in pixels.
pub trait ViewportProvider: Send + Sync {
    fn viewport_size(&self) -> (u32, u32);

    /// Width over height, guarded against a zero height.
    fn aspect(&self) -> f32 {
        let (width, height) = self.viewport_size();
        width as f32 / height.max(1) as f32
    }
}

/// Simple viewport that always reports the same resolution.
#[derive(Debug, Clone, Copy)]
pub struct StaticViewport {
    pub width: u32,
    pub height: u32,
}

impl StaticViewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ViewportProvider for StaticViewport {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Viewport backed by a window whose size changes at runtime.
///
/// The host feeds resize events through [`WindowViewport::update`] or
/// [`WindowViewport::resize`]; readers only ever see dimensions of at
/// least one pixel.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }

    pub fn resize(&self, size: PhysicalSize<u32>) {
        self.update(size.width, size.height);
    }
}

impl From<PhysicalSize<u32>> for WindowViewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl ViewportProvider for WindowViewport {
    fn viewport_size(&self) -> (u32, u32) {
        *self.size.read()
    }
}

impl<T> ViewportProvider for Arc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }
}
