use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::viewport::ViewportProvider;

/// Pixel dimensions of the image a sprite displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Anchor used when placing a sprite in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Center,
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
}

impl Alignment {
    /// Local pivot of the billboard, in fractions of its size.
    pub fn pivot(self) -> Vec2 {
        match self {
            Alignment::Center => Vec2::new(0.5, 0.5),
            Alignment::LeftTop => Vec2::new(0.0, 0.0),
            Alignment::LeftBottom => Vec2::new(0.0, 1.0),
            Alignment::RightTop => Vec2::new(1.0, 0.0),
            Alignment::RightBottom => Vec2::new(1.0, 1.0),
        }
    }
}

/// Screen aligned billboard positioned in normalized viewport coordinates.
///
/// Positions are given in `[-1, 1]` per axis and mapped onto half the
/// viewport width and height. The height scale is corrected by the ratio of
/// the current viewport aspect to the aspect recorded at construction, so the
/// host must call [`ScreenSprite::on_resize_window`] whenever the viewport
/// changes.
pub struct ScreenSprite {
    viewport: Arc<dyn ViewportProvider + Send + Sync>,
    texture: Texture,
    fog: bool,
    depth: f32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    init_screen_aspect: f32,
    position: Vec3,
    center: Vec2,
    scale: Vec3,
}

impl std::fmt::Debug for ScreenSprite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenSprite")
            .field("texture", &self.texture)
            .field("depth", &self.depth)
            .field("position", &self.position)
            .field("center", &self.center)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl ScreenSprite {
    /// Creates a centered sprite sized to the texture's native dimensions.
    pub fn new(
        texture: Texture,
        depth: f32,
        fog: bool,
        viewport: Arc<dyn ViewportProvider + Send + Sync>,
    ) -> Self {
        let screen_aspect = viewport.aspect();
        let width = texture.width as f32;
        let height = texture.height as f32 * screen_aspect;
        Self {
            viewport,
            texture,
            fog,
            depth,
            x: 0.0,
            y: 0.0,
            width,
            height,
            init_screen_aspect: screen_aspect,
            position: Vec3::new(0.0, 0.0, depth),
            center: Alignment::Center.pivot(),
            scale: Vec3::new(width, height, depth),
        }
    }

    pub fn set_pos(&mut self, x: f32, y: f32, align: Alignment) {
        self.center = align.pivot();
        self.x = x;
        self.y = y;
        self.place();
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.rescale();
    }

    /// Takes effect on the next call to `set_pos`, `set_size` or
    /// `on_resize_window`.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
    }

    pub fn on_resize_window(&mut self) {
        self.rescale();
        self.place();
    }

    pub fn texture(&self) -> Texture {
        self.texture
    }

    pub fn fog(&self) -> bool {
        self.fog
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Normalized coordinates last passed to `set_pos`.
    pub fn normalized_pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Transform of a unit quad spanning `[-0.5, 0.5]`, pivot applied.
    pub fn model_matrix(&self) -> Mat4 {
        let pivot = Vec3::new(0.5 - self.center.x, 0.5 - self.center.y, 0.0);
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
            * Mat4::from_translation(pivot)
    }

    fn place(&mut self) {
        let (width, height) = self.viewport.viewport_size();
        let half_width = width as f32 / 2.0;
        let half_height = height as f32 / 2.0;
        self.position = Vec3::new(half_width * self.x, half_height * self.y, self.depth);
    }

    fn rescale(&mut self) {
        let screen_aspect = self.viewport.aspect();
        self.scale = Vec3::new(
            self.width,
            self.height * screen_aspect / self.init_screen_aspect,
            self.depth,
        );
    }
}
