#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 8-bit RGBA colour, sRGB encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

/// Index of a texture uploaded to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Texture { texture: TextureId, dst: Rect },
    Fill { rect: Rect, color: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub clear: Color,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(clear: Color) -> Self {
        Self {
            clear,
            commands: Vec::new(),
        }
    }

    pub fn fill(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Fill { rect, color });
    }

    pub fn texture(&mut self, texture: TextureId, dst: Rect) {
        self.commands.push(DrawCommand::Texture { texture, dst });
    }
}
