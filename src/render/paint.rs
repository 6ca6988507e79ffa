use crate::geom::Vec2;

/// Straight-alpha color with float channels in 0..1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Rgba = Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Clamped and rounded 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

#[inline(always)]
fn to_u8(c: f32) -> u8 {
    // NaN clamps to NaN and then casts to 0.
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Paint attached to a fill or stroke target.
///
/// Gradients are shaded by the rendering side; the mesh only carries their geometry in white.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    LinearGradient { start: Vec2, end: Vec2, stops: Vec<GradientStop> },
    RadialGradient { center: Vec2, focus: Vec2, radius: f32, stops: Vec<GradientStop> },
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Rgba::BLACK)
    }
}

impl Paint {
    /// Color baked into mesh vertices.
    pub fn vertex_color(&self) -> [u8; 4] {
        match self {
            Paint::Solid(c) => c.to_rgba8(),
            Paint::LinearGradient { .. } | Paint::RadialGradient { .. } => Rgba::WHITE.to_rgba8(),
        }
    }

    pub fn is_gradient(&self) -> bool {
        !matches!(self, Paint::Solid(_))
    }
}

/// Which build targets a draw produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PaintModes {
    pub fill: bool,
    pub stroke: bool,
}

impl PaintModes {
    pub const NONE: PaintModes = PaintModes { fill: false, stroke: false };
    pub const FILL: PaintModes = PaintModes { fill: true, stroke: false };
    pub const STROKE: PaintModes = PaintModes { fill: false, stroke: true };
    pub const BOTH: PaintModes = PaintModes { fill: true, stroke: true };

    /// OpenVG paint-mode bits: 1 = stroke, 2 = fill.
    pub fn from_bits(bits: u32) -> Self {
        Self { stroke: bits & 1 != 0, fill: bits & 2 != 0 }
    }
}
