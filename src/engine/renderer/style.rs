// Render hints carried by bodies

/// Linear RGBA color, components in 0..=1
pub type Rgba = [f32; 4];

/// Build an opaque color from a 0xRRGGBB literal
pub fn rgb(hex: u32) -> Rgba {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Opacity of a body while it is being dragged
pub const DRAG_OPACITY: f32 = 0.7;

/// Outline drawn around a hovered body
pub const HOVER_OUTLINE: Outline = Outline {
    color: [1.0, 1.0, 1.0, 1.0],
    width: 2.0,
};

/// Visual effects toggled by the interaction tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Body follows the pointer
    Drag,
    /// Pointer rests over the body
    Hover,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub color: Rgba,
    pub width: f32,
}

/// How a body should be painted. Has no physical effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderHints {
    pub fill: Rgba,
    pub opacity: f32,
    pub outline: Option<Outline>,
}

impl RenderHints {
    pub fn filled(fill: Rgba) -> Self {
        Self {
            fill,
            opacity: 1.0,
            outline: None,
        }
    }

    /// Switch an effect on or off
    pub fn set_effect(&mut self, effect: Effect, active: bool) {
        match effect {
            Effect::Drag => self.opacity = if active { DRAG_OPACITY } else { 1.0 },
            Effect::Hover => self.outline = active.then_some(HOVER_OUTLINE),
        }
    }
}

impl Default for RenderHints {
    fn default() -> Self {
        Self::filled(rgb(0x888888))
    }
}
