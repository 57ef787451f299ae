use glam::Vec2;

use crate::playground::DrawShape;

/// Tools the pointer can operate with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    /// Press and sweep to spawn pooled objects
    #[default]
    Spawn,
    /// Grab a body and throw it
    Drag,
    /// Drag out a new shape
    Draw(DrawShape),
    /// Blast bodies away from the press point
    Explode,
    /// Remove bodies under the pointer
    Erase,
}

impl Tool {
    /// Every tool, for toolbars and cycling
    pub const ALL: [Tool; 8] = [
        Tool::Spawn,
        Tool::Drag,
        Tool::Draw(DrawShape::Circle),
        Tool::Draw(DrawShape::Box),
        Tool::Draw(DrawShape::Polygon),
        Tool::Draw(DrawShape::Line),
        Tool::Explode,
        Tool::Erase,
    ];

    /// Shape this tool draws, if it is a draw tool
    pub fn draw_shape(self) -> Option<DrawShape> {
        match self {
            Tool::Draw(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Spawn => "spawn",
            Tool::Drag => "drag",
            Tool::Draw(shape) => shape.name(),
            Tool::Explode => "explode",
            Tool::Erase => "erase",
        }
    }

    /// Look a tool up by name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(name))
    }
}

/// Pointer input, already mapped into world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    /// The pointer left the surface or the gesture was aborted
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("ERASE"), Some(Tool::Erase));
        assert_eq!(Tool::from_name("lasso"), None);
    }

    #[test]
    fn test_only_draw_tools_have_shapes() {
        assert_eq!(Tool::Draw(DrawShape::Line).draw_shape(), Some(DrawShape::Line));
        assert_eq!(Tool::Explode.draw_shape(), None);
    }
}
