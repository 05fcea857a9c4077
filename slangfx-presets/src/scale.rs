/// How a pass's output dimension along one axis is derived (spec §3/§4.F).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ScaleType {
    #[default]
    Source,
    Absolute,
    Viewport,
}

impl ScaleType {
    pub fn from_preset_token(token: &str) -> Option<ScaleType> {
        match token {
            "source" => Some(ScaleType::Source),
            "absolute" => Some(ScaleType::Absolute),
            "viewport" => Some(ScaleType::Viewport),
            _ => None,
        }
    }
}

/// Independent X/Y scale rules for a pass's render target (spec §3).
#[derive(Debug, Copy, Clone)]
pub struct Scale2D {
    pub x: ScaleType,
    pub y: ScaleType,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Scale2D {
    fn default() -> Self {
        Scale2D {
            x: ScaleType::Source,
            y: ScaleType::Source,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}
