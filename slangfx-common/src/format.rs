/// Sampler filter mode. `Unspecified` means "defer to the chain's default
/// filter", resolved by the filter chain at bind time, never by the pass
/// itself (spec §4.A / §6 `set_default_filter`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Unspecified,
    Linear,
    Nearest,
}

/// Texture wrap / address mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    ClampToBorder,
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl WrapMode {
    pub fn from_preset_token(token: &str) -> Option<WrapMode> {
        match token {
            "clamp_to_border" => Some(WrapMode::ClampToBorder),
            "clamp_to_edge" => Some(WrapMode::ClampToEdge),
            "repeat" => Some(WrapMode::Repeat),
            "mirrored_repeat" => Some(WrapMode::MirroredRepeat),
            _ => None,
        }
    }
}

/// Pixel format for an intermediate pass or LUT texture. `Unknown` means
/// "use the preset/chain default" (spec §3).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ImageFormat {
    #[default]
    Unknown,
    R8Unorm,
    R8Uint,
    R8Sint,
    R8G8Unorm,
    R8G8Uint,
    R8G8Sint,
    R8G8B8A8Unorm,
    R8G8B8A8Uint,
    R8G8B8A8Sint,
    R8G8B8A8Srgb,
    R16Uint,
    R16Sint,
    R16Sfloat,
    R16G16Uint,
    R16G16Sint,
    R16G16Sfloat,
    R16G16B16A16Uint,
    R16G16B16A16Sint,
    R16G16B16A16Sfloat,
    R32Uint,
    R32Sint,
    R32Sfloat,
    R32G32Uint,
    R32G32Sint,
    R32G32Sfloat,
    R32G32B32A32Uint,
    R32G32B32A32Sint,
    R32G32B32A32Sfloat,
    A2B10G10R10UnormPack32,
    A2R10G10B10UnormPack32,
    B8G8R8A8Unorm,
    B8G8R8A8Srgb,
}

impl ImageFormat {
    /// Maps a `#pragma format` token to an `ImageFormat`. Grounded in the
    /// slang preset family's fixed format-name table (spec §4.B).
    pub fn from_pragma_token(token: &str) -> Option<ImageFormat> {
        use ImageFormat::*;
        Some(match token {
            "R8_UNORM" => R8Unorm,
            "R8_UINT" => R8Uint,
            "R8_SINT" => R8Sint,
            "R8G8_UNORM" => R8G8Unorm,
            "R8G8_UINT" => R8G8Uint,
            "R8G8_SINT" => R8G8Sint,
            "R8G8B8A8_UNORM" => R8G8B8A8Unorm,
            "R8G8B8A8_UINT" => R8G8B8A8Uint,
            "R8G8B8A8_SINT" => R8G8B8A8Sint,
            "R8G8B8A8_SRGB" | "SRGB" => R8G8B8A8Srgb,
            "R16_UINT" => R16Uint,
            "R16_SINT" => R16Sint,
            "R16_SFLOAT" => R16Sfloat,
            "R16G16_UINT" => R16G16Uint,
            "R16G16_SINT" => R16G16Sint,
            "R16G16_SFLOAT" => R16G16Sfloat,
            "R16G16B16A16_UINT" => R16G16B16A16Uint,
            "R16G16B16A16_SINT" => R16G16B16A16Sint,
            "R16G16B16A16_SFLOAT" => R16G16B16A16Sfloat,
            "R32_UINT" => R32Uint,
            "R32_SINT" => R32Sint,
            "R32_SFLOAT" => R32Sfloat,
            "R32G32_UINT" => R32G32Uint,
            "R32G32_SINT" => R32G32Sint,
            "R32G32_SFLOAT" => R32G32Sfloat,
            "R32G32B32A32_UINT" => R32G32B32A32Uint,
            "R32G32B32A32_SINT" => R32G32B32A32Sint,
            "R32G32B32A32_SFLOAT" => R32G32B32A32Sfloat,
            "A2B10G10R10_UNORM_PACK32" => A2B10G10R10UnormPack32,
            "A2R10G10B10_UNORM_PACK32" => A2R10G10B10UnormPack32,
            "B8G8R8A8_UNORM" => B8G8R8A8Unorm,
            "B8G8R8A8_SRGB" => B8G8R8A8Srgb,
            _ => return None,
        })
    }

    pub fn is_srgb(self) -> bool {
        matches!(self, ImageFormat::R8G8B8A8Srgb | ImageFormat::B8G8R8A8Srgb)
    }

    pub fn bytes_per_pixel(self) -> usize {
        use ImageFormat::*;
        match self {
            Unknown => 0,
            R8Unorm | R8Uint | R8Sint => 1,
            R8G8Unorm | R8G8Uint | R8G8Sint | R16Uint | R16Sint | R16Sfloat => 2,
            R8G8B8A8Unorm
            | R8G8B8A8Uint
            | R8G8B8A8Sint
            | R8G8B8A8Srgb
            | B8G8R8A8Unorm
            | B8G8R8A8Srgb
            | R16G16Uint
            | R16G16Sint
            | R16G16Sfloat
            | R32Uint
            | R32Sint
            | R32Sfloat
            | A2B10G10R10UnormPack32
            | A2R10G10B10UnormPack32 => 4,
            R16G16B16A16Uint | R16G16B16A16Sint | R16G16B16A16Sfloat | R32G32Uint
            | R32G32Sint | R32G32Sfloat => 8,
            R32G32B32A32Uint | R32G32B32A32Sint | R32G32B32A32Sfloat => 16,
        }
    }
}
