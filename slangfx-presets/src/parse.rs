use crate::error::ParsePresetError;
use crate::scale::{Scale2D, ScaleType};
use crate::{ParameterOverride, ShaderPassConfig, ShaderPreset, TextureConfig};
use rustc_hash::FxHashMap;
use slangfx_common::{FilterMode, WrapMode};
use std::path::{Path, PathBuf};

/// Split a single `key = value` line, honoring `#` comments and
/// double-quoted values (spec §4.A / §6). Returns `None` for blank lines,
/// pure comments, or lines with no `=`.
fn split_line(line: &str) -> Result<Option<(String, String)>, ParsePresetError> {
    let mut chars = line.char_indices().peekable();
    let mut in_quotes = false;
    let mut eq_pos = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => {
                return split_line(&line[..i]);
            }
            '=' if !in_quotes => {
                eq_pos = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(eq_pos) = eq_pos else {
        return Ok(None);
    };
    let key = line[..eq_pos].trim().to_string();
    if key.is_empty() {
        return Ok(None);
    }
    let mut value = line[eq_pos + 1..].trim();
    if value.starts_with('"') {
        if !value.ends_with('"') || value.len() < 2 {
            return Err(ParsePresetError::UnterminatedQuote(key));
        }
        value = &value[1..value.len() - 1];
    }
    Ok(Some((key, value.to_string())))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ParsePresetError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParsePresetError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ParsePresetError> {
    value.trim().parse().map_err(|_| ParsePresetError::InvalidInt {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ParsePresetError> {
    value.trim().parse().map_err(|_| ParsePresetError::InvalidFloat {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_scale_type(key: &str, value: &str) -> Result<ScaleType, ParsePresetError> {
    ScaleType::from_preset_token(value.trim()).ok_or_else(|| ParsePresetError::InvalidScaleType {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_wrap_mode(key: &str, value: &str) -> Result<WrapMode, ParsePresetError> {
    WrapMode::from_preset_token(value.trim()).ok_or_else(|| ParsePresetError::InvalidWrapMode {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn resolve_path(base: &Path, raw: &str) -> PathBuf {
    let p = Path::new(raw);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

pub(crate) fn parse(text: &str, base: &Path) -> Result<ShaderPreset, ParsePresetError> {
    // Duplicate keys take the last occurrence (spec §4.A); a plain map is
    // enough since insertion order doesn't matter for lookups below.
    let mut kv: FxHashMap<String, String> = FxHashMap::default();
    for line in text.lines() {
        if let Some((k, v)) = split_line(line)? {
            kv.insert(k, v);
        }
    }

    let shader_count = kv
        .get("shaders")
        .ok_or(ParsePresetError::MissingShaderCount)
        .and_then(|v| parse_u32("shaders", v))? as usize;

    let mut shaders = Vec::with_capacity(shader_count);
    for i in 0..shader_count {
        let key = format!("shader{i}");
        let Some(raw_path) = kv.get(&key) else {
            return Err(ParsePresetError::MissingShaderSource {
                declared: shader_count,
                missing: i,
            });
        };
        let name = resolve_path(base, raw_path);

        let alias = kv
            .get(&format!("alias{i}"))
            .or_else(|| kv.get(&format!("shader{i}_alias")))
            .filter(|s| !s.trim().is_empty())
            .cloned();

        let filter = match kv.get(&format!("filter_linear{i}")) {
            Some(v) => {
                if parse_bool(&format!("filter_linear{i}"), v)? {
                    FilterMode::Linear
                } else {
                    FilterMode::Nearest
                }
            }
            None => FilterMode::Unspecified,
        };

        let wrap_mode = match kv.get(&format!("wrap_mode{i}")) {
            Some(v) => parse_wrap_mode(&format!("wrap_mode{i}"), v)?,
            None => WrapMode::ClampToBorder,
        };

        let is_mipmap = kv
            .get(&format!("mipmap_input{i}"))
            .map(|v| parse_bool(&format!("mipmap_input{i}"), v))
            .transpose()?
            .unwrap_or(false);

        let is_float_framebuffer = kv
            .get(&format!("float_framebuffer{i}"))
            .map(|v| parse_bool(&format!("float_framebuffer{i}"), v))
            .transpose()?
            .unwrap_or(false);

        let is_srgb_framebuffer = kv
            .get(&format!("srgb_framebuffer{i}"))
            .map(|v| parse_bool(&format!("srgb_framebuffer{i}"), v))
            .transpose()?
            .unwrap_or(false);

        let frame_count_mod = kv
            .get(&format!("frame_count_mod{i}"))
            .map(|v| parse_u32(&format!("frame_count_mod{i}"), v))
            .transpose()?
            .unwrap_or(0);

        let is_feedback = kv
            .get(&format!("feedback_pass{i}"))
            .or_else(|| kv.get(&format!("shader{i}_feedback")))
            .map(|v| parse_bool("feedback_pass", v))
            .transpose()?
            .unwrap_or(false);

        let scaling = {
            let both = kv.get(&format!("scale_type{i}"));
            let x = if let Some(v) = kv.get(&format!("scale_type_x{i}")) {
                parse_scale_type(&format!("scale_type_x{i}"), v)?
            } else if let Some(v) = both {
                parse_scale_type(&format!("scale_type{i}"), v)?
            } else {
                ScaleType::Source
            };
            let y = if let Some(v) = kv.get(&format!("scale_type_y{i}")) {
                parse_scale_type(&format!("scale_type_y{i}"), v)?
            } else if let Some(v) = both {
                parse_scale_type(&format!("scale_type{i}"), v)?
            } else {
                ScaleType::Source
            };

            let both_scale = kv.get(&format!("scale{i}"));
            let scale_x = if let Some(v) = kv.get(&format!("scale_x{i}")) {
                parse_f32(&format!("scale_x{i}"), v)?
            } else if let Some(v) = both_scale {
                parse_f32(&format!("scale{i}"), v)?
            } else {
                1.0
            };
            let scale_y = if let Some(v) = kv.get(&format!("scale_y{i}")) {
                parse_f32(&format!("scale_y{i}"), v)?
            } else if let Some(v) = both_scale {
                parse_f32(&format!("scale{i}"), v)?
            } else {
                1.0
            };

            Scale2D {
                x,
                y,
                scale_x,
                scale_y,
            }
        };

        shaders.push(ShaderPassConfig {
            id: i,
            name,
            alias,
            filter,
            wrap_mode,
            frame_count_mod,
            scaling,
            is_mipmap,
            is_float_framebuffer,
            is_srgb_framebuffer,
            is_feedback,
        });
    }

    let mut textures = Vec::new();
    if let Some(names) = kv.get("textures") {
        for name in names.split_whitespace() {
            let Some(raw_path) = kv.get(name) else {
                continue;
            };
            let path = resolve_path(base, raw_path);
            let filter_mode = match kv.get(&format!("{name}_linear")) {
                Some(v) => {
                    if parse_bool(&format!("{name}_linear"), v)? {
                        FilterMode::Linear
                    } else {
                        FilterMode::Nearest
                    }
                }
                None => FilterMode::Unspecified,
            };
            let wrap_mode = match kv.get(&format!("{name}_wrap_mode")) {
                Some(v) => parse_wrap_mode(&format!("{name}_wrap_mode"), v)?,
                None => WrapMode::ClampToEdge,
            };
            let mipmap = kv
                .get(&format!("{name}_mipmap"))
                .map(|v| parse_bool(&format!("{name}_mipmap"), v))
                .transpose()?
                .unwrap_or(false);

            textures.push(TextureConfig {
                name: name.to_string(),
                path,
                wrap_mode,
                filter_mode,
                mipmap,
            });
        }
    }

    let mut parameters = Vec::new();
    if let Some(names) = kv.get("parameters") {
        for name in names.split_whitespace() {
            if let Some(v) = kv.get(name) {
                parameters.push(ParameterOverride {
                    name: name.to_string(),
                    value: parse_f32(name, v)?,
                });
            }
        }
    }

    Ok(ShaderPreset {
        shaders,
        textures,
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_preset() {
        let preset = ShaderPreset::parse_str(
            r#"
            # a comment
            shaders = 2
            shader0 = "pass0.slang"
            shader1 = pass1.slang
            alias0 = blur
            scale_type1 = viewport
            scale1 = 1.0
            filter_linear0 = true
            wrap_mode0 = repeat
            feedback_pass0 = true
            "#,
            "/presets",
        )
        .expect("parse");

        assert_eq!(preset.shaders.len(), 2);
        assert_eq!(preset.shaders[0].name, PathBuf::from("/presets/pass0.slang"));
        assert_eq!(preset.shaders[0].alias.as_deref(), Some("blur"));
        assert_eq!(preset.shaders[0].filter, FilterMode::Linear);
        assert_eq!(preset.shaders[0].wrap_mode, WrapMode::Repeat);
        assert!(preset.shaders[0].is_feedback);
        assert_eq!(preset.shaders[1].scaling.x, ScaleType::Viewport);
        assert_eq!(preset.shaders[1].scaling.y, ScaleType::Viewport);
    }

    #[test]
    fn missing_shaders_key_is_an_error() {
        let err = ShaderPreset::parse_str("shader0 = a.slang", "/presets").unwrap_err();
        assert!(matches!(err, ParsePresetError::MissingShaderCount));
    }

    #[test]
    fn duplicate_keys_take_last_occurrence() {
        let preset = ShaderPreset::parse_str(
            r#"
            shaders = 1
            shader0 = a.slang
            shader0 = b.slang
            "#,
            "/presets",
        )
        .unwrap();
        assert_eq!(preset.shaders[0].name, PathBuf::from("/presets/b.slang"));
    }

    #[test]
    fn textures_and_parameters_sections() {
        let preset = ShaderPreset::parse_str(
            r#"
            shaders = 0
            textures = lut1
            lut1 = lut1.png
            lut1_linear = true
            lut1_wrap_mode = repeat
            parameters = Bright
            Bright = 0.5
            "#,
            "/presets",
        )
        .unwrap();
        assert_eq!(preset.textures.len(), 1);
        assert_eq!(preset.textures[0].name, "lut1");
        assert_eq!(preset.textures[0].filter_mode, FilterMode::Linear);
        assert_eq!(preset.parameters[0].value, 0.5);
    }
}
