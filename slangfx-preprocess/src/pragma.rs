use crate::error::PreprocessError;
use crate::{Parameter, ParameterGroupDecl};
use slangfx_common::ImageFormat;
use std::path::Path;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Stage {
    Vertex,
    Fragment,
}

pub(crate) struct ScanResult {
    pub name: Option<String>,
    pub format: ImageFormat,
    pub parameters: Vec<Parameter>,
    pub parameter_groups: Vec<ParameterGroupDecl>,
    pub vertex: String,
    pub fragment: String,
}

/// Extract `#pragma` directives and split `text` into vertex/fragment stage
/// sources (spec §4.B). Everything before the first `#pragma stage` line is
/// a shared prelude emitted into both stages.
pub(crate) fn scan(text: &str, path: &Path) -> Result<ScanResult, PreprocessError> {
    let mut name: Option<String> = None;
    let mut format = ImageFormat::Unknown;
    let mut format_set = false;
    let mut parameters: Vec<Parameter> = Vec::new();
    let mut parameter_groups: Vec<ParameterGroupDecl> = Vec::new();
    let mut current_group: Option<String> = None;

    let mut prelude = String::new();
    let mut vertex_body = String::new();
    let mut fragment_body = String::new();
    let mut stage: Option<Stage> = None;
    let mut has_version = false;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version") {
            has_version = true;
        }

        if let Some(rest) = trimmed.strip_prefix("#pragma") {
            let rest = rest.trim_start();
            if let Some(value) = rest.strip_prefix("name") {
                if name.is_some() {
                    return Err(PreprocessError::MultipleNamePragma(path.to_path_buf()));
                }
                name = Some(value.trim().to_string());
                continue;
            }
            if let Some(value) = rest.strip_prefix("format") {
                if format_set {
                    return Err(PreprocessError::MultipleFormatPragma(path.to_path_buf()));
                }
                let token = value.trim();
                format = ImageFormat::from_pragma_token(token).ok_or_else(|| {
                    PreprocessError::InvalidFormatPragma(path.to_path_buf(), token.to_string())
                })?;
                format_set = true;
                continue;
            }
            if let Some(value) = rest.strip_prefix("parameter_group") {
                let decl = parse_parameter_group_pragma(value.trim(), path)?;
                current_group = Some(decl.name.clone());
                parameter_groups.push(decl);
                continue;
            }
            if let Some(value) = rest.strip_prefix("parameter") {
                let mut param = parse_parameter_pragma(value.trim(), path)?;
                param.group = current_group.clone();
                if let Some(existing) = parameters.iter().find(|p| p.id == param.id) {
                    if existing.initial != param.initial
                        || existing.minimum != param.minimum
                        || existing.maximum != param.maximum
                        || existing.step != param.step
                    {
                        return Err(PreprocessError::DuplicateParameterPragma(
                            path.to_path_buf(),
                            param.id,
                        ));
                    }
                } else {
                    parameters.push(param);
                }
                continue;
            }
            if let Some(value) = rest.strip_prefix("stage") {
                stage = Some(match value.trim() {
                    "vertex" => Stage::Vertex,
                    "fragment" => Stage::Fragment,
                    other => {
                        return Err(PreprocessError::InvalidStagePragma(
                            path.to_path_buf(),
                            other.to_string(),
                        ))
                    }
                });
                continue;
            }
            // Unrecognized pragmas (e.g. forward-compatible ones) pass
            // through untouched rather than failing the build.
        }

        match stage {
            None => {
                prelude.push_str(line);
                prelude.push('\n');
            }
            Some(Stage::Vertex) => {
                vertex_body.push_str(line);
                vertex_body.push('\n');
            }
            Some(Stage::Fragment) => {
                fragment_body.push_str(line);
                fragment_body.push('\n');
            }
        }
    }

    if !has_version {
        return Err(PreprocessError::MissingVersion(path.to_path_buf()));
    }

    let vertex = format!("{prelude}{vertex_body}");
    let fragment = format!("{prelude}{fragment_body}");

    Ok(ScanResult {
        name,
        format,
        parameters,
        parameter_groups,
        vertex,
        fragment,
    })
}

/// Parse `NAME "DESC"` (spec §3). Attaches to every `#pragma parameter`
/// pragma that follows it in the same file, until the next
/// `#pragma parameter_group` line.
fn parse_parameter_group_pragma(rest: &str, path: &Path) -> Result<ParameterGroupDecl, PreprocessError> {
    let malformed = || PreprocessError::InvalidParameterGroupPragma(path.to_path_buf(), rest.to_string());

    let rest = rest.trim_start();
    let name_end = rest.find(char::is_whitespace).ok_or_else(malformed)?;
    let name = rest[..name_end].to_string();
    let rest = rest[name_end..].trim_start();

    let rest = rest.strip_prefix('"').ok_or_else(malformed)?;
    let desc_end = rest.find('"').ok_or_else(malformed)?;
    let description = rest[..desc_end].to_string();

    Ok(ParameterGroupDecl { name, description })
}

/// Parse `NAME "DESC" INIT MIN MAX [STEP]` (spec §4.B). `NAME` has no
/// spaces; `DESC` is the sole quoted token; the remainder are floats.
fn parse_parameter_pragma(rest: &str, path: &Path) -> Result<Parameter, PreprocessError> {
    let malformed = || PreprocessError::InvalidParameterPragma(path.to_path_buf(), rest.to_string());

    let rest = rest.trim_start();
    let name_end = rest.find(char::is_whitespace).ok_or_else(malformed)?;
    let id = rest[..name_end].to_string();
    let rest = rest[name_end..].trim_start();

    let rest = rest.strip_prefix('"').ok_or_else(malformed)?;
    let desc_end = rest.find('"').ok_or_else(malformed)?;
    let description = rest[..desc_end].to_string();
    let rest = rest[desc_end + 1..].trim();

    let mut floats = rest.split_whitespace();
    let initial: f32 = floats.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let minimum: f32 = floats.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let maximum: f32 = floats.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let step: f32 = match floats.next() {
        Some(s) => s.parse().map_err(|_| malformed())?,
        None => 0.0,
    };

    Ok(Parameter {
        id,
        description,
        group: None,
        initial,
        minimum,
        maximum,
        step,
    })
}
