//! Preprocessing of a single `.slang` pass source: `#include` splicing,
//! `#pragma` extraction, and vertex/fragment stage separation (spec §4.B).

mod error;
mod include;
mod pragma;

pub use error::PreprocessError;

use slangfx_common::ImageFormat;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: String,
    pub description: String,
    /// The name of the `#pragma parameter_group` this parameter fell under
    /// at the point it was declared, or `None` for the implicit default
    /// group (spec §3/§4.B).
    pub group: Option<String>,
    pub initial: f32,
    pub minimum: f32,
    pub maximum: f32,
    pub step: f32,
}

/// A `#pragma parameter_group NAME "DESC"` declaration (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroupDecl {
    pub name: String,
    pub description: String,
}

/// The fully preprocessed output of one pass source file.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub name: Option<String>,
    pub format: ImageFormat,
    pub parameters: Vec<Parameter>,
    pub parameter_groups: Vec<ParameterGroupDecl>,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn load(path: impl AsRef<Path>) -> Result<ShaderSource, PreprocessError> {
        let path = path.as_ref();
        let mut stack = Vec::new();
        let spliced = include::splice(path, &mut stack)?;
        let scanned = pragma::scan(&spliced, path)?;
        Ok(ShaderSource {
            name: scanned.name,
            format: scanned.format,
            parameters: scanned.parameters,
            parameter_groups: scanned.parameter_groups,
            vertex: scanned.vertex,
            fragment: scanned.fragment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let p = dir.join(name);
        fs::write(&p, contents).unwrap();
        p
    }

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("slangfx-preprocess-test-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn splits_stages_and_shares_prelude() {
        let dir = scratch_dir("splits");
        let path = write(
            &dir,
            "a.slang",
            "#version 450\n\
             #pragma name Test\n\
             layout(location = 0) out vec4 FragColor;\n\
             #pragma stage vertex\n\
             void vmain() {}\n\
             #pragma stage fragment\n\
             void main() { FragColor = vec4(1.0); }\n",
        );
        let source = ShaderSource::load(&path).unwrap();
        assert_eq!(source.name.as_deref(), Some("Test"));
        assert!(source.vertex.contains("vmain"));
        assert!(!source.vertex.contains("FragColor = vec4"));
        assert!(source.fragment.contains("FragColor = vec4"));
        assert!(source.fragment.contains("layout(location = 0) out vec4 FragColor;"));
    }

    #[test]
    fn missing_version_is_an_error() {
        let dir = scratch_dir("missing-version");
        let path = write(&dir, "a.slang", "void main() {}\n");
        let err = ShaderSource::load(&path).unwrap_err();
        assert!(matches!(err, PreprocessError::MissingVersion(_)));
    }

    #[test]
    fn resolves_includes_recursively() {
        let dir = scratch_dir("includes");
        write(&dir, "common.slang", "const float kScale = 2.0;\n");
        let path = write(
            &dir,
            "a.slang",
            "#version 450\n#include \"common.slang\"\nvoid main() {}\n",
        );
        let source = ShaderSource::load(&path).unwrap();
        assert!(source.fragment.contains("kScale"));
    }

    #[test]
    fn include_cycle_is_rejected() {
        let dir = scratch_dir("cycle");
        write(&dir, "a.slang", "#version 450\n#include \"b.slang\"\n");
        write(&dir, "b.slang", "#include \"a.slang\"\n");
        let err = ShaderSource::load(dir.join("a.slang")).unwrap_err();
        assert!(matches!(err, PreprocessError::IncludeCycle(_, _)));
    }

    #[test]
    fn duplicate_parameter_with_same_values_is_accepted() {
        let dir = scratch_dir("dup-param-ok");
        let path = write(
            &dir,
            "a.slang",
            "#version 450\n\
             #pragma parameter Bright \"Brightness\" 1.0 0.0 2.0 0.1\n\
             #pragma parameter Bright \"Brightness\" 1.0 0.0 2.0 0.1\n\
             void main() {}\n",
        );
        let source = ShaderSource::load(&path).unwrap();
        assert_eq!(source.parameters.len(), 1);
    }

    #[test]
    fn duplicate_parameter_with_conflicting_values_is_an_error() {
        let dir = scratch_dir("dup-param-bad");
        let path = write(
            &dir,
            "a.slang",
            "#version 450\n\
             #pragma parameter Bright \"Brightness\" 1.0 0.0 2.0 0.1\n\
             #pragma parameter Bright \"Brightness\" 0.5 0.0 2.0 0.1\n\
             void main() {}\n",
        );
        let err = ShaderSource::load(&path).unwrap_err();
        assert!(matches!(err, PreprocessError::DuplicateParameterPragma(_, _)));
    }
}
