use crate::error::PreprocessError;
use std::path::{Path, PathBuf};

/// Splice `#include "REL"` directives into `path`'s contents, recursively.
/// `stack` holds the canonicalized path of every file currently being
/// spliced (an ancestor chain), so a file including one of its own ancestors
/// is reported as a cycle rather than silently recursing forever. Diamond
/// inclusion (the same file reached via two different branches) is legal and
/// not tracked here.
pub(crate) fn splice(path: &Path, stack: &mut Vec<PathBuf>) -> Result<String, PreprocessError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if let Some(ancestor) = stack.iter().find(|p| **p == canonical) {
        return Err(PreprocessError::IncludeCycle(ancestor.clone(), canonical));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| PreprocessError::Io(path.to_path_buf(), e.to_string()))?;

    stack.push(canonical);
    let result = splice_text(&text, path, stack);
    stack.pop();
    result
}

fn splice_text(text: &str, path: &Path, stack: &mut Vec<PathBuf>) -> Result<String, PreprocessError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("#include") {
            let rest = rest.trim_start();
            if let Some(rel) = parse_quoted(rest) {
                let include_path = dir.join(rel);
                if !include_path.exists() {
                    return Err(PreprocessError::IncludeNotFound(
                        rel.to_string(),
                        path.to_path_buf(),
                    ));
                }
                out.push_str(&splice(&include_path, stack)?);
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                continue;
            }
        }
        out.push_str(line);
    }
    Ok(out)
}

fn parse_quoted(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let s = s.strip_prefix('"')?;
    let end = s.find('"')?;
    Some(&s[..end])
}
