//! `files:`, `dirs:` and `all:` directives.
//!
//! Rendering depends on the external path glued in front of the group:
//! - absent, absolute pattern: file names only
//! - absent, relative pattern: paths as matched
//! - present and free of globs: paths relative to it, and the group absorbs it
//! - present with globs: full matched paths, template text left alone
//!
//! An absolute pattern behind an external path is rejected.
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::error::{ErrorKind, LupError, LupResult};
use crate::parse::{has_globs, is_escaped, unescape_glob_chars, Scanner, GLOB_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Files,
    Dirs,
    All,
}

impl NodeKind {
    pub fn split_directive(term: &str) -> Option<(Self, &str)> {
        [NodeKind::Files, NodeKind::Dirs, NodeKind::All]
            .into_iter()
            .find_map(|kind| {
                term.strip_prefix(kind.name())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .map(|pattern| (kind, pattern))
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Files => "files",
            NodeKind::Dirs => "dirs",
            NodeKind::All => "all",
        }
    }

    fn accepts(self, metadata: &Metadata) -> bool {
        match self {
            NodeKind::Files => metadata.is_file(),
            NodeKind::Dirs => metadata.is_dir(),
            NodeKind::All => metadata.is_file() || metadata.is_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeExpansion {
    pub nodes: Vec<String>,
    pub absorbed: bool,
}

pub fn expand_nodes(
    kind: NodeKind,
    pattern: &str,
    external_path: Option<&str>,
) -> LupResult<NodeExpansion> {
    let absolute = is_absolute(pattern);
    if absolute && external_path.is_some() {
        return Err(LupError::new(
            ErrorKind::MixedPaths,
            "Can't mix an immediately preceding path with an absolute path in a files/dirs/all directive",
        )
        .with_context(format!("{}:{pattern}", kind.name())));
    }
    let tainted = external_path.is_some_and(has_globs);

    let glob_pattern = match external_path {
        Some(ext) if tainted => glob_literal_escapes(&join_external(ext, pattern)),
        Some(ext) => {
            let literal = Pattern::escape(&unescape_glob_chars(ext));
            join_external(&literal, &glob_literal_escapes(pattern))
        }
        None => glob_literal_escapes(pattern),
    };

    let mut matches = Vec::new();
    let entries = glob(&glob_pattern).map_err(|err| {
        LupError::new(ErrorKind::Glob, format!("Invalid pattern {glob_pattern}: {err}"))
    })?;
    for entry in entries {
        let path = entry.map_err(|err| {
            LupError::new(ErrorKind::Stat, format!("Couldn't read {}", err.path().display()))
        })?;
        let metadata = fs::metadata(&path).map_err(|err| {
            LupError::new(ErrorKind::Stat, format!("Couldn't stat {}: {err}", path.display()))
        })?;
        if kind.accepts(&metadata) {
            matches.push(path);
        }
    }
    if matches.is_empty() {
        return Err(LupError::new(
            ErrorKind::NoMatches,
            format!(
                "No nodes matched (kind:{} / pattern:{} / external path:{})",
                kind.name(),
                pattern,
                external_path.unwrap_or("")
            ),
        ));
    }
    matches.sort();

    let nodes = match external_path {
        Some(_) if tainted => matches.iter().map(|p| p.display().to_string()).collect(),
        Some(ext) => {
            let base = PathBuf::from(unescape_glob_chars(ext));
            matches
                .iter()
                .map(|p| relative_to(p, &base))
                .collect::<LupResult<Vec<_>>>()?
        }
        None if absolute => matches.iter().map(|p| file_name(p)).collect(),
        None => matches.iter().map(|p| p.display().to_string()).collect(),
    };

    Ok(NodeExpansion {
        nodes,
        absorbed: external_path.is_some() && !tainted,
    })
}

fn is_absolute(pattern: &str) -> bool {
    pattern.starts_with('/') || Path::new(pattern).is_absolute()
}

fn join_external(ext: &str, pattern: &str) -> String {
    if ext.ends_with('/') && !is_escaped(ext, ext.len() - 1) {
        format!("{ext}{pattern}")
    } else {
        format!("{ext}/{pattern}")
    }
}

/// Turn backslash-escaped metacharacters into patterns the glob crate reads literally.
fn glob_literal_escapes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut scanner = Scanner::new();
    for ch in pattern.chars() {
        let escaped = scanner.step(ch, false);
        if escaped {
            if GLOB_CHARS.contains(&ch) || ch == '[' || ch == ']' {
                out.push_str(&Pattern::escape(&ch.to_string()));
            } else {
                out.push('\\');
                out.push(ch);
            }
            continue;
        }
        if ch == '\\' && scanner.is_escaping() {
            continue;
        }
        out.push(ch);
    }
    if scanner.is_escaping() {
        out.push('\\');
    }
    out
}

fn relative_to(path: &Path, base: &Path) -> LupResult<String> {
    path.strip_prefix(base)
        .map(|rel| rel.display().to_string())
        .map_err(|_| {
            LupError::new(
                ErrorKind::Path,
                format!("{} is not inside {}", path.display(), base.display()),
            )
        })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    // x and y are files; z is a directory holding "inner".
    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("x"), "x").unwrap();
        std::fs::write(dir.path().join("y"), "y").unwrap();
        std::fs::create_dir(dir.path().join("z")).unwrap();
        std::fs::write(dir.path().join("z").join("inner"), "").unwrap();
        dir
    }

    fn root(dir: &TempDir) -> String {
        dir.path().display().to_string()
    }

    #[test]
    fn kinds_filter_matches() {
        let dir = fixture();
        let pattern = format!("{}/*", root(&dir));
        let files = expand_nodes(NodeKind::Files, &pattern, None).unwrap();
        assert_eq!(files.nodes, vec!["x", "y"]);
        assert!(!files.absorbed);
        let dirs = expand_nodes(NodeKind::Dirs, &pattern, None).unwrap();
        assert_eq!(dirs.nodes, vec!["z"]);
        let all = expand_nodes(NodeKind::All, &pattern, None).unwrap();
        assert_eq!(all.nodes, vec!["x", "y", "z"]);
    }

    #[test]
    fn external_path_is_absorbed_and_relative() {
        let dir = fixture();
        let ext = format!("{}/", root(&dir));
        let out = expand_nodes(NodeKind::All, "*", Some(&ext)).unwrap();
        assert_eq!(out.nodes, vec!["x", "y", "z"]);
        assert!(out.absorbed);

        let ext = root(&dir);
        let out = expand_nodes(NodeKind::Files, "z/*", Some(&ext)).unwrap();
        assert_eq!(out.nodes, vec!["z/inner"]);
    }

    #[test]
    fn tainted_external_path_renders_full_paths() {
        let dir = fixture();
        let ext = format!("{}/?/", root(&dir));
        let out = expand_nodes(NodeKind::Files, "*", Some(&ext)).unwrap();
        let expected = dir.path().join("z").join("inner").display().to_string();
        assert_eq!(out.nodes, vec![expected]);
        assert!(!out.absorbed);
    }

    #[test]
    fn absolute_pattern_with_external_path_is_rejected() {
        let dir = fixture();
        let pattern = format!("{}/*", root(&dir));
        let err = expand_nodes(NodeKind::Files, &pattern, Some("foo/")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MixedPaths);
    }

    #[test]
    fn zero_matches_after_filtering_is_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("only_file"), "").unwrap();
        let pattern = format!("{}/*", root(&dir));
        let err = expand_nodes(NodeKind::Dirs, &pattern, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatches);
        assert_eq!(err.exit_code(), 8);
    }

    #[test]
    fn escaped_metacharacters_match_literally() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a*b"), "").unwrap();
        std::fs::write(dir.path().join("aXb"), "").unwrap();
        let pattern = format!("{}/a\\*b", root(&dir));
        let out = expand_nodes(NodeKind::Files, &pattern, None).unwrap();
        assert_eq!(out.nodes, vec!["a*b"]);
    }

    #[test]
    fn directive_prefixes() {
        assert_eq!(
            NodeKind::split_directive("files:*.rs"),
            Some((NodeKind::Files, "*.rs"))
        );
        assert_eq!(NodeKind::split_directive("all:"), Some((NodeKind::All, "")));
        assert_eq!(NodeKind::split_directive("filesx:*"), None);
        assert_eq!(NodeKind::split_directive("lines:x"), None);
    }

    #[test]
    fn glob_escape_translation() {
        assert_eq!(glob_literal_escapes("a\\*b"), "a[*]b");
        assert_eq!(glob_literal_escapes("a\\ b"), "a\\ b");
        assert_eq!(glob_literal_escapes("*.rs"), "*.rs");
    }
}
