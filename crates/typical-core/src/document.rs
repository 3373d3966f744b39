//! Stable document identifiers and relative path resolution

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a schema document: a `/`-separated path.
///
/// Identifiers are normalized on construction so that `a/./b.t`,
/// `a/c/../b.t` and `a\b.t` all name the same document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize(&path.as_ref().replace('\\', "/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory part of the identifier, without a trailing separator
    pub fn directory(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) => "/",
            Some(pos) => &self.0[..pos],
            None => "",
        }
    }

    /// File name part of the identifier
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Resolve `relative` against the directory containing this document
    pub fn join(&self, relative: &str) -> DocumentId {
        let relative = relative.replace('\\', "/");
        if relative.starts_with('/') {
            return DocumentId::new(relative);
        }

        match self.directory() {
            "" => DocumentId::new(relative),
            "/" => DocumentId::new(format!("/{}", relative)),
            dir => DocumentId::new(format!("{}/{}", dir, relative)),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for DocumentId {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` above the root of an absolute path stays at the root
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}
