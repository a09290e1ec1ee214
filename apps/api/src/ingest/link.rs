//! Link Resolver: turns a user-supplied Drive reference into a `RetrievalTarget`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::errors::ErrorKind;

static FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap());
static FOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/folders/([A-Za-z0-9_-]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    File,
    Folder,
}

/// What to download for one reference. Derived once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalTarget {
    pub kind: TargetKind,
    pub id: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("reference matches neither the file nor the folder pattern")]
    Unresolvable,
}

impl LinkError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UnresolvableReference
    }
}

/// Resolves a reference string. The file pattern is tried before the folder pattern.
pub fn resolve(reference: &str) -> Result<RetrievalTarget, LinkError> {
    let reference = reference.trim();

    let patterns = [
        (TargetKind::File, &*FILE_PATTERN),
        (TargetKind::Folder, &*FOLDER_PATTERN),
    ];

    patterns
        .into_iter()
        .find_map(|(kind, pattern)| {
            pattern.captures(reference).map(|caps| RetrievalTarget {
                kind,
                id: caps[1].to_string(),
            })
        })
        .ok_or(LinkError::Unresolvable)
}
