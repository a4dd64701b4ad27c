// SPDX-License-Identifier: MIT OR Apache-2.0
//! Token vector libraries loaded from JSON or RON files.

use crate::error::CliError;
use indexmap::IndexMap;
use prompt_math_expr::{TokenLookup, Vector};
use prompt_math_schedule::TokenIndex;
use std::path::Path;

/// Named vectors in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenLibrary {
    vectors: IndexMap<String, Vector>,
}

impl TokenLibrary {
    /// Build a library from in-memory vectors
    #[cfg(test)]
    pub fn from_vectors(vectors: impl IntoIterator<Item = (String, Vector)>) -> Self {
        Self {
            vectors: vectors.into_iter().collect(),
        }
    }

    /// Load a `token -> [f32]` map, format chosen by file extension
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let vectors: IndexMap<String, Vector> = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|err| CliError::Library {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?,
            Some("ron") => ron::from_str(&content).map_err(|err| CliError::Library {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?,
            _ => {
                return Err(CliError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        if vectors.is_empty() {
            return Err(CliError::Library {
                path: path.to_path_buf(),
                message: "library must contain at least one entry".into(),
            });
        }
        let library = Self { vectors };
        tracing::info!(path = %path.display(), tokens = library.vectors.len(), "loaded token library");
        Ok(library)
    }

    /// Vector stored for `token`
    pub fn get(&self, token: &str) -> Option<&Vector> {
        self.vectors.get(token)
    }

    /// Vector used for unresolved tokens.
    ///
    /// The named pad token when configured, otherwise zeros shaped like the
    /// first entry.
    pub fn pad_vector(&self, pad_token: Option<&str>) -> Result<Option<Vector>, CliError> {
        match pad_token.filter(|token| !token.is_empty()) {
            Some(token) => self
                .get(token)
                .cloned()
                .map(Some)
                .ok_or_else(|| CliError::MissingPadToken(token.to_string())),
            None => Ok(self.vectors.values().next().map(Vector::zeros_like)),
        }
    }
}

impl TokenLookup for TokenLibrary {
    fn lookup(&self, token: &str, _encoder: &str) -> Option<Vector> {
        self.get(token).cloned()
    }

    fn indices(&self, token: &str, _encoder: &str) -> Vec<TokenIndex> {
        self.vectors
            .get_index_of(token)
            .and_then(|index| i64::try_from(index).ok())
            .map(|index| vec![TokenIndex::Position(index)])
            .unwrap_or_default()
    }
}
