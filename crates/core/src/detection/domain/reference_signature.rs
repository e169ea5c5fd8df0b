use std::path::{Path, PathBuf};

/// The embedding of the person being searched for, taken from the
/// reference photograph. Built once per run and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceSignature {
    embedding: Vec<f32>,
    source_path: PathBuf,
}

impl ReferenceSignature {
    pub fn new(embedding: Vec<f32>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            embedding,
            source_path: source_path.into(),
        }
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}
