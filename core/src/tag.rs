//! Provenance of a loaded dataset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Source files, in the order they were read.
    pub file_name:   Vec<String>,
    /// Descriptions given at read time. Empty when none was given.
    pub description: Vec<String>,
}

impl Tag {
    pub fn new(file_name: &Path, description: Option<&str>) -> Self {
        Self {
            file_name:   vec![file_name.display().to_string()],
            description: description.map(str::to_string).into_iter().collect(),
        }
    }

    /// Merge `other` after `self`. A file already present is not repeated.
    pub fn append(&mut self, other: &Tag) {
        for name in &other.file_name {
            if !self.file_name.contains(name) {
                self.file_name.push(name.clone());
            }
        }
        self.description.extend(other.description.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name.join(" + "))?;
        if !self.description.is_empty() {
            write!(f, " ({})", self.description.join(" + "))?;
        }
        Ok(())
    }
}
