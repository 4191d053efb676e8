use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A structure registered with an orchestrator. Never mutated after creation;
/// reloading under the same name replaces the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolecularStructure {
    pub name: String,
    pub source_id: Option<String>,
    pub file_path: Option<PathBuf>,
    pub description: String,
    #[serde(default)]
    pub chains: Vec<String>,
}

impl MolecularStructure {
    /// Structure fetched by PDB id. The name defaults to the lower-cased id.
    pub fn from_source_id(source_id: &str, name: Option<&str>) -> Self {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| source_id.to_lowercase());
        Self {
            name,
            source_id: Some(source_id.to_string()),
            file_path: None,
            description: format!("PDB structure {}", source_id.to_uppercase()),
            chains: Vec::new(),
        }
    }

    /// Structure loaded from disk. The name defaults to the file stem.
    pub fn from_file(path: &Path, name: Option<&str>) -> Self {
        let name = name.map(str::to_string).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "structure".to_string())
        });
        Self {
            name,
            source_id: None,
            file_path: Some(path.to_path_buf()),
            description: format!("Structure from {}", path.display()),
            chains: Vec::new(),
        }
    }

    /// The engine instruction that brings this structure into a session.
    pub fn load_command(&self) -> String {
        match (&self.source_id, &self.file_path) {
            (Some(id), _) => format!("fetch {}, {}", id, self.name),
            (None, Some(path)) => format!("load {}, {}", path.display(), self.name),
            (None, None) => format!("load {}", self.name),
        }
    }

    /// One-line summary used in conversational prompts.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }

    pub fn chains_label(&self) -> String {
        if self.chains.is_empty() {
            "Unknown".to_string()
        } else {
            self.chains.join(", ")
        }
    }
}
