use std::{collections::HashSet, path::Path};

use serde::Deserialize;

use super::yaml::load_yaml;
use crate::shell::WindowIdentity;

#[derive(Debug, Default, Deserialize)]
struct ExcludeFile {
    #[serde(default, alias = "classes", alias = "class_names")]
    class: Vec<String>,
    #[serde(default, alias = "titles")]
    title: Vec<String>,
    #[serde(default, alias = "files", alias = "file_names")]
    file: Vec<String>,
}

/// Windows that never count as "maximised" for taskbar purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    class_names: HashSet<String>,
    title_fragments: Vec<String>,
    /// Stored lowercased.
    file_names: HashSet<String>,
}

impl Blacklist {
    pub fn load(path: &Path) -> Option<Self> {
        let value = load_yaml(path)?;
        let parsed: ExcludeFile = serde_yaml::from_value(value).ok()?;
        Some(Self::from_lists(parsed.class, parsed.title, parsed.file))
    }

    pub fn from_lists<C, T, F>(classes: C, titles: T, files: F) -> Self
    where
        C: IntoIterator<Item = String>,
        T: IntoIterator<Item = String>,
        F: IntoIterator<Item = String>,
    {
        Self {
            class_names: classes.into_iter().filter(|c| !c.is_empty()).collect(),
            title_fragments: titles.into_iter().filter(|t| !t.is_empty()).collect(),
            file_names: files
                .into_iter()
                .filter(|f| !f.is_empty())
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.class_names.is_empty() && self.title_fragments.is_empty() && self.file_names.is_empty()
    }

    pub fn is_blacklisted(&self, window: &WindowIdentity) -> bool {
        if self.class_names.contains(&window.class_name) {
            return true;
        }

        if self.title_fragments.iter().any(|t| window.title.contains(t.as_str())) {
            return true;
        }

        !window.file_name.is_empty() && self.file_names.contains(&window.file_name.to_lowercase())
    }
}
