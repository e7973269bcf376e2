use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu entry without a label")]
    EmptyLabel,

    #[error("Menu entry {0:?} has no target")]
    EmptyTarget(String),

    #[error("Group label {0:?} is used more than once")]
    DuplicateGroup(String),

    #[error("Invalid menu target {target:?}: {source}")]
    InvalidTarget {
        target: String,
        source: url::ParseError,
    },

    #[error("Invalid menu file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry of the navigation tree. What an entry does is decided here,
/// when the tree is built, never by looking at its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuEntry {
    Navigate {
        label: String,
        target: String,
    },
    Download {
        label: String,
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    Group {
        label: String,
        #[serde(default)]
        children: Vec<MenuEntry>,
    },
}

impl MenuEntry {
    pub fn navigate(label: impl Into<String>, target: impl Into<String>) -> Self {
        MenuEntry::Navigate {
            label: label.into(),
            target: target.into(),
        }
    }

    pub fn download(label: impl Into<String>, target: impl Into<String>) -> Self {
        MenuEntry::Download {
            label: label.into(),
            target: target.into(),
            filename: None,
        }
    }

    pub fn group(label: impl Into<String>, children: Vec<MenuEntry>) -> Self {
        MenuEntry::Group {
            label: label.into(),
            children,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MenuEntry::Navigate { label, .. }
            | MenuEntry::Download { label, .. }
            | MenuEntry::Group { label, .. } => label,
        }
    }

    /// Target of a leaf; groups have none.
    pub fn target(&self) -> Option<&str> {
        match self {
            MenuEntry::Navigate { target, .. } | MenuEntry::Download { target, .. } => {
                Some(target.as_str())
            }
            MenuEntry::Group { .. } => None,
        }
    }

    pub fn children(&self) -> &[MenuEntry] {
        match self {
            MenuEntry::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// True if this leaf, or any leaf below this group, satisfies `pred`.
    pub fn any_leaf(&self, pred: &impl Fn(&str) -> bool) -> bool {
        match self.target() {
            Some(target) => pred(target),
            None => self.children().iter().any(|child| child.any_leaf(pred)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTree {
    entries: Vec<MenuEntry>,
}

impl MenuTree {
    pub fn new(entries: Vec<MenuEntry>) -> Result<Self, MenuError> {
        let mut groups = HashSet::new();
        validate(&entries, &mut groups)?;
        Ok(Self { entries })
    }

    /// Parses a JSON array of entries tagged with `kind`.
    pub fn from_json(json: &str) -> Result<Self, MenuError> {
        let entries: Vec<MenuEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self, MenuError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Admin dashboard menu of the arts organization.
    pub fn organization_default() -> Self {
        Self {
            entries: vec![
                MenuEntry::navigate("Dashboard", "/dashboard"),
                MenuEntry::group(
                    "Keanggotaan",
                    vec![
                        MenuEntry::navigate("Data Anggota", "/anggota"),
                        MenuEntry::navigate("Divisi", "/divisi"),
                        MenuEntry::download("Ekspor Anggota", "/export-excel/anggota"),
                    ],
                ),
                MenuEntry::group(
                    "Program Kerja",
                    vec![
                        MenuEntry::navigate("Daftar Proker", "/proker"),
                        MenuEntry::download("Laporan Proker", "/export-pdf/proker"),
                    ],
                ),
                MenuEntry::group(
                    "Rapat",
                    vec![
                        MenuEntry::navigate("Jadwal Rapat", "/rapat"),
                        MenuEntry::navigate("Absensi", "/absensi"),
                        MenuEntry::download("Rekap Absensi", "/export-pdf/absensi"),
                    ],
                ),
                MenuEntry::group(
                    "Situs Publik",
                    vec![
                        MenuEntry::navigate("Beranda", "/beranda"),
                        MenuEntry::navigate("Sejarah", "/sejarah"),
                        MenuEntry::navigate("Galeri", "/galeri"),
                    ],
                ),
            ],
        }
    }
}

fn validate<'a>(entries: &'a [MenuEntry], groups: &mut HashSet<&'a str>) -> Result<(), MenuError> {
    for entry in entries {
        let label = entry.label();
        if label.trim().is_empty() {
            return Err(MenuError::EmptyLabel);
        }

        match entry {
            MenuEntry::Group { children, .. } => {
                if !groups.insert(label) {
                    return Err(MenuError::DuplicateGroup(label.to_string()));
                }
                validate(children, groups)?;
            }
            MenuEntry::Navigate { target, .. } | MenuEntry::Download { target, .. } => {
                if target.trim().is_empty() {
                    return Err(MenuError::EmptyTarget(label.to_string()));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tree_is_valid() {
        let tree = MenuTree::organization_default();
        assert_eq!(MenuTree::new(tree.entries().to_vec()).unwrap(), tree);
    }

    #[test]
    fn test_from_json_tagged_entries() {
        let json = r#"[
            {"kind": "navigate", "label": "Dashboard", "target": "/dashboard"},
            {"kind": "group", "label": "Rapat", "children": [
                {"kind": "navigate", "label": "Jadwal", "target": "/rapat"},
                {"kind": "download", "label": "Notulen", "target": "/export-pdf/12", "filename": "notulen.pdf"}
            ]}
        ]"#;

        let tree = MenuTree::from_json(json).unwrap();
        let rapat = &tree.entries()[1];
        assert_eq!(rapat.label(), "Rapat");
        assert_eq!(rapat.target(), None);
        assert_eq!(
            rapat.children()[1],
            MenuEntry::Download {
                label: "Notulen".to_string(),
                target: "/export-pdf/12".to_string(),
                filename: Some("notulen.pdf".to_string()),
            }
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"[{"kind": "link", "label": "X", "target": "/x"}]"#;
        assert!(matches!(MenuTree::from_json(json), Err(MenuError::Parse(_))));
    }

    #[test]
    fn test_duplicate_group_labels_rejected() {
        let entries = vec![
            MenuEntry::group("Rapat", vec![MenuEntry::navigate("A", "/a")]),
            MenuEntry::group(
                "Lainnya",
                vec![MenuEntry::group("Rapat", vec![MenuEntry::navigate("B", "/b")])],
            ),
        ];
        assert!(matches!(
            MenuTree::new(entries),
            Err(MenuError::DuplicateGroup(label)) if label == "Rapat"
        ));
    }

    #[test]
    fn test_empty_label_and_target_rejected() {
        assert!(matches!(
            MenuTree::new(vec![MenuEntry::navigate(" ", "/a")]),
            Err(MenuError::EmptyLabel)
        ));
        assert!(matches!(
            MenuTree::new(vec![MenuEntry::download("Ekspor", "")]),
            Err(MenuError::EmptyTarget(label)) if label == "Ekspor"
        ));
    }

    #[test]
    fn test_any_leaf_walks_nested_groups() {
        let entry = MenuEntry::group(
            "Outer",
            vec![MenuEntry::group("Inner", vec![MenuEntry::navigate("Deep", "/deep")])],
        );
        assert!(entry.any_leaf(&|target| target == "/deep"));
        assert!(!entry.any_leaf(&|target| target == "/shallow"));
        assert!(!MenuEntry::group("Empty", vec![]).any_leaf(&|_| true));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MenuTree::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, MenuError::Io(_)));
    }
}
