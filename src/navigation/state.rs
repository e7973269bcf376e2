use std::collections::HashMap;

use url::Url;

use super::tree::{MenuEntry, MenuError, MenuTree};
use crate::domain::TransferRequest;

/// What activating a menu entry asks the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    Navigate(String),
    Download {
        label: String,
        request: TransferRequest,
    },
    Toggle(String),
}

/// Expansion state of a menu tree, tracked against the current location.
///
/// Groups open by themselves when the location enters one of their leaves
/// but only the user closes them.
#[derive(Debug, Clone)]
pub struct NavigationMenu {
    tree: MenuTree,
    location: String,
    expanded: HashMap<String, bool>,
}

impl NavigationMenu {
    pub fn new(tree: MenuTree, location: impl Into<String>) -> Self {
        let mut menu = Self {
            tree,
            location: location.into(),
            expanded: HashMap::new(),
        };
        menu.expand_active_groups();
        menu
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        let location = location.into();
        if location == self.location {
            return;
        }
        self.location = location;
        self.expand_active_groups();
    }

    /// Flips a group open or closed. Returns `false` for labels that are not
    /// groups of this tree.
    pub fn toggle(&mut self, label: &str) -> bool {
        if !has_group(self.tree.entries(), label) {
            return false;
        }
        let expanded = self.expanded.entry(label.to_string()).or_insert(false);
        *expanded = !*expanded;
        true
    }

    pub fn is_expanded(&self, label: &str) -> bool {
        self.expanded.get(label).copied().unwrap_or(false)
    }

    /// A leaf is active when the location starts with its target; a group
    /// when any leaf below it is.
    pub fn is_active(&self, entry: &MenuEntry) -> bool {
        entry.any_leaf(&|target| matches_location(target, &self.location))
    }

    /// The navigable leaf that best matches the location: the one with the
    /// longest matching target.
    pub fn current_entry(&self) -> Option<&MenuEntry> {
        let mut best: Option<&MenuEntry> = None;
        find_current(self.tree.entries(), &self.location, &mut best);
        best
    }

    pub fn activate(&self, entry: &MenuEntry, base_url: &Url) -> Result<MenuAction, MenuError> {
        match entry {
            MenuEntry::Navigate { target, .. } => Ok(MenuAction::Navigate(target.clone())),
            MenuEntry::Download {
                label,
                target,
                filename,
            } => {
                let url = base_url
                    .join(target)
                    .map_err(|source| MenuError::InvalidTarget {
                        target: target.clone(),
                        source,
                    })?;
                let request = match filename {
                    Some(name) => TransferRequest::new(url).with_filename(name.clone()),
                    None => TransferRequest::new(url),
                };
                Ok(MenuAction::Download {
                    label: label.clone(),
                    request,
                })
            }
            MenuEntry::Group { label, .. } => Ok(MenuAction::Toggle(label.clone())),
        }
    }

    fn expand_active_groups(&mut self) {
        let mut active = Vec::new();
        collect_active_groups(self.tree.entries(), &self.location, &mut active);
        for label in active {
            self.expanded.insert(label, true);
        }
    }
}

fn matches_location(target: &str, location: &str) -> bool {
    location.starts_with(target)
}

fn collect_active_groups(entries: &[MenuEntry], location: &str, out: &mut Vec<String>) {
    for entry in entries {
        if let MenuEntry::Group { label, children } = entry {
            if entry.any_leaf(&|target| matches_location(target, location)) {
                out.push(label.clone());
            }
            collect_active_groups(children, location, out);
        }
    }
}

fn find_current<'a>(entries: &'a [MenuEntry], location: &str, best: &mut Option<&'a MenuEntry>) {
    for entry in entries {
        match entry {
            MenuEntry::Navigate { target, .. } if matches_location(target, location) => {
                let longer = best
                    .and_then(MenuEntry::target)
                    .map_or(true, |current| target.len() > current.len());
                if longer {
                    *best = Some(entry);
                }
            }
            MenuEntry::Group { children, .. } => find_current(children, location, best),
            _ => {}
        }
    }
}

fn has_group(entries: &[MenuEntry], label: &str) -> bool {
    entries.iter().any(|entry| match entry {
        MenuEntry::Group { label: own, children } => own == label || has_group(children, label),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MenuTree {
        MenuTree::new(vec![
            MenuEntry::navigate("Dashboard", "/dashboard"),
            MenuEntry::group(
                "Rapat",
                vec![
                    MenuEntry::navigate("Jadwal Rapat", "/rapat"),
                    MenuEntry::navigate("Absensi", "/absensi"),
                    MenuEntry::download("Rekap Absensi", "/export-pdf/absensi"),
                ],
            ),
            MenuEntry::group(
                "Arsip",
                vec![MenuEntry::group(
                    "Arsip Proker",
                    vec![MenuEntry::navigate("Proker Lama", "/arsip/proker")],
                )],
            ),
        ])
        .unwrap()
    }

    fn base() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    #[test]
    fn test_group_expands_on_mount_for_child_location() {
        let menu = NavigationMenu::new(tree(), "/absensi");
        assert!(menu.is_expanded("Rapat"));
        assert!(!menu.is_expanded("Arsip"));
    }

    #[test]
    fn test_group_stays_open_after_leaving() {
        let mut menu = NavigationMenu::new(tree(), "/rapat");
        menu.set_location("/dashboard");
        assert!(menu.is_expanded("Rapat"));
    }

    #[test]
    fn test_location_change_expands_but_never_collapses() {
        let mut menu = NavigationMenu::new(tree(), "/dashboard");
        assert!(!menu.is_expanded("Rapat"));

        menu.set_location("/rapat/3");
        assert!(menu.is_expanded("Rapat"));

        assert!(menu.toggle("Rapat"));
        assert!(!menu.is_expanded("Rapat"));

        menu.set_location("/dashboard");
        assert!(!menu.is_expanded("Rapat"));

        menu.set_location("/absensi");
        assert!(menu.is_expanded("Rapat"));
    }

    #[test]
    fn test_nested_groups_expand_together() {
        let menu = NavigationMenu::new(tree(), "/arsip/proker/2021");
        assert!(menu.is_expanded("Arsip"));
        assert!(menu.is_expanded("Arsip Proker"));
    }

    #[test]
    fn test_toggle_unknown_label() {
        let mut menu = NavigationMenu::new(tree(), "/dashboard");
        assert!(!menu.toggle("Dashboard"));
        assert!(!menu.toggle("Nope"));
        assert!(!menu.is_expanded("Nope"));
        assert!(menu.toggle("Arsip Proker"));
        assert!(menu.is_expanded("Arsip Proker"));
    }

    #[test]
    fn test_active_highlighting() {
        let menu = NavigationMenu::new(tree(), "/rapat/12/edit");
        let entries = menu.tree().entries();

        assert!(!menu.is_active(&entries[0]));
        assert!(menu.is_active(&entries[1]));
        assert!(menu.is_active(&entries[1].children()[0]));
        assert!(!menu.is_active(&entries[1].children()[1]));
        assert!(!menu.is_active(&entries[2]));
    }

    #[test]
    fn test_current_entry_prefers_longest_target() {
        let tree = MenuTree::new(vec![
            MenuEntry::navigate("Proker", "/proker"),
            MenuEntry::group(
                "Detail",
                vec![MenuEntry::navigate("Anggaran Proker", "/proker/anggaran")],
            ),
        ])
        .unwrap();

        let menu = NavigationMenu::new(tree.clone(), "/proker/anggaran/3");
        assert_eq!(menu.current_entry().map(MenuEntry::label), Some("Anggaran Proker"));

        let menu = NavigationMenu::new(tree.clone(), "/proker/5");
        assert_eq!(menu.current_entry().map(MenuEntry::label), Some("Proker"));

        let menu = NavigationMenu::new(tree, "/galeri");
        assert_eq!(menu.current_entry(), None);
    }

    #[test]
    fn test_activate_navigate_and_group() {
        let menu = NavigationMenu::new(tree(), "/dashboard");
        let entries = menu.tree().entries();

        assert_eq!(
            menu.activate(&entries[0], &base()).unwrap(),
            MenuAction::Navigate("/dashboard".to_string())
        );
        assert_eq!(
            menu.activate(&entries[1], &base()).unwrap(),
            MenuAction::Toggle("Rapat".to_string())
        );
    }

    #[test]
    fn test_activate_download_resolves_against_base() {
        let menu = NavigationMenu::new(tree(), "/dashboard");
        let rekap = &menu.tree().entries()[1].children()[2];

        let action = menu.activate(rekap, &base()).unwrap();
        assert_eq!(
            action,
            MenuAction::Download {
                label: "Rekap Absensi".to_string(),
                request: TransferRequest::new("http://localhost:8000/export-pdf/absensi"),
            }
        );
    }

    #[test]
    fn test_activate_download_keeps_explicit_filename() {
        let entry = MenuEntry::Download {
            label: "Notulen".to_string(),
            target: "https://files.example.org/notulen/12".to_string(),
            filename: Some("notulen-12.pdf".to_string()),
        };
        let menu = NavigationMenu::new(MenuTree::new(vec![entry.clone()]).unwrap(), "/");

        match menu.activate(&entry, &base()).unwrap() {
            MenuAction::Download { request, .. } => {
                assert_eq!(request.url, "https://files.example.org/notulen/12");
                assert_eq!(request.filename.as_deref(), Some("notulen-12.pdf"));
            }
            other => panic!("expected a download, got {:?}", other),
        }
    }
}
