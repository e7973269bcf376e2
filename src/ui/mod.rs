pub mod modal;

use iced::{
    widget::{button, column, container, row, scrollable, text, Space},
    Element, Length, Theme,
};

use crate::navigation::{MenuEntry, NavigationMenu};

pub use modal::{ModalMessage, ProgressModal};

#[derive(Debug, Clone)]
pub enum MenuMessage {
    Activate(MenuEntry),
}

const INDENT: f32 = 14.0;

pub fn sidebar(menu: &NavigationMenu) -> Element<'_, MenuMessage> {
    let entries = menu
        .tree()
        .entries()
        .iter()
        .map(|entry| entry_view(menu, entry, 0));

    container(scrollable(column(entries).spacing(4).padding(10)))
        .width(Length::Fixed(240.0))
        .height(Length::Fill)
        .style(container::bordered_box)
        .into()
}

fn entry_view<'a>(
    menu: &'a NavigationMenu,
    entry: &'a MenuEntry,
    depth: u16,
) -> Element<'a, MenuMessage> {
    let label = match entry {
        MenuEntry::Group { label, .. } => {
            let marker = if menu.is_expanded(label) { "v" } else { ">" };
            format!("{} {}", marker, label)
        }
        MenuEntry::Download { label, .. } => format!("{} (unduh)", label),
        MenuEntry::Navigate { label, .. } => label.clone(),
    };

    let line = row![
        Space::new().width(Length::Fixed(f32::from(depth) * INDENT)),
        button(text(label).size(14))
            .on_press(MenuMessage::Activate(entry.clone()))
            .style(entry_style(menu.is_active(entry)))
            .width(Length::Fill),
    ];

    match entry {
        MenuEntry::Group { label, .. } if menu.is_expanded(label) => {
            let mut group = column![line].spacing(2);
            for child in entry.children() {
                group = group.push(entry_view(menu, child, depth + 1));
            }
            group.into()
        }
        _ => line.into(),
    }
}

fn entry_style(active: bool) -> fn(&Theme, button::Status) -> button::Style {
    if active {
        button::primary
    } else {
        button::text
    }
}

/// Main area. Record pages themselves live in the web application; the
/// console only names where the user is.
pub fn page<'a, M: 'a>(menu: &'a NavigationMenu, status_message: &'a str) -> Element<'a, M> {
    let title = menu
        .current_entry()
        .map(MenuEntry::label)
        .unwrap_or("Halaman tidak dikenal");

    column![
        text(title).size(28),
        text(menu.location()).size(14),
        Space::new().height(Length::Fill),
        text(status_message).size(14),
    ]
    .padding(20)
    .spacing(10)
    .width(Length::Fill)
    .into()
}
