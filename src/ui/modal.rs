use iced::{
    widget::{button, column, container, progress_bar, row, text, Space},
    Element, Length,
};

use crate::application::TransferEvent;
use crate::domain::{SavedFile, TransferPhase, TransferState};

#[derive(Debug, Clone)]
pub enum ModalMessage {
    Cancel,
    Dismiss,
}

/// Progress display bound to one transfer.
pub struct ProgressModal {
    pub transfer_id: u64,
    pub title: String,
    pub state: TransferState,
    pub saved: Option<SavedFile>,
}

impl ProgressModal {
    pub fn new(transfer_id: u64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            transfer_id,
            title: title.into(),
            state: TransferState::new(url),
            saved: None,
        }
    }

    /// Folds one event into the display state. Returns the phase the
    /// transfer just entered, if any.
    pub fn apply(&mut self, event: TransferEvent) -> Option<TransferPhase> {
        let before = self.state.phase();
        match event {
            TransferEvent::Progress(progress) => {
                self.state.record(progress);
            }
            TransferEvent::Phase(phase) => {
                self.state.enter(phase);
            }
            TransferEvent::Settled(Ok(saved)) => {
                self.state.enter(TransferPhase::Done);
                self.saved = Some(saved);
            }
            TransferEvent::Settled(Err(e)) if e.is_aborted() => {
                self.state.enter(TransferPhase::Aborted);
            }
            TransferEvent::Settled(Err(e)) => {
                self.state.fail(e.to_string());
            }
        }

        let after = self.state.phase();
        (after != before).then_some(after)
    }

    pub fn view(&self) -> Element<'_, ModalMessage> {
        let body: Element<'_, ModalMessage> = match self.state.phase() {
            TransferPhase::Failed => column![
                text("Download failed").size(16),
                text(
                    self.state
                        .error_message()
                        .unwrap_or("The download could not be completed")
                )
                .style(text::danger),
                button("Dismiss")
                    .on_press(ModalMessage::Dismiss)
                    .padding([8, 16]),
            ]
            .spacing(10)
            .into(),
            TransferPhase::Done => {
                let saved = match &self.saved {
                    Some(saved) => format!("Saved {}", saved.path.display()),
                    None => "Saved".to_string(),
                };
                column![progress_bar(0.0..=100.0, 100.0), text(saved).size(14)]
                    .spacing(10)
                    .into()
            }
            _ => column![
                self.progress_view(),
                button("Cancel")
                    .on_press(ModalMessage::Cancel)
                    .style(button::secondary)
                    .padding([8, 16]),
            ]
            .spacing(10)
            .into(),
        };

        container(
            column![
                text(&self.title).size(20),
                text(self.state.phase().label()).size(14),
                Space::new().height(Length::Fixed(6.0)),
                body,
            ]
            .spacing(8),
        )
        .padding(20)
        .width(Length::Fixed(380.0))
        .style(container::rounded_box)
        .into()
    }

    fn progress_view(&self) -> Element<'_, ModalMessage> {
        let loaded = self.state.bytes_loaded();
        match (self.state.percent(), self.state.bytes_total()) {
            (Some(percent), Some(total)) => column![
                progress_bar(0.0..=100.0, percent as f32),
                row![
                    text(format!("{:.0}%", percent)).size(14),
                    Space::new().width(Length::Fill),
                    text(format!("{} / {}", format_bytes(loaded), format_bytes(total))).size(14),
                ],
            ]
            .spacing(6)
            .into(),
            // Size unknown: show the byte count only.
            _ => text(format!("{} received", format_bytes(loaded)))
                .size(14)
                .into(),
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
