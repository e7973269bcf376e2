use std::sync::Arc;

use iced::{
    widget::{center, container, opaque, row, stack},
    Color, Element, Task, Theme,
};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiConfig};
use crate::application::{
    BlobSink, CancelHandle, DialogSink, DirectorySink, StreamingDownloader, TransferEvent,
};
use crate::config::AppConfig;
use crate::domain::{TransferPhase, TransferRequest};
use crate::navigation::{MenuAction, MenuTree, NavigationMenu};
use crate::ui::{self, MenuMessage, ModalMessage, ProgressModal};

/// Owns every piece of mutable UI state: menu expansion, the progress modal
/// and the cancel handle of the transfer it shows.
pub struct ConsoleApp {
    config: AppConfig,
    downloader: StreamingDownloader,
    menu: NavigationMenu,
    modal: Option<ProgressModal>,
    cancel: Option<CancelHandle>,
    next_transfer_id: u64,
    status_message: String,
}

impl ConsoleApp {
    pub fn new(config: AppConfig, tree: MenuTree) -> Self {
        let transport = Arc::new(ApiClient::new(ApiConfig {
            streaming: config.streaming,
            ..ApiConfig::default()
        }));
        let sink: Arc<dyn BlobSink> = match &config.download_dir {
            Some(dir) => Arc::new(DirectorySink::new(dir)),
            None => Arc::new(DialogSink),
        };

        Self::with_downloader(config, tree, StreamingDownloader::new(transport, sink))
    }

    pub fn with_downloader(
        config: AppConfig,
        tree: MenuTree,
        downloader: StreamingDownloader,
    ) -> Self {
        let menu = NavigationMenu::new(tree, config.start_location.clone());

        Self {
            config,
            downloader,
            menu,
            modal: None,
            cancel: None,
            next_transfer_id: 0,
            status_message: String::new(),
        }
    }

    /// Starts a transfer and opens its modal. An in-flight transfer is
    /// cancelled first.
    fn start_download(&mut self, label: String, request: TransferRequest) -> Task<Message> {
        if let Some(previous) = self.cancel.take() {
            info!("cancelling previous transfer");
            previous.cancel();
        }

        self.next_transfer_id += 1;
        let id = self.next_transfer_id;

        let (cancel, events) = self.downloader.watch(request.clone());
        self.cancel = Some(cancel);
        self.modal = Some(ProgressModal::new(id, label, request.url));
        self.status_message.clear();

        Task::run(events, move |event| Message::Transfer(id, event))
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.cancel = None;
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Menu(MenuMessage),
    Modal(ModalMessage),
    /// Event of the transfer with the given id.
    Transfer(u64, TransferEvent),
    SuccessDwellElapsed(u64),
}

pub fn update(app: &mut ConsoleApp, message: Message) -> Task<Message> {
    match message {
        Message::Menu(MenuMessage::Activate(entry)) => {
            match app.menu.activate(&entry, &app.config.base_url) {
                Ok(MenuAction::Navigate(location)) => {
                    debug!(%location, "navigate");
                    app.menu.set_location(location);
                }
                Ok(MenuAction::Toggle(label)) => {
                    app.menu.toggle(&label);
                }
                Ok(MenuAction::Download { label, request }) => {
                    return app.start_download(label, request);
                }
                Err(e) => {
                    warn!(error = %e, "menu entry cannot be opened");
                    app.status_message = e.to_string();
                }
            }
        }
        Message::Modal(ModalMessage::Cancel) => {
            if let Some(cancel) = app.cancel.take() {
                cancel.cancel();
            }
            app.close_modal();
        }
        Message::Modal(ModalMessage::Dismiss) => {
            app.close_modal();
        }
        Message::Transfer(id, event) => {
            let Some(modal) = app.modal.as_mut().filter(|m| m.transfer_id == id) else {
                // Superseded or dismissed transfer.
                return Task::none();
            };

            match &event {
                TransferEvent::Settled(Ok(saved)) => {
                    app.status_message = format!("Saved {}", saved.path.display());
                    app.cancel = None;
                }
                TransferEvent::Settled(Err(_)) => app.cancel = None,
                _ => {}
            }
            let entered = modal.apply(event);

            match entered {
                Some(TransferPhase::Done) => {
                    let dwell = app.config.success_dwell;
                    return Task::perform(
                        async move { tokio::time::sleep(dwell).await },
                        move |_| Message::SuccessDwellElapsed(id),
                    );
                }
                Some(TransferPhase::Aborted) => {
                    app.status_message = "Download cancelled".to_string();
                    app.close_modal();
                }
                _ => {}
            }
        }
        Message::SuccessDwellElapsed(id) => {
            let finished = app
                .modal
                .as_ref()
                .is_some_and(|m| m.transfer_id == id && m.state.phase() == TransferPhase::Done);
            if finished {
                app.close_modal();
            }
        }
    }
    Task::none()
}

pub fn view(app: &ConsoleApp) -> Element<'_, Message> {
    let layout = row![
        ui::sidebar(&app.menu).map(Message::Menu),
        ui::page(&app.menu, &app.status_message),
    ];

    match &app.modal {
        Some(modal) => stack![
            layout,
            opaque(center(modal.view().map(Message::Modal)).style(backdrop)),
        ]
        .into(),
        None => layout.into(),
    }
}

fn backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(
            Color {
                a: 0.6,
                ..Color::BLACK
            }
            .into(),
        ),
        ..container::Style::default()
    }
}
