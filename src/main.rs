mod api;
mod app;
mod application;
mod config;
mod domain;
mod navigation;
mod ui;
mod utils;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::navigation::MenuTree;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        error!("{e}, falling back to defaults");
        AppConfig::default()
    });
    info!(base_url = %config.base_url, "console starting");

    let tree = load_menu(&config);

    iced::application(
        move || app::ConsoleApp::new(config.clone(), tree.clone()),
        app::update,
        app::view,
    )
    .title("Arts Console")
    .run()
}

fn load_menu(config: &AppConfig) -> MenuTree {
    let Some(path) = &config.menu_file else {
        return MenuTree::organization_default();
    };

    match MenuTree::load(path) {
        Ok(tree) => {
            info!(path = %path.display(), "menu loaded");
            tree
        }
        Err(e) => {
            warn!(path = %path.display(), "menu file rejected: {e}");
            MenuTree::organization_default()
        }
    }
}
