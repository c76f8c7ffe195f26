use std::sync::Arc;

use dioxus::prelude::{use_signal, Signal};

use crate::config::AppConfig;
use crate::domain::entities::table_config::{TableEntry, TableRegistry};
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::query_service::QueryService;
use crate::usecase::services::table_session::TableBrowser;

/// Long-lived services handed to the UI through the launch context.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub registry: Arc<TableRegistry>,
    pub query: Arc<QueryService>,
    pub edit: Arc<EditService>,
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub auto_connecting: Signal<bool>,
    pub connected: Signal<bool>,
    pub tables: Signal<Vec<TableEntry>>,
    pub browser: Signal<TableBrowser>,
}

impl AppState {
    pub fn new(services: &AppServices) -> Self {
        let registry = services.registry.clone();
        let page_size = services.config.page_size;
        Self {
            auto_connecting: use_signal(|| true),
            connected: use_signal(|| false),
            tables: use_signal(Vec::<TableEntry>::new),
            browser: use_signal(move || TableBrowser::new(registry, page_size)),
        }
    }
}
