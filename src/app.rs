use std::time::Duration;

use dioxus::prelude::*;

use crate::domain::entities::table_config::{DisplayColumn, TableEntry};
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::{AppServices, AppState};
use crate::usecase::ports::source::{ConnectParams, SourceError};
use crate::usecase::services::page_loader::LoadTicket;
use crate::usecase::services::row_editor::{SaveOutcome, SavePlan};
use crate::usecase::services::table_session::TableBrowser;

const NOTICE_DURATION: Duration = Duration::from_secs(2);

fn header_cell_style() -> &'static str {
    "position: sticky; top: 0; z-index: 1; background: #f3f4f6; border-bottom: 1px solid #ccc; padding: 6px 8px; text-align: left; white-space: nowrap;"
}

fn body_cell_style() -> &'static str {
    "border-bottom: 1px solid #eee; padding: 4px 8px; white-space: nowrap;"
}

fn error_style() -> &'static str {
    "color: #b91c1c; background: #fef2f2; border: 1px solid #fecaca; padding: 6px 10px; margin: 6px 0;"
}

async fn connect_source(
    services: AppServices,
    params: ConnectParams,
) -> Result<Vec<TableEntry>, SourceError> {
    let query = services.query.clone();
    let available = run_blocking(move || query.connect(&params)).await?;
    Ok(services.registry.configured_tables(&available))
}

async fn load_page(mut browser: Signal<TableBrowser>, services: AppServices, ticket: LoadTicket) {
    let query = services.query.clone();
    let page_query = ticket.query();
    let result = run_blocking(move || query.fetch_page(&page_query)).await;
    browser.write().finish_load(&ticket, result);
}

fn spawn_load(browser: Signal<TableBrowser>, services: AppServices, ticket: Option<LoadTicket>) {
    if let Some(ticket) = ticket {
        spawn(load_page(browser, services, ticket));
    }
}

/// Writes the changed fields, then reloads the page once every write is done.
async fn save_row(mut browser: Signal<TableBrowser>, services: AppServices, plan: SavePlan) {
    let edit = services.edit.clone();
    let requests = plan.requests.clone();
    let result = run_blocking(move || edit.submit(&requests)).await;

    let (outcome, reload) = browser.write().finish_save(&plan, result);
    if let Some(ticket) = reload {
        load_page(browser, services, ticket).await;
    }

    if matches!(outcome, SaveOutcome::Saved { .. }) {
        let shown = browser.read().notice().map(str::to_string);
        tokio::time::sleep(NOTICE_DURATION).await;
        let still_shown = browser.read().notice().map(str::to_string);
        if shown.is_some() && shown == still_shown {
            browser.write().clear_notice();
        }
    }
}

#[component]
pub fn App() -> Element {
    let services = use_context::<AppServices>();
    let AppState {
        mut auto_connecting,
        mut connected,
        mut tables,
        mut browser,
    } = AppState::new(&services);

    let services_for_auto_connect = services.clone();
    use_future(move || {
        let services = services_for_auto_connect.clone();
        async move {
            let params = services.config.connection.clone();
            match connect_source(services, params).await {
                Ok(listed) => {
                    tables.set(listed);
                    connected.set(true);
                }
                Err(err) => {
                    tracing::info!(
                        error = %err,
                        "automatic connection failed, showing connect form"
                    );
                }
            }
            auto_connecting.set(false);
        }
    });

    if auto_connecting() {
        return rsx! {
            div {
                style: "height: 100vh; display: flex; align-items: center; justify-content: center; color: #555;",
                "正在連接資料庫..."
            }
        };
    }

    if !connected() {
        let defaults = services.config.connection.clone();
        return rsx! {
            ConnectForm {
                defaults,
                on_connected: move |listed: Vec<TableEntry>| {
                    browser.write().clear();
                    tables.set(listed);
                    connected.set(true);
                },
            }
        };
    }

    let services_for_select = services.clone();
    let services_for_disconnect = services.clone();
    let selected = browser.read().selected_table().map(str::to_string);
    let has_selection = selected.is_some();

    rsx! {
        div { style: "height: 100vh; display: flex; font-family: sans-serif;",
            Sidebar {
                tables: tables(),
                selected,
                on_select: move |table: String| {
                    let ticket = browser.write().select_table(&table);
                    spawn_load(browser, services_for_select.clone(), Some(ticket));
                },
                on_disconnect: move |_| {
                    services_for_disconnect.query.disconnect();
                    browser.write().clear();
                    tables.set(Vec::new());
                    connected.set(false);
                },
            }
            main { style: "flex: 1; min-width: 0; display: flex; flex-direction: column; padding: 12px;",
                if has_selection {
                    DataTable { browser }
                } else {
                    div { style: "margin: auto; color: #888;", "請從左側選擇一個資料表" }
                }
            }
        }
    }
}

#[component]
fn ConnectForm(defaults: ConnectParams, on_connected: EventHandler<Vec<TableEntry>>) -> Element {
    let services = use_context::<AppServices>();
    let mut host = use_signal(|| defaults.host.clone());
    let mut port = use_signal(|| defaults.port.to_string());
    let mut user = use_signal(|| defaults.user.clone());
    let mut password = use_signal(|| defaults.password.clone());
    let mut database = use_signal(|| defaults.database.clone());
    let mut busy = use_signal(|| false);
    let mut error = use_signal(String::new);

    let submit = move |_: MouseEvent| {
        let services = services.clone();
        let Ok(port_number) = port().trim().parse::<u16>() else {
            error.set(format!("無效的連接埠: {}", port()));
            return;
        };
        let params = ConnectParams {
            host: host(),
            port: port_number,
            user: user(),
            password: password(),
            database: database(),
        };
        busy.set(true);
        error.set(String::new());
        spawn(async move {
            let result = connect_source(services, params).await;
            busy.set(false);
            match result {
                Ok(listed) => on_connected.call(listed),
                Err(err) => error.set(err.to_string()),
            }
        });
    };

    rsx! {
        div { style: "height: 100vh; display: flex; align-items: center; justify-content: center; font-family: sans-serif;",
            div { style: "width: 320px; border: 1px solid #ccc; padding: 20px; display: flex; flex-direction: column; gap: 8px;",
                h2 { style: "margin: 0 0 8px;", "連接資料庫" }
                label { "主機"
                    input { value: "{host}", oninput: move |evt| host.set(evt.value()) }
                }
                label { "連接埠"
                    input { r#type: "number", value: "{port}", oninput: move |evt| port.set(evt.value()) }
                }
                label { "使用者"
                    input { value: "{user}", oninput: move |evt| user.set(evt.value()) }
                }
                label { "密碼"
                    input { r#type: "password", value: "{password}", oninput: move |evt| password.set(evt.value()) }
                }
                label { "資料庫"
                    input { value: "{database}", oninput: move |evt| database.set(evt.value()) }
                }
                if !error().is_empty() {
                    div { style: error_style(), "{error}" }
                }
                button { disabled: busy(), onclick: submit,
                    if busy() { "連接中..." } else { "連接" }
                }
            }
        }
    }
}

#[component]
fn Sidebar(
    tables: Vec<TableEntry>,
    selected: Option<String>,
    on_select: EventHandler<String>,
    on_disconnect: EventHandler<()>,
) -> Element {
    rsx! {
        aside { style: "width: 220px; border-right: 1px solid #ddd; display: flex; flex-direction: column;",
            div { style: "display: flex; align-items: center; justify-content: space-between; padding: 10px;",
                span { style: "font-weight: 600;", "資料表" }
                button { onclick: move |_| on_disconnect.call(()), "中斷連線" }
            }
            nav { style: "overflow: auto;",
                for entry in tables {
                    {
                        let active = selected.as_deref() == Some(entry.name.as_str());
                        let name = entry.name.clone();
                        let background = if active { "#e0e7ff" } else { "transparent" };
                        rsx! {
                            div {
                                key: "{entry.name}",
                                title: "{entry.name}",
                                style: "padding: 8px 12px; cursor: pointer; background: {background};",
                                onclick: move |_| on_select.call(name.clone()),
                                "{entry.title}"
                            }
                        }
                    }
                }
            }
        }
    }
}

struct RenderedRow {
    index: usize,
    cells: Vec<Option<String>>,
}

#[component]
fn DataTable(browser: Signal<TableBrowser>) -> Element {
    let services = use_context::<AppServices>();
    let mut browser = browser;
    let state = browser.read();
    let loader = state.loader();

    if loader.is_blocking() {
        return rsx! {
            div { style: "margin: auto; color: #555;", "載入中..." }
        };
    }

    let services_for_retry = services.clone();
    let load_error = loader.error().map(str::to_string);
    let Some(row_set) = state.row_set() else {
        return rsx! {
            if let Some(message) = load_error {
                div { style: error_style(), "{message}" }
                button {
                    onclick: move |_| {
                        let ticket = browser.write().retry();
                        spawn_load(browser, services_for_retry.clone(), ticket);
                    },
                    "重試"
                }
            }
        };
    };

    let title = state.title();
    let total = row_set.total;
    let page_row_count = row_set.rows.len();
    let columns: Vec<DisplayColumn> = state.display_columns();
    let rows: Vec<RenderedRow> = state
        .visible_rows()
        .iter()
        .map(|visible| RenderedRow {
            index: visible.index,
            cells: columns
                .iter()
                .map(|column| {
                    visible
                        .row
                        .get(column.index)
                        .filter(|cell| !cell.is_null())
                        .map(|cell| cell.to_text())
                })
                .collect(),
        })
        .collect();
    let filtered_count = rows.len();
    let filters = state.filters();
    let has_active_filter = filters.has_active_filter();
    let show_reset = filters.has_active_draft() || has_active_filter;
    let drafts: Vec<(DisplayColumn, String)> = columns
        .iter()
        .map(|column| (column.clone(), filters.draft(&column.field).to_string()))
        .collect();
    let page = loader.page();
    let total_pages = loader.total_pages();
    let has_previous = loader.has_previous();
    let has_next = loader.has_next();
    let refreshing = loader.is_loading();
    let editor = state.editor();
    let detail: Option<Vec<(DisplayColumn, String)>> = editor.is_open().then(|| {
        columns
            .iter()
            .map(|column| (column.clone(), editor.value(&column.field).to_string()))
            .collect()
    });
    let saving = editor.is_saving();
    let save_error = editor.error().map(str::to_string);
    let notice = state.notice().map(str::to_string);
    drop(state);

    let services_for_previous = services.clone();
    let services_for_next = services.clone();
    let services_for_save = services.clone();

    rsx! {
        div { style: "display: flex; flex-direction: column; min-height: 0; flex: 1;",
            div { style: "display: flex; align-items: center; gap: 12px;",
                h3 { style: "margin: 0;", "{title}" }
                span { "共 {total} 筆" }
                if has_active_filter {
                    span { style: "color: #1d4ed8;", "篩選後 {filtered_count} / {page_row_count} 筆" }
                }
                if refreshing {
                    span { style: "color: #888;", "更新中..." }
                }
            }

            div { style: "display: flex; flex-wrap: wrap; gap: 8px; align-items: flex-end; margin: 10px 0;",
                for (column, draft) in drafts {
                    {
                        let field = column.field.clone();
                        rsx! {
                            label {
                                key: "{column.field}",
                                style: "display: flex; flex-direction: column; font-size: 12px;",
                                "{column.label}"
                                input {
                                    style: "width: 120px;",
                                    placeholder: "輸入篩選...",
                                    value: "{draft}",
                                    oninput: move |evt| browser.write().set_draft_filter(&field, evt.value()),
                                    onkeydown: move |evt: KeyboardEvent| {
                                        if evt.key() == Key::Enter {
                                            browser.write().apply_filters();
                                        }
                                    },
                                }
                            }
                        }
                    }
                }
                button { onclick: move |_| browser.write().apply_filters(), "搜尋" }
                if show_reset {
                    button { onclick: move |_| browser.write().reset_filters(), "重置" }
                }
            }

            if let Some(message) = load_error {
                div { style: error_style(), "{message}"
                    button {
                        style: "margin-left: 8px;",
                        onclick: move |_| {
                            let ticket = browser.write().retry();
                            spawn_load(browser, services_for_retry.clone(), ticket);
                        },
                        "重試"
                    }
                }
            }

            div { style: "flex: 1; min-height: 0; overflow: auto; border: 1px solid #ddd;",
                table { style: "border-collapse: collapse; width: max-content; min-width: 100%;",
                    thead {
                        tr {
                            for column in columns.iter() {
                                th { key: "{column.field}", title: "{column.field}", style: header_cell_style(), "{column.label}" }
                            }
                        }
                    }
                    tbody {
                        for row in rows {
                            {
                                let index = row.index;
                                rsx! {
                                    tr {
                                        key: "{index}",
                                        style: "cursor: pointer;",
                                        onclick: move |_| {
                                            browser.write().open_detail(index);
                                        },
                                        for cell in row.cells {
                                            td { style: body_cell_style(),
                                                if let Some(text) = cell {
                                                    "{text}"
                                                } else {
                                                    span { style: "color: #aaa; font-style: italic;", "null" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if total_pages > 1 {
                div { style: "display: flex; align-items: center; justify-content: center; gap: 12px; padding: 8px;",
                    button {
                        disabled: !has_previous || saving,
                        onclick: move |_| {
                            let ticket = browser.write().previous_page();
                            spawn_load(browser, services_for_previous.clone(), ticket);
                        },
                        "← 上一頁"
                    }
                    span { "{page} / {total_pages}" }
                    button {
                        disabled: !has_next || saving,
                        onclick: move |_| {
                            let ticket = browser.write().next_page();
                            spawn_load(browser, services_for_next.clone(), ticket);
                        },
                        "下一頁 →"
                    }
                }
            }

            if let Some(fields) = detail {
                div {
                    style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1000;",
                    onclick: move |_| browser.write().cancel_detail(),
                    div {
                        style: "background: #fff; padding: 16px; border: 1px solid #999; min-width: 420px; max-width: 720px; max-height: 80vh; overflow: auto;",
                        onclick: move |evt| evt.stop_propagation(),
                        div { style: "display: flex; justify-content: space-between; margin-bottom: 8px;",
                            span { style: "font-weight: 600;", "{title} - 詳細資料" }
                            button { onclick: move |_| browser.write().cancel_detail(), "×" }
                        }
                        for (column, value) in fields {
                            {
                                let field = column.field.clone();
                                let background = if column.editable { "#fff" } else { "#f3f4f6" };
                                rsx! {
                                    label {
                                        key: "{column.field}",
                                        style: "display: flex; align-items: center; gap: 8px; margin-bottom: 6px;",
                                        span { style: "min-width: 110px;", "{column.label}" }
                                        input {
                                            style: "flex: 1; background: {background};",
                                            value: "{value}",
                                            readonly: !column.editable,
                                            oninput: move |evt| browser.write().set_field(&field, evt.value()),
                                        }
                                    }
                                }
                            }
                        }
                        if let Some(message) = save_error {
                            div { style: error_style(), "{message}" }
                        }
                        div { style: "display: flex; justify-content: flex-end; gap: 8px; margin-top: 12px;",
                            button { onclick: move |_| browser.write().cancel_detail(), "取消" }
                            button {
                                disabled: saving,
                                onclick: move |_| {
                                    let plan = browser.write().begin_save();
                                    if let Some(plan) = plan {
                                        spawn(save_row(browser, services_for_save.clone(), plan));
                                    }
                                },
                                if saving { "儲存中..." } else { "儲存" }
                            }
                        }
                    }
                }
            }

            if let Some(message) = notice {
                div {
                    style: "position: fixed; bottom: 24px; right: 24px; background: #065f46; color: #fff; padding: 8px 14px; border-radius: 4px;",
                    "{message}"
                }
            }
        }
    }
}
