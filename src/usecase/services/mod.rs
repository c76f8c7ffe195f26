pub mod edit_service;
pub mod page_loader;
pub mod query_service;
pub mod row_editor;
pub mod table_session;
