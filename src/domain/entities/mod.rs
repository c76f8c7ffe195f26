pub mod edit;
pub mod row_set;
pub mod table_config;
