pub mod alias;
pub mod field;
pub mod mapping;
pub mod record;
pub mod row;
pub mod state;
