pub mod client;
pub mod import_file;
pub mod user;
pub mod zone;
