pub mod db;
pub mod push;

pub use db::PgStore;
pub use push::PushHub;
