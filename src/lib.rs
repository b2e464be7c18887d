pub mod db;
pub mod model;
pub mod output;
pub mod store;
