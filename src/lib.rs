pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;

pub use db::GradebookStorage;
pub use error::GradebookError;
