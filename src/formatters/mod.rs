pub mod json;
pub mod view_model;

pub use json::JsonFormatter;
pub use view_model::{DependencyPair, ViewModel, ViewNode};
