pub mod config;
pub mod logging;

pub mod compare;
pub mod evaluate;
pub mod extract;
pub mod url_model;
