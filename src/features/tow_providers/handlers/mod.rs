mod tow_provider_handler;

pub use tow_provider_handler::*;
