pub mod accident_links;
pub mod accidents;
pub mod location;
pub mod tow_providers;
