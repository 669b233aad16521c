mod tow_provider;

pub use tow_provider::TowProvider;
