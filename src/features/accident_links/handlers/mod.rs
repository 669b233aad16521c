mod accident_link_handler;

pub use accident_link_handler::*;
