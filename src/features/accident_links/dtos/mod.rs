mod accident_link_dto;

pub use accident_link_dto::*;
