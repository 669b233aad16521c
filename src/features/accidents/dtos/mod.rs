mod accident_dto;
mod attachment_dto;

pub use accident_dto::*;
pub use attachment_dto::*;
