mod link_token_service;

pub use link_token_service::LinkTokenService;
