mod accident_link;

pub use accident_link::{generate_token, hash_token, AccidentLink, BoundIdentity, LinkTokenStatus};
