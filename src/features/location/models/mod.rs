mod location;

pub use location::*;
