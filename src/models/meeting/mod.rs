mod resource;
mod types;

pub use types::*;
