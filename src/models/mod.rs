pub mod news;

pub use news::{Article, DecodeError};
