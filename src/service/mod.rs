pub mod caching;
pub mod images;
pub mod news;
pub mod store;
pub mod view;
