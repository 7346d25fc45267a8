pub mod ports;
pub mod service;

pub use ports::{CreatedItem, ItemError, ItemRepository, ItemService, NewItem};
pub use service::ItemServiceImpl;
