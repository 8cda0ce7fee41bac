//! Recipient records and the delimited source they are parsed from.

mod model;
mod store;

pub use model::{Recipient, is_valid_email};
pub use store::RecipientStore;
