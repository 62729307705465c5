mod handler;
mod model;

pub(crate) use handler::book_error;
pub use handler::{
    add_address, delete_address, get_address, list_addresses, set_default_address,
    update_address,
};
pub use model::AddressInput;
