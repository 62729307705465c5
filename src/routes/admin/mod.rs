mod handler;
mod model;

pub use handler::{
    create_address, create_user, delete_user, get_user, list_users, update_address, update_user,
};
