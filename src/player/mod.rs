pub mod models;
pub mod name;

pub use models::{PlayerIdentity, PlayerModel};
pub use name::sanitize_guest_name;
