pub mod flash;
pub mod router;
pub mod types;
pub mod views;
pub mod handlers {
    pub mod accounts;
    pub mod common;
    pub mod health;
    pub mod items;
    pub mod users;
}

pub use router::{create_items_router, create_users_router, ApiDoc};
pub use types::AppState;
