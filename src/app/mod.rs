pub mod account_controller;
pub mod record_controller;

pub use account_controller::AccountController;
pub use record_controller::RecordController;
