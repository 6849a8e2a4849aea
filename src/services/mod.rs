pub mod draw_service;
pub mod notification_service;
pub mod participant_service;

pub use draw_service::*;
pub use notification_service::*;
pub use participant_service::*;
