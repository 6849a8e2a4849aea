pub mod common;
pub mod draw;
pub mod notification;
pub mod pagination;
pub mod participant;

pub use common::*;
pub use draw::*;
pub use notification::*;
pub use pagination::*;
pub use participant::*;
