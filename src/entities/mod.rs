pub mod draw_assignments;
pub mod draws;
pub mod games;
pub mod notification_receivers;
pub mod notifications;
pub mod participants;
pub mod users;

pub use draw_assignments as draw_assignment_entity;
pub use draws as draw_entity;
pub use games as game_entity;
pub use notification_receivers as notification_receiver_entity;
pub use notifications as notification_entity;
pub use participants as participant_entity;
pub use users as user_entity;

pub use draws::DrawStatus;
pub use games::GameStatus;
pub use participants::GiftStatus;
