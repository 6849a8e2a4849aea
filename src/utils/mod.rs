pub mod assignment;
pub mod jwt;

pub use assignment::{
    AssignmentError, DEFAULT_MAX_ATTEMPTS, MIN_PARTICIPANTS, generate_assignments,
    generate_assignments_with, is_valid_pairing,
};
pub use jwt::*;
