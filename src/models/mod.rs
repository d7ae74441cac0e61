pub mod reactions;
pub mod trash_cans;
pub mod users;

pub use reactions::ReactionCountRow;
pub use trash_cans::TrashCanRow;
pub use users::UsersRow;
