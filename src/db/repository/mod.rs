pub mod comment;
pub mod task;
pub mod task_shares;
pub mod user;

pub use comment::CommentRepository;
pub use task::TaskRepository;
pub use task_shares::TaskShareRepository;
pub use user::UserRepository;
