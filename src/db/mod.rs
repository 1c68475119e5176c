pub mod models;
pub mod repository;

pub use models::{Comment, EffectiveGrant, Task, TaskShare, User};
pub use repository::{CommentRepository, TaskRepository, TaskShareRepository, UserRepository};
