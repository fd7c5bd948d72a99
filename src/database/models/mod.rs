pub mod recipe;
pub mod session;
pub mod social;
pub mod user;

pub use recipe::{Recipe, RecipeStatus};
pub use session::Session;
pub use social::{Bookmark, Comment, Like};
pub use user::User;
