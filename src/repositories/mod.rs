pub mod article;
pub mod comment;
pub mod post;
pub mod user;
pub mod video;

pub use article::{ArticleRepository, ArticleRepositoryTrait};
pub use comment::{CommentRepository, CommentRepositoryTrait};
pub use post::{PostRepository, PostRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
pub use video::{VideoRepository, VideoRepositoryTrait};
