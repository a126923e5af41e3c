//! Domain Entities

pub mod article;
pub mod comment;
pub mod profile;
pub mod user;

pub use article::{Article, ArticleChanges, ArticleFilter, ArticleView, NewArticle};
pub use comment::{Comment, CommentView, NewComment};
pub use profile::Profile;
pub use user::{NewUser, User, UserChanges};
