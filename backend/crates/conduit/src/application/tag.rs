//! Tag Use Case

use std::sync::Arc;

use crate::domain::repository::TagRepository;
use crate::error::ConduitResult;

pub struct TagUseCase<T>
where
    T: TagRepository,
{
    tag_repo: Arc<T>,
}

impl<T> TagUseCase<T>
where
    T: TagRepository,
{
    pub fn new(tag_repo: Arc<T>) -> Self {
        Self { tag_repo }
    }

    pub async fn list(&self) -> ConduitResult<Vec<String>> {
        self.tag_repo.list().await
    }
}
