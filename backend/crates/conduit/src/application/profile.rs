//! Profile Use Case
//!
//! Public profiles and the follow relation.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::identity::Identity;
use crate::domain::entity::Profile;
use crate::domain::repository::ProfileRepository;
use crate::domain::value_object::UserName;
use crate::error::{ConduitError, ConduitResult};

pub struct ProfileUseCase<P>
where
    P: ProfileRepository,
{
    profile_repo: Arc<P>,
}

impl<P> ProfileUseCase<P>
where
    P: ProfileRepository,
{
    pub fn new(profile_repo: Arc<P>) -> Self {
        Self { profile_repo }
    }

    pub async fn get(&self, viewer: Option<&Identity>, username: &str) -> ConduitResult<Profile> {
        self.find(username, viewer.map(|i| i.user_id)).await
    }

    pub async fn follow(&self, identity: &Identity, username: &str) -> ConduitResult<Profile> {
        let mut profile = self.find(username, Some(identity.user_id)).await?;

        if profile.user_id == identity.user_id {
            return Err(ConduitError::invalid("profile", "can't follow yourself"));
        }

        self.profile_repo
            .follow(identity.user_id, profile.user_id)
            .await?;
        profile.following = true;

        tracing::info!(
            follower = %identity.user_id,
            followed = %profile.user_id,
            "User followed"
        );

        Ok(profile)
    }

    pub async fn unfollow(&self, identity: &Identity, username: &str) -> ConduitResult<Profile> {
        let mut profile = self.find(username, Some(identity.user_id)).await?;

        self.profile_repo
            .unfollow(identity.user_id, profile.user_id)
            .await?;
        profile.following = false;

        Ok(profile)
    }

    async fn find(&self, username: &str, viewer: Option<UserId>) -> ConduitResult<Profile> {
        self.profile_repo
            .find_by_username(&UserName::from_db(username), viewer)
            .await?
            .ok_or(ConduitError::NotFound("profile"))
    }
}
