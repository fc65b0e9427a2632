//! 用户资料与关注接口

use super::ApiClient;
use crate::error::ApiResult;
use crate::web::http::FormPart;
use serde_json::Value;
use yun_shared::protocol::{
    AvatarUploaded, ChangePasswordRequest, CountResult, FansCountRequest, FollowRequest,
    FollowResult, FollowStatus, FollowStatusRequest, FollowingCountRequest, PageQuery,
    ProfileRequest, RelationList, RelationListRequest, RemoveFanRequest, UPLOAD_AVATAR_PATH,
    UnfollowRequest, UpdateProfileRequest, UserProfileRequest,
};
use yun_shared::{Page, ProfilePatch, Reply, UserId, UserProfile};

/// 待上传的文件
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub(crate) fn into_part(self, field: &str) -> FormPart {
        FormPart::File {
            name: field.to_string(),
            filename: self.filename,
            mime: self.mime,
            bytes: self.bytes,
        }
    }
}

impl ApiClient {
    // --- 当前用户 ---

    pub async fn profile(&self) -> ApiResult<Reply<UserProfile>> {
        self.call(&ProfileRequest).await
    }

    pub async fn update_profile(&self, patch: ProfilePatch) -> ApiResult<Reply<UserProfile>> {
        self.call(&UpdateProfileRequest { patch }).await
    }

    pub async fn upload_avatar(&self, file: UploadFile) -> ApiResult<Reply<AvatarUploaded>> {
        self.upload(UPLOAD_AVATAR_PATH, vec![file.into_part("file")])
            .await
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<Reply<Value>> {
        self.call(&ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        })
        .await
    }

    /// 他人资料
    pub async fn user_profile(&self, user_id: UserId) -> ApiResult<Reply<UserProfile>> {
        self.call(&UserProfileRequest { user_id }).await
    }

    // --- 关注关系 ---

    /// 关注（后端按当前关系切换，返回最新关系与计数）
    pub async fn follow(&self, user_id: UserId) -> ApiResult<Reply<FollowResult>> {
        self.call(&FollowRequest { user_id }).await
    }

    pub async fn unfollow(&self, user_id: UserId) -> ApiResult<Reply<Value>> {
        self.call(&UnfollowRequest { user_id }).await
    }

    pub async fn remove_fan(&self, user_id: UserId) -> ApiResult<Reply<Value>> {
        self.call(&RemoveFanRequest { user_id }).await
    }

    pub async fn follow_status(&self, user_id: UserId) -> ApiResult<Reply<FollowStatus>> {
        self.call(&FollowStatusRequest { user_id }).await
    }

    pub async fn fans_count(&self, user_id: UserId) -> ApiResult<Reply<CountResult>> {
        self.call(&FansCountRequest { user_id }).await
    }

    pub async fn following_count(&self, user_id: UserId) -> ApiResult<Reply<CountResult>> {
        self.call(&FollowingCountRequest { user_id }).await
    }

    /// 关注列表 / 粉丝列表，`user_id` 为空时查询当前用户
    pub async fn relation_list(
        &self,
        list: RelationList,
        user_id: Option<UserId>,
        page: PageQuery,
    ) -> ApiResult<Reply<Page<UserProfile>>> {
        self.call(&RelationListRequest {
            list,
            page,
            user_id,
        })
        .await
    }
}
