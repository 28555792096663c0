use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::validate;

const AVATAR_FALLBACK_BASE: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Teacher {
    /// Stored avatar, or a generated image built from the name's initials.
    pub fn avatar_url(&self) -> String {
        if let Some(avatar) = &self.avatar {
            return avatar.clone();
        }

        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect();

        let params = [("name", initials.as_str()), ("background", "random"), ("size", "256")];
        match Url::parse_with_params(AVATAR_FALLBACK_BASE, &params) {
            Ok(url) => url.into(),
            Err(_) => AVATAR_FALLBACK_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResponse {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Teacher> for TeacherResponse {
    fn from(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id.clone(),
            name: teacher.name.clone(),
            avatar: teacher.avatar.clone(),
            avatar_url: teacher.avatar_url(),
            created_at: teacher.created_at,
            updated_at: teacher.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacherRequest {
    pub name: String,
    pub avatar: Option<String>,
}

impl NewTeacherRequest {
    pub fn validate(self) -> Result<Self, AppError> {
        Ok(Self {
            name: validate::required("name", &self.name, 1)?,
            avatar: validate::optional_non_empty("avatar", self.avatar)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeacherRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateTeacherRequest {
    pub fn validate(self) -> Result<Self, AppError> {
        let name = match self.name {
            Some(name) => Some(validate::required("name", &name, 1)?),
            None => None,
        };
        Ok(Self {
            name,
            avatar: validate::optional_non_empty("avatar", self.avatar)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvatarRequest {
    pub avatar: String,
}
