use serde::{Deserialize, Serialize};

use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// `"1h"`/`"short"` for a one-hour token, anything else for thirty days.
    #[serde(default, rename = "timeToken", alias = "ttlChoice", alias = "ttlToken")]
    pub time_token: String,
}

/// Request body for `/upload`: URLs of an avatar already stored elsewhere.
#[derive(Debug, Deserialize)]
pub struct UploadAvatarRequest {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub url: String,
    #[serde(rename = "deleteURL")]
    pub delete_url: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    #[serde(rename = "avatarURL")]
    pub avatar_url: Option<String>,
    #[serde(rename = "deleteURL")]
    pub delete_url: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            avatar_url: u.avatar_url,
            delete_url: u.delete_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

/// The logged-in user with the issued token alongside.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(flatten)]
    pub user: PublicUser,
    #[serde(rename = "timeToken")]
    pub time_token: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: AuthenticatedUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_hides_nothing_but_the_hash() {
        let user = User {
            id: 1,
            email: "a@x.com".into(),
            name: "A".into(),
            password_hash: "$argon2id$secret".into(),
            avatar_url: Some("https://img/1.png".into()),
            delete_url: None,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains(r#""avatarURL":"https://img/1.png""#));
        assert!(json.contains(r#""deleteURL":null"#));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn login_request_accepts_ttl_aliases() {
        for key in ["timeToken", "ttlChoice", "ttlToken"] {
            let body = format!(r#"{{"email":"a@x.com","password":"p1","{key}":"1h"}}"#);
            let req: LoginRequest = serde_json::from_str(&body).unwrap();
            assert_eq!(req.time_token, "1h");
        }
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"p1"}"#).unwrap();
        assert_eq!(req.time_token, "");
    }
}
