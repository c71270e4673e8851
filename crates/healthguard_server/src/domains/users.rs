use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::require_text;
use crate::error::{ServerError, ServerResult};
use crate::types::{Role, User};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hex-encoded SHA-256 of the password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// A validated account ready to be stored.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl NewUser {
    pub fn new(username: &str, password: &str, role: Role) -> Self {
        Self {
            username: username.to_string(),
            password_hash: hash_password(password),
            role,
            age: None,
            gender: None,
        }
    }
}

impl RegisterPayload {
    pub fn validated(self) -> ServerResult<NewUser> {
        let username = require_text("username", &self.username)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServerError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(NewUser {
            username,
            password_hash: hash_password(&self.password),
            role: Role::User,
            age: self.age,
            gender: self.gender.filter(|g| !g.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

/// Editable profile fields; absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub chronic_diseases: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.height.is_none()
            && self.blood_type.is_none()
            && self.emergency_contact.is_none()
            && self.allergies.is_none()
            && self.chronic_diseases.is_none()
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(h) = self.height {
            user.height = Some(h);
        }
        let text_fields = [
            (&self.blood_type, &mut user.blood_type),
            (&self.emergency_contact, &mut user.emergency_contact),
            (&self.allergies, &mut user.allergies),
            (&self.chronic_diseases, &mut user.chronic_diseases),
        ];
        for (update, field) in text_fields {
            if let Some(v) = update {
                *field = Some(v.clone());
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfilePayload {
    pub user_id: i64,
    #[serde(default)]
    pub profile_data: ProfileUpdate,
}

#[derive(Debug, Deserialize)]
pub struct UserIdPayload {
    pub user_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersPayload {
    #[serde(default)]
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_password_is_sha256_hex() {
        assert_eq!(
            hash_password("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[test]
    fn register_rejects_blank_username_and_short_password() {
        let p = RegisterPayload {
            username: "  ".into(),
            password: "secret1".into(),
            age: None,
            gender: None,
        };
        assert!(p.validated().is_err());
        let p = RegisterPayload {
            username: "amy".into(),
            password: "123".into(),
            age: None,
            gender: None,
        };
        assert!(p.validated().is_err());
    }

    #[test]
    fn register_hashes_and_defaults_role() {
        let u = RegisterPayload {
            username: " amy ".into(),
            password: "123456".into(),
            age: Some(30),
            gender: Some("".into()),
        }
        .validated()
        .unwrap();
        assert_eq!(u.username, "amy");
        assert_eq!(u.role, Role::User);
        assert_eq!(u.password_hash, hash_password("123456"));
        assert!(u.gender.is_none());
    }

    #[test]
    fn profile_update_only_touches_given_fields() {
        let mut user = User {
            id: 1,
            username: "amy".into(),
            password_hash: String::new(),
            role: Role::User,
            age: None,
            gender: None,
            height: Some(160.0),
            blood_type: Some("O".into()),
            emergency_contact: None,
            allergies: None,
            chronic_diseases: None,
            created_at: String::new(),
        };
        let update: ProfileUpdate =
            serde_json::from_value(serde_json::json!({"allergies": "pollen"})).unwrap();
        assert!(!update.is_empty());
        update.apply(&mut user);
        assert_eq!(user.allergies.as_deref(), Some("pollen"));
        assert_eq!(user.blood_type.as_deref(), Some("O"));
        assert_eq!(user.height, Some(160.0));
        assert!(ProfileUpdate::default().is_empty());
    }
}
