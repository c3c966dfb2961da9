use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct DbUser {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    /// PHC-formatted password hash.
    pub password: String,
}

/// The non-sensitive part of a user record, safe to hand to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&DbUser> for PublicUser {
    fn from(u: &DbUser) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            name: u.name.clone().unwrap_or_default(),
        }
    }
}
