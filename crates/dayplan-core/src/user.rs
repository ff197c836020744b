use serde::{Deserialize, Serialize};

pub type UserId = i64;

const TEST_USER_ID: UserId = 0;
const TEST_USER_NAME: &str = "TestUser";
const FALLBACK_NAME: &str = "User";

/// User record handed over by the host chat client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

/// Who the session acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
    /// Set when the host supplied no user and the session runs as the
    /// shared test account.
    pub test_mode: bool,
}

impl UserIdentity {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            test_mode: false,
        }
    }

    pub fn test_user() -> Self {
        Self {
            id: TEST_USER_ID,
            name: TEST_USER_NAME.to_string(),
            test_mode: true,
        }
    }

    /// Resolve the identity from host data, preferring the username, then
    /// the first name.
    pub fn from_host(user: Option<HostUser>) -> Self {
        let Some(user) = user else {
            return Self::test_user();
        };
        let name = [user.username, user.first_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());
        Self::new(user.id, name)
    }

    pub fn registration(&self) -> Registration {
        Registration {
            tg_id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Body of `POST /api/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub tg_id: UserId,
    pub name: String,
}
