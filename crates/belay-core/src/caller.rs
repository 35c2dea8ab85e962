//! Who is asking

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The identity a read or write is performed on behalf of
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Caller {
    #[default]
    Anonymous,
    User {
        user_id: String,
    },
    Administrator {
        user_id: String,
    },
}

impl Caller {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
        }
    }

    pub fn administrator(user_id: impl Into<String>) -> Self {
        Self::Administrator {
            user_id: user_id.into(),
        }
    }

    /// Privileged callers see resources in every visibility state
    pub fn is_privileged(&self) -> bool {
        matches!(self, Caller::Administrator { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::User { user_id } | Caller::Administrator { user_id } => Some(user_id),
        }
    }
}

impl Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caller::Anonymous => write!(f, "anonymous"),
            Caller::User { user_id } => write!(f, "user:{user_id}"),
            Caller::Administrator { user_id } => write!(f, "admin:{user_id}"),
        }
    }
}
