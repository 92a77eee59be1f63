use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Portal roles; each owns one path namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl Role {
    /// All roles, in namespace order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Doctor, Self::Patient];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }

    /// Landing page, which is also the namespace root.
    pub const fn home(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Doctor => "/doctor",
            Self::Patient => "/patient",
        }
    }

    /// True when `path` is the namespace root or lies below it.
    pub fn owns(self, path: &str) -> bool {
        path_has_prefix(path, self.home())
    }

    /// The role whose namespace contains `path`, if any.
    pub fn for_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.owns(path))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment-aware prefix match: `/admin` matches `/admin` and `/admin/x`,
/// never `/administrator`.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// `exp` is optional; a credential without one never expires at the edge.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp < now)
    }
}
