//! Admin gating.
//!
//! Writes require an [`AdminCapability`], which only [`authorize`] can
//! produce. Handlers receive it as an argument instead of consulting any
//! session-wide flag.

use std::collections::HashSet;

use tracing::debug;

use super::error::ContentError;

/// Looks up whether a user is an administrator.
pub trait AdminDirectory {
    fn is_admin(&self, user_id: &str) -> bool;
}

/// Proof that the holder passed the admin check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCapability {
    user_id: String,
}

impl AdminCapability {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Check `user_id` against `directory`.
///
/// # Errors
/// Returns [`ContentError::Forbidden`] for anonymous users and users the
/// directory does not list as administrators.
pub fn authorize(
    directory: &dyn AdminDirectory,
    user_id: Option<&str>,
) -> Result<AdminCapability, ContentError> {
    let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
        debug!("admin check without a signed-in user");
        return Err(ContentError::Forbidden);
    };
    if !directory.is_admin(user_id) {
        debug!(user_id, "admin check denied");
        return Err(ContentError::Forbidden);
    }
    Ok(AdminCapability {
        user_id: user_id.to_string(),
    })
}

/// A fixed set of administrator ids.
#[derive(Debug, Default, Clone)]
pub struct StaticAdminDirectory {
    admins: HashSet<String>,
}

impl StaticAdminDirectory {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }
}

impl AdminDirectory for StaticAdminDirectory {
    fn is_admin(&self, user_id: &str) -> bool {
        self.admins.contains(user_id)
    }
}
