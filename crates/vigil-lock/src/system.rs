//! OS user database lookups for session identity resolution.

use vigil_core::error::{VigilError, VigilResult};
use vigil_provider::identity::IdentitySource;

/// Identity source backed by the running system's user database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentitySource;

impl IdentitySource for SystemIdentitySource {
    type Error = VigilError;

    fn current_uid(&self) -> VigilResult<u32> {
        Ok(uzers::get_current_uid())
    }

    fn login_for_uid(&self, uid: u32) -> VigilResult<Option<String>> {
        let Some(user) = uzers::get_user_by_uid(uid) else {
            return Ok(None);
        };
        let login = user
            .name()
            .to_str()
            .ok_or_else(|| {
                VigilError::Identity(format!("login name for uid {uid} is not valid UTF-8"))
            })?
            .to_string();
        Ok(Some(login))
    }
}
