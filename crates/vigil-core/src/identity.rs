//! Session identity resolution policy.

use log::debug;

use vigil_provider::identity::{IdentitySource, SessionIdentity};

use crate::error::{VigilError, VigilResult};

/// Resolve the identity the session will authenticate as, from the calling
/// process's real uid. Runs once at startup, before any input capture.
///
/// Refuses uid 0: a lock left on a root shell would invite typing the root
/// passphrase at an unattended console.
pub fn resolve_session_identity<S>(source: &S) -> VigilResult<SessionIdentity>
where
    S: IdentitySource,
{
    let uid = source
        .current_uid()
        .map_err(|err| VigilError::Identity(err.to_string()))?;

    if uid == 0 {
        return Err(VigilError::SuperuserRefused);
    }

    let login = source
        .login_for_uid(uid)
        .map_err(|err| VigilError::Identity(err.to_string()))?
        .ok_or_else(|| {
            VigilError::Identity(format!("no user database entry for uid {uid}"))
        })?;

    debug!("locking for user {login} (uid {uid})");
    Ok(SessionIdentity::new(uid, login))
}
