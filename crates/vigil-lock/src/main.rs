//! Interactive screen locker: grabs input, collects a passphrase, and
//! releases the session only once PAM accepts it.

use anyhow::{Context, Result};
use log::{error, info};

use vigil_core::{logging, resolve_session_identity, LockSession, VigilConfig};
use vigil_pam::PamAuthBackend;
use vigil_x11::X11DisplayServer;

mod system;

use system::SystemIdentitySource;

/// Entry point; logs failures before exit.
///
/// Exit status is zero only after a successful unlock. Every error reaching
/// this frame is an unrecoverable setup or runtime failure: denied attempts
/// and input overflow never escape the session loop.
fn main() {
    logging::init("info");
    if let Err(err) = run() {
        error!("lock aborted: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = VigilConfig::load_or_default().context("load configuration")?;

    // Identity is fixed before any capture is acquired; a superuser caller
    // is refused here, with the display untouched.
    let identity =
        resolve_session_identity(&SystemIdentitySource).context("resolve session identity")?;

    let display = X11DisplayServer::new();
    let backend = PamAuthBackend::new(config.auth.service.clone());
    let session = LockSession::new(config, display, backend);

    let report = session.run(&identity).context("run lock session")?;
    info!(
        "session unlocked for {} ({} denied attempt(s))",
        identity.login(),
        report.denied_attempts
    );
    Ok(())
}
