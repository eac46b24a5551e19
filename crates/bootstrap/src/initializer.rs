//! Environment initializer.
//!
//! Runs a profile's init chain against an application, root ancestor's
//! steps first. Every step either appends a log handler or wraps the
//! entry point; the first step that fails aborts the chain.

use common::{AppResult, Settings};

use crate::app::{ApplicationHandle, EntryPointLayer};
use crate::handlers::{LogHandler, MailHandler, SyslogHandler};
use crate::middleware::ProxyFix;
use crate::profile::{InitStep, Profile};

/// Apply `profile`'s init chain to `app`.
pub fn initialize<A>(profile: &Profile, app: &mut A) -> AppResult<()>
where
    A: ApplicationHandle + ?Sized,
{
    for step in profile.init_chain() {
        tracing::debug!(profile = profile.name(), step = %step, "Applying init step");
        apply_step(step, profile.settings(), app)?;
    }
    Ok(())
}

/// Apply a single step with the given settings.
pub fn apply_step<A>(step: InitStep, settings: &Settings, app: &mut A) -> AppResult<()>
where
    A: ApplicationHandle + ?Sized,
{
    match step {
        InitStep::MailErrors => {
            let handler = MailHandler::from_settings(&settings.mail)?;
            app.add_log_handler(LogHandler::mail(handler));
        }
        InitStep::ProxyFix => {
            app.wrap_entry_point(EntryPointLayer::ProxyFix(ProxyFix::default()));
        }
        InitStep::StderrLog => {
            app.add_log_handler(LogHandler::stderr());
        }
        InitStep::Syslog => {
            let handler = SyslogHandler::connect()?;
            app.add_log_handler(LogHandler::syslog(handler));
        }
    }
    Ok(())
}
