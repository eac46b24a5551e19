//! Application handle.
//!
//! The web application itself lives outside this crate. Init steps only
//! need a narrow surface: a handler list to append to, an entry point to
//! wrap, and the debug/testing flags. [`Application`] provides that surface
//! over an axum `Router`.

use std::mem;

use axum::{middleware, Router};

use common::{AppResult, Settings};

use crate::handlers::LogHandler;
use crate::initializer::initialize;
use crate::middleware::{https_redirect, proxy_fix, ProxyFix};
use crate::profile::Profile;

/// What an init step may do to an application.
pub trait ApplicationHandle {
    /// Append a log handler.
    fn add_log_handler(&mut self, handler: LogHandler);

    /// Wrap the request entry point; the new layer becomes the outermost.
    fn wrap_entry_point(&mut self, layer: EntryPointLayer);

    fn set_debug(&mut self, debug: bool);

    fn set_testing(&mut self, testing: bool);
}

/// Layers that can wrap the request entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointLayer {
    ProxyFix(ProxyFix),
}

impl EntryPointLayer {
    pub fn name(&self) -> &'static str {
        match self {
            EntryPointLayer::ProxyFix(_) => "proxy-fix",
        }
    }

    /// Wrap `router` with this layer.
    pub fn apply(self, router: Router) -> Router {
        match self {
            EntryPointLayer::ProxyFix(config) => {
                router.layer(middleware::from_fn_with_state(config, proxy_fix))
            }
        }
    }
}

/// A configured application instance.
pub struct Application {
    environment: String,
    settings: Settings,
    debug: bool,
    testing: bool,
    handlers: Vec<LogHandler>,
    wrappers: Vec<&'static str>,
    router: Router,
}

impl Application {
    /// Bare application for `profile`: flags cleared, no handlers.
    pub fn new(profile: &Profile, router: Router) -> Self {
        Self {
            environment: profile.name().to_string(),
            settings: profile.settings().clone(),
            debug: false,
            testing: false,
            handlers: Vec::new(),
            wrappers: Vec::new(),
            router,
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn testing(&self) -> bool {
        self.testing
    }

    /// Attached handlers, in attachment order.
    pub fn log_handlers(&self) -> &[LogHandler] {
        &self.handlers
    }

    /// Names of the entry point wrappers, innermost first.
    pub fn entry_point_wrappers(&self) -> &[&'static str] {
        &self.wrappers
    }

    /// Plain HTTP is redirected unless debugging, testing, or disabled.
    pub fn requires_https(&self) -> bool {
        !self.debug && !self.testing && !self.settings.ssl_disable
    }

    /// The request entry point, with every wrapper applied.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl ApplicationHandle for Application {
    fn add_log_handler(&mut self, handler: LogHandler) {
        self.handlers.push(handler);
    }

    fn wrap_entry_point(&mut self, layer: EntryPointLayer) {
        self.wrappers.push(layer.name());
        self.router = layer.apply(mem::take(&mut self.router));
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn set_testing(&mut self, testing: bool) {
        self.testing = testing;
    }
}

/// Construct the application for `profile` around `routes`.
///
/// Applies the profile's flags, installs HTTPS enforcement where required,
/// then runs the profile's init chain exactly once. Handler construction
/// failures abort startup.
pub fn create_app(profile: &Profile, routes: Router) -> AppResult<Application> {
    let mut app = Application::new(profile, routes);
    app.set_debug(profile.settings().debug);
    app.set_testing(profile.settings().testing);

    // Inside the entry point, so it sees the scheme restored by proxy-fix
    if app.requires_https() {
        app.router = mem::take(&mut app.router).layer(middleware::from_fn(https_redirect));
    }

    initialize(profile, &mut app)?;

    tracing::debug!(
        environment = %app.environment,
        handlers = app.handlers.len(),
        wrappers = ?app.wrappers,
        "Application initialized"
    );

    Ok(app)
}
