//! Request entry point middleware.

pub mod https;
pub mod proxy_fix;

pub use https::https_redirect;
pub use proxy_fix::{proxy_fix, ClientOrigin, ProxiedConnection, ProxyFix};
