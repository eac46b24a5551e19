//! Configuration constants
//!
//! Centralized location for defaults and environment variable names.

// =============================================================================
// Environment Selection
// =============================================================================

/// Environment variable naming the profile to run under
pub const ENV_CONFIG_SELECTOR: &str = "SOCONN_CONFIG";

/// Profile used when no environment is selected
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Registry key aliasing the default profile
pub const DEFAULT_ALIAS: &str = "default";

/// Dotenv file loaded before profile resolution
pub const DOTENV_FILE: &str = ".env";

// =============================================================================
// Environment Variables
// =============================================================================

pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
pub const ENV_MAIL_USERNAME: &str = "MAIL_USERNAME";
pub const ENV_MAIL_PASSWORD: &str = "MAIL_PASSWORD";
pub const ENV_ADMIN: &str = "SOCONN_ADMIN";
pub const ENV_DEV_DATABASE_URL: &str = "DEV_DB_URL";
pub const ENV_TEST_DATABASE_URL: &str = "TEST_DB_URL";
pub const ENV_DATABASE_URL: &str = "DB_URL";
pub const ENV_SSL_DISABLE: &str = "SSL_DISABLE";
pub const ENV_COVERAGE: &str = "SOCONN_COVERAGE";

// =============================================================================
// Database
// =============================================================================

/// Database used when no profile names one
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// SQLite files created next to the application per profile
pub const DEV_DATABASE_FILE: &str = "data-dev.sqlite";
pub const TEST_DATABASE_FILE: &str = "data-test.sqlite";
pub const PROD_DATABASE_FILE: &str = "data.sqlite";

/// Queries slower than this are reported
pub const SLOW_DB_QUERY_TIME_MS: u64 = 500;

// =============================================================================
// Mail
// =============================================================================

pub const DEFAULT_MAIL_SERVER: &str = "smtp.googlemail.com";
pub const DEFAULT_MAIL_PORT: u16 = 587;
pub const DEFAULT_MAIL_SUBJECT_PREFIX: &str = "[SoConn]";
pub const DEFAULT_MAIL_SENDER: &str = "SoConn Admin <soconn@example.com>";

/// Subject suffix for error alert mails
pub const ERROR_MAIL_SUBJECT: &str = "App Error";

// =============================================================================
// Pagination
// =============================================================================

pub const POSTS_PER_PAGE: u64 = 50;
pub const FOLLOWERS_PER_PAGE: u64 = 100;
pub const COMMENTS_PER_PAGE: u64 = 50;

// =============================================================================
// Syslog
// =============================================================================

/// Local address the syslog UDP socket binds to
pub const SYSLOG_LOCAL_ADDR: &str = "127.0.0.1:0";

/// Syslog daemon address
pub const SYSLOG_SERVER_ADDR: &str = "127.0.0.1:514";

/// Process name reported in syslog records
pub const SYSLOG_PROCESS: &str = "soconn";

// =============================================================================
// Proxy
// =============================================================================

/// Number of reverse proxies trusted to append `X-Forwarded-For`
pub const DEFAULT_TRUSTED_PROXIES: usize = 1;

// =============================================================================
// Server
// =============================================================================

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 5000;
