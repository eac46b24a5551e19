//! Config command - Prints the resolved settings.

use serde::Serialize;

use bootstrap::Application;
use common::{AppResult, Settings};

use crate::cli::args::ConfigArgs;

#[derive(Serialize)]
struct ConfigDump<'a> {
    environment: &'a str,
    settings: &'a Settings,
}

/// Render the active settings; secrets are never printed.
pub fn render(app: &Application, json: bool) -> AppResult<String> {
    if json {
        let dump = ConfigDump {
            environment: app.environment(),
            settings: app.settings(),
        };
        return Ok(serde_json::to_string_pretty(&dump)?);
    }

    let width = app
        .settings()
        .entries()
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!("# environment: {}", app.environment())];
    lines.extend(
        app.settings()
            .entries()
            .into_iter()
            .map(|(key, value)| format!("{:width$}  {}", key, value, width = width)),
    );
    Ok(lines.join("\n"))
}

/// Execute the config command
pub fn execute(args: ConfigArgs, app: &Application) -> AppResult<()> {
    println!("{}", render(app, args.json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use bootstrap::{create_app, EnvVars, Registry};
    use std::path::Path;

    fn app(vars: &[(&str, &str)], name: &str) -> Application {
        let env: EnvVars = vars.iter().copied().collect();
        let registry = Registry::standard(&env, Path::new("/srv/soconn")).unwrap();
        create_app(&registry.resolve(name).unwrap(), Router::new()).unwrap()
    }

    #[test]
    fn test_json_hides_secrets() {
        let app = app(
            &[("SECRET_KEY", "s3cr3t"), ("MAIL_PASSWORD", "hunter2")],
            "test",
        );
        let out = render(&app, true).unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["environment"], "test");
        assert_eq!(json["settings"]["testing"], true);
        assert!(!out.contains("s3cr3t"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn test_text_lists_every_key() {
        let app = app(&[("SECRET_KEY", "s3cr3t")], "prod");
        let out = render(&app, false).unwrap();

        assert!(out.starts_with("# environment: prod"));
        assert_eq!(out.lines().count(), app.settings().entries().len() + 1);
        assert!(out.contains("[REDACTED]"));
        assert!(!out.contains("s3cr3t"));
    }
}
