//! Test command - Runs the workspace test suite through cargo.

use tokio::process::Command;

use common::{AppError, AppResult};

use crate::cli::args::TestArgs;

/// Cargo arguments for a plain or coverage run.
pub fn cargo_args(coverage: bool) -> Vec<&'static str> {
    if coverage {
        vec!["llvm-cov", "--workspace", "--branch", "--html"]
    } else {
        vec!["test", "--workspace"]
    }
}

/// Execute the test command
pub async fn execute(args: TestArgs) -> AppResult<()> {
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let cargo_args = cargo_args(args.coverage);

    tracing::info!(coverage = args.coverage, "Running {} {}", cargo, cargo_args.join(" "));

    let status = Command::new(&cargo)
        .args(&cargo_args)
        .status()
        .await
        .map_err(|e| AppError::internal(format!("Failed to run {}: {}", cargo, e)))?;

    if !status.success() {
        return Err(AppError::internal(format!("Test run failed ({})", status)));
    }

    if args.coverage {
        tracing::info!("HTML coverage report written to target/llvm-cov/html");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_switches_runner() {
        assert_eq!(cargo_args(false), vec!["test", "--workspace"]);

        let args = cargo_args(true);
        assert_eq!(args[0], "llvm-cov");
        assert!(args.contains(&"--branch"));
    }
}
