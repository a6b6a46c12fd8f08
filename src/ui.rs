use colored::Colorize;
use declarative::ReconciliationResult;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a change that was (or would be) made
pub fn changed(msg: &str) {
    println!("{} {}", "~".yellow().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print one reconciliation result
///
/// JSON goes to stdout as a single object; the human form marks changes,
/// and `quiet` hides everything but changes and failures.
pub fn print_result(result: &ReconciliationResult, json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    if result.failed {
        error(&result.msg);
        if let Some(kind) = result.error_kind {
            eprintln!("  {}: {} ({})", "kind".dimmed(), kind, kind.description());
            if kind.is_retryable() {
                eprintln!("  {}", "the backend may be temporarily unavailable; retrying can help".dimmed());
            }
        }
    } else if result.changed {
        changed(&result.msg);
        if !result.diff.is_empty() {
            kv("fields", &result.diff.join(", "));
        }
    } else if !quiet {
        success(&result.msg);
    }
    Ok(())
}

/// Print the result of a run that only simulated its changes
pub fn check_mode_note(quiet: bool) {
    if !quiet {
        info("check mode: no changes were made");
    }
}
