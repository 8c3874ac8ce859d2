//! Validate command implementation.

use std::path::Path;

use anyhow::Result;
use harrow_core::Policy;
use tracing::info;

use super::run::load_policies;

/// Runs the validate command.
pub fn run(path: &Path) -> Result<Vec<Policy>> {
    info!(path = %path.display(), "Validating configuration");

    println!("Harrow Config Validator");
    println!("=======================");
    println!("Path: {}", path.display());
    println!();

    let policies = load_policies(path)?;
    for (index, policy) in policies.iter().enumerate() {
        println!("✓ images[{index}] {}", describe(policy));
    }

    println!("\n✓ {} policies validated successfully", policies.len());
    Ok(policies)
}

fn describe(policy: &Policy) -> String {
    let older_than = policy.older_than.to_string();
    format!(
        "{} ({}): remove [{}], keep [{}], keep newest {}, older than {}",
        policy.repository,
        policy.mode,
        policy.remove_tags.join(", "),
        policy.keep_tags.join(", "),
        policy.keep_count,
        if older_than.is_empty() { "now" } else { &older_than },
    )
}
