use colored::Colorize;
use filefactory::Difference;
use std::path::Path;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print one verification mismatch
pub fn mismatch(difference: Difference, path: &Path, cause: &str) {
    eprintln!(
        "{} {} {}",
        "✗".red(),
        path.display().to_string().bold(),
        format!("[{}]", difference_label(difference)).yellow()
    );
    eprintln!("  {}", cause.dimmed());
}

/// Lowercase names of the kinds in a difference, joined with `|`
pub fn difference_label(difference: Difference) -> String {
    difference
        .kinds()
        .iter()
        .map(|kind| kind.to_lowercase().replace('_', "-"))
        .collect::<Vec<_>>()
        .join("|")
}

/// One-line summary of a failed verification
pub fn mismatch_summary(mismatches: usize, difference: Difference) -> String {
    format!(
        "{} found ({})",
        count(mismatches, "mismatch", "mismatches"),
        difference_label(difference)
    )
}

/// `count` followed by the singular or plural noun
pub fn count(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}

// ============================================================================
// Tests
// ============================================================================
