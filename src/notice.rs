use colored::Colorize;

/// Prints a deprecation notice to stderr, cyan and bold so it stands out in
/// the middle of generator output.
pub fn deprecation(msg: &str) {
    eprintln!("{}", format!("[Deprecation Notice] {}", msg).cyan().bold());
}
