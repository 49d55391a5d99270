//! Small colored-output helpers shared by the command modules.

use owo_colors::OwoColorize;

pub fn success(message: &str) {
    println!("{} {message}", "✓".green());
}

pub fn note(message: &str) {
    println!("{} {message}", "·".dimmed());
}

pub fn warn_line(message: &str) {
    eprintln!("{} {message}", "!".yellow());
}
