//! Shared, unstyled-by-default output helpers. Color is applied through
//! `console::style` and follows `console::colors_enabled()`, which
//! `main.rs` configures from `--color`.

use console::style;

pub fn success(msg: &str) {
    println!("{}", style(msg).green());
}

pub fn error(msg: &str) {
    eprintln!("{}", style(msg).red());
}

pub fn warning(msg: &str) {
    eprintln!("{}", style(msg).yellow());
}

pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", key, style(value).cyan());
}

pub fn section(title: &str) {
    println!("{}", style(title).bold());
}
