use colored::*;
use console::Term;
use std::fmt::Display;

/// Terminal output with the Speak Football colors.
/// Static methods only, this is a namespace and not a thing you construct.
/// Slate (93, 108, 138) is the brand color, mist (163, 177, 198) the accent.
pub struct Logger;

impl Logger {
    /// Prints the banner, centered on the terminal.
    pub fn banner() {
        let term = Term::stdout();
        let width = term.size().1 as usize;

        let banner = r#"
  ___               _     ___         _   _         _ _
 / __|_ __  ___ __ | |__ | __|__  ___| |_| |__  __ _| | |
 \__ \ '_ \/ -_) _` | / / | _/ _ \/ _ \  _| '_ \/ _` | | |
 |___/ .__/\___\__,_|_\_\ |_|\___/\___/\__|_.__/\__,_|_|_|
     |_|
"#;

        // Top half mist, bottom half slate.
        for (i, line) in banner.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let colored_line = if i < 2 {
                line.truecolor(163, 177, 198).bold().to_string()
            } else {
                line.truecolor(93, 108, 138).bold().to_string()
            };
            println!("{:^width$}", colored_line, width = width);
        }
        println!();
    }

    pub fn info<T: Display>(msg: T) {
        println!("{} {}", "•".truecolor(163, 177, 198).bold(), msg);
    }

    pub fn success<T: Display>(msg: T) {
        println!("{} {}", "✔".green().bold(), msg);
    }

    /// Something went wrong and the user needs to know.
    pub fn error<T: Display>(msg: T) {
        println!("{} {}", "✖".red().bold(), msg);
    }

    pub fn warn<T: Display>(msg: T) {
        println!("{} {}", "⚠".yellow().bold(), msg);
    }

    /// Section header, underlined. The leading newline keeps it off the previous output.
    pub fn header<T: Display>(msg: T) {
        println!(
            "\n{}",
            msg.to_string().truecolor(93, 108, 138).bold().underline()
        );
    }

    /// A boxed block of text, e.g. a rendered modal. Each line gets a gutter.
    pub fn panel<T: Display>(msg: T) {
        for line in msg.to_string().lines() {
            println!("  {} {}", "│".truecolor(93, 108, 138), line);
        }
    }

    /// Inline highlight for names and values.
    pub fn highlight<T: Display>(msg: T) -> String {
        msg.to_string().truecolor(163, 177, 198).bold().to_string()
    }

    pub fn dim<T: Display>(msg: T) -> String {
        msg.to_string().dimmed().to_string()
    }
}
