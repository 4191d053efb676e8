use crate::error::Result;
use colored::Colorize;
use crossterm::event::{read, Event, KeyCode};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use dialoguer::console::Term;

/// Single-keypress yes/no prompt: y/Y, n/N, or Enter for the default.
///
/// Falls back to the default when stdin is not a terminal.
pub fn ask_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let term = Term::stdout();
    if !term.is_term() {
        return Ok(default_yes);
    }

    let default_hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    term.write_str(&format!("{prompt} {default_hint} "))?;
    term.flush()?;

    enable_raw_mode()?;
    let result = read_choice(default_yes);
    disable_raw_mode()?;
    let result = result?;

    let selection = if result { "y".green() } else { "n".red() };
    term.write_line(&selection.to_string())?;

    Ok(result)
}

fn read_choice(default_yes: bool) -> Result<bool> {
    loop {
        if let Event::Key(key) = read()? {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                KeyCode::Enter => return Ok(default_yes),
                _ => continue,
            }
        }
    }
}
