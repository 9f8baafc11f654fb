//! Hidden terminal input for passwords.

use std::io::{Stderr, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, ClearType},
};

pub type PromptResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// What a single key press did to the line being typed.
#[derive(Debug, PartialEq, Eq)]
pub enum Edit {
    Pushed,
    Popped,
    Ignored,
    Submit,
    Abort,
}

/// Applies `key` to `line`. Pure so that the editing rules can be tested
/// without a terminal.
pub fn edit_line(line: &mut String, key: &KeyEvent) -> Edit {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Edit::Submit,
        KeyCode::Esc => Edit::Abort,
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Edit::Abort,
        KeyCode::Char(ch) if !ctrl => {
            line.push(ch);
            Edit::Pushed
        }
        KeyCode::Backspace => match line.pop() {
            Some(_) => Edit::Popped,
            None => Edit::Ignored,
        },
        _ => Edit::Ignored,
    }
}

/// Raw mode for as long as the guard lives.
struct Raw;

impl Raw {
    fn on() -> PromptResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Raw)
    }
}

impl Drop for Raw {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn say(out: &mut Stderr, text: &str) -> PromptResult<()> {
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(text)
    )?;
    out.flush()?;
    Ok(())
}

/// Reads one line without echoing it, drawing a `*` per character.
pub fn read_hidden(label: &str) -> PromptResult<String> {
    let _raw = Raw::on()?;
    let mut out = std::io::stderr();
    say(&mut out, label)?;

    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match edit_line(&mut line, &key) {
            Edit::Pushed => queue!(out, Print("*"))?,
            Edit::Popped => queue!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?,
            Edit::Ignored => continue,
            Edit::Submit => {
                say(&mut out, "\r\n")?;
                return Ok(line);
            }
            Edit::Abort => {
                say(&mut out, "\r\n")?;
                return Err("aborted".into());
            }
        }
        out.flush()?;
    }
}

/// Asks for a new password and its confirmation, up to `attempts` times.
pub fn new_password(attempts: usize) -> PromptResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..attempts {
        let first = read_hidden("New password: ")?;
        if first.trim().is_empty() {
            say(&mut out, "Empty password, try again.\r\n")?;
            continue;
        }
        if read_hidden("Repeat password: ")? == first {
            return Ok(first);
        }
        say(&mut out, "The two passwords differ, try again.\r\n")?;
    }
    Err(format!("no valid password after {attempts} attempts").into())
}
