//! Compact text notation for commands.
//!
//! Used in log lines and rejection diagnostics; the wire format belongs to
//! the transport. Forms:
//!
//! - `U x,y [M x,y] [A x,y] [C]`: unit order (move, attack, capture)
//! - `R x,y`: repair
//! - `B x,y <type>`: build, where `<type>` is a unit tag such as `linf`
//! - `E`: end turn

use thiserror::Error;

use crate::board::hex::Coord;
use crate::board::unit::ALL_UNIT_TYPES;
use crate::order::command::{Command, UnitCommand};

/// Errors that can occur when parsing command notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid coordinate '{0}'")]
    InvalidCoord(String),

    #[error("unknown unit tag '{0}'")]
    UnknownUnitTag(String),

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(String),

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
}

/// Formats a command in compact notation.
pub fn format_command(cmd: &Command) -> String {
    match cmd {
        Command::Unit(u) => {
            let mut s = format!("U {}", u.at);
            if let Some(to) = u.move_to {
                s.push_str(&format!(" M {}", to));
            }
            if let Some(target) = u.attack {
                s.push_str(&format!(" A {}", target));
            }
            if u.capture {
                s.push_str(" C");
            }
            s
        }
        Command::Repair { at } => format!("R {}", at),
        Command::Build { at, unit_type } => format!("B {} {}", at, unit_type.tag()),
        Command::EndTurn => "E".to_string(),
    }
}

/// Parses a command from compact notation.
pub fn parse_command(s: &str) -> Result<Command, NotationError> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Err(NotationError::EmptyInput);
    };

    match head {
        "E" => {
            expect_end(&tokens, 1)?;
            Ok(Command::EndTurn)
        }
        "R" => {
            let at = parse_coord_at(&tokens, 1)?;
            expect_end(&tokens, 2)?;
            Ok(Command::Repair { at })
        }
        "B" => {
            let at = parse_coord_at(&tokens, 1)?;
            let tag = tokens
                .get(2)
                .ok_or_else(|| NotationError::UnexpectedEnd("unit tag".to_string()))?;
            let unit_type = ALL_UNIT_TYPES
                .iter()
                .copied()
                .find(|t| t.tag() == *tag)
                .ok_or_else(|| NotationError::UnknownUnitTag(tag.to_string()))?;
            expect_end(&tokens, 3)?;
            Ok(Command::Build { at, unit_type })
        }
        "U" => parse_unit_command(&tokens).map(Command::Unit),
        other => Err(NotationError::UnknownCommand(other.to_string())),
    }
}

fn parse_unit_command(tokens: &[&str]) -> Result<UnitCommand, NotationError> {
    let mut cmd = UnitCommand::new(parse_coord_at(tokens, 1)?);
    let mut pos = 2;

    // Sub-orders must appear in server order: move, attack, capture.
    if tokens.get(pos) == Some(&"M") {
        cmd.move_to = Some(parse_coord_at(tokens, pos + 1)?);
        pos += 2;
    }
    if tokens.get(pos) == Some(&"A") {
        cmd.attack = Some(parse_coord_at(tokens, pos + 1)?);
        pos += 2;
    }
    if tokens.get(pos) == Some(&"C") {
        cmd.capture = true;
        pos += 1;
    }
    expect_end(tokens, pos)?;
    Ok(cmd)
}

fn parse_coord_at(tokens: &[&str], pos: usize) -> Result<Coord, NotationError> {
    let tok = tokens
        .get(pos)
        .ok_or_else(|| NotationError::UnexpectedEnd("coordinate".to_string()))?;
    parse_coord(tok)
}

/// Parses `x,y`.
pub fn parse_coord(s: &str) -> Result<Coord, NotationError> {
    let invalid = || NotationError::InvalidCoord(s.to_string());
    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<i32>().map_err(|_| invalid())?;
    let y = y.trim().parse::<i32>().map_err(|_| invalid())?;
    Ok(Coord::new(x, y))
}

fn expect_end(tokens: &[&str], pos: usize) -> Result<(), NotationError> {
    match tokens.get(pos) {
        None => Ok(()),
        Some(extra) => Err(NotationError::UnexpectedToken(extra.to_string())),
    }
}
