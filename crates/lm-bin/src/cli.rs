//! Command line surface.

use std::path::PathBuf;

use clap::Parser;
use core_actions::MoveDirection;
use core_text::{Position, Selection};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name = "line-mover",
    version,
    about = "Move the selected lines of a file up or down"
)]
pub struct Args {
    /// File to edit (UTF-8 text).
    pub path: PathBuf,
    /// Configuration file path (overrides discovery of `line-mover.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Initial selection, 1-based: `LINE:COL` for a cursor or `LINE:COL..LINE:COL` for
    /// anchor..head.
    #[arg(long = "select", value_parser = parse_selection, default_value = "1:1")]
    pub select: Selection,
    /// Command to run (`up`, `down` or the namespaced `line-mover:*` form). Repeatable;
    /// commands run in the order given.
    #[arg(short = 'c', long = "command", value_parser = parse_direction)]
    pub commands: Vec<MoveDirection>,
    /// Write the result back to PATH instead of printing it.
    #[arg(long = "in-place")]
    pub in_place: bool,
}

pub fn parse_direction(raw: &str) -> Result<MoveDirection, String> {
    MoveDirection::from_command(raw.trim())
        .ok_or_else(|| format!("unknown command `{raw}` (expected up or down)"))
}

pub fn parse_selection(raw: &str) -> Result<Selection, String> {
    match raw.split_once("..") {
        Some((anchor, head)) => Ok(Selection::new(
            parse_position(anchor)?,
            parse_position(head)?,
        )),
        None => parse_position(raw).map(Selection::collapsed),
    }
}

fn parse_position(raw: &str) -> Result<Position, String> {
    let (line, column) = raw
        .trim()
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got `{raw}`"))?;
    Ok(Position::new(one_based(line)?, one_based(column)?))
}

fn one_based(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("line and column numbers start at 1".to_string()),
        Ok(n) => Ok(n - 1),
        Err(e) => Err(format!("invalid number `{raw}`: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cursor_selection_is_collapsed() {
        assert_eq!(
            parse_selection("2:1").unwrap(),
            Selection::collapsed(Position::new(1, 0))
        );
    }

    #[test]
    fn range_keeps_anchor_and_head_order() {
        let sel = parse_selection("3:2..1:1").unwrap();
        assert_eq!(sel.anchor, Position::new(2, 1));
        assert_eq!(sel.head, Position::new(0, 0));
        assert!(sel.is_backward());
    }

    #[test]
    fn malformed_selections_are_rejected() {
        assert!(parse_selection("3").is_err());
        assert!(parse_selection("0:1").is_err());
        assert!(parse_selection("1:x").is_err());
        assert!(parse_selection("1:1..").is_err());
    }

    #[test]
    fn directions_accept_both_name_forms() {
        assert_eq!(parse_direction("up").unwrap(), MoveDirection::Up);
        assert_eq!(
            parse_direction("line-mover:down").unwrap(),
            MoveDirection::Down
        );
        assert!(parse_direction("left").is_err());
    }

    #[test]
    fn args_parse_repeated_commands() {
        let args = Args::try_parse_from([
            "line-mover",
            "notes.txt",
            "--select",
            "1:1..2:3",
            "-c",
            "down",
            "--command",
            "up",
            "--in-place",
        ])
        .unwrap();
        assert_eq!(args.path, PathBuf::from("notes.txt"));
        assert_eq!(args.commands, vec![MoveDirection::Down, MoveDirection::Up]);
        assert_eq!(
            args.select,
            Selection::new(Position::new(0, 0), Position::new(1, 2))
        );
        assert!(args.in_place);
    }

    #[test]
    fn default_selection_is_document_start() {
        let args = Args::try_parse_from(["line-mover", "notes.txt"]).unwrap();
        assert_eq!(args.select, Selection::collapsed(Position::origin()));
        assert!(args.commands.is_empty());
        assert!(!args.in_place);
    }
}
