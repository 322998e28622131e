//! Line-oriented play loop: reads movement and interaction commands,
//! drives the world, and prints what the presenter drew.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use geocache_core::{CellCoord, Interaction, LatLng, Player, World};

use crate::presenter::{TextPresenter, describe};

pub const HELP: &str = "\
commands:
  n | s | e | w        step one tile north/south/east/west
  goto LAT LNG         jump to a position
  look                 list caches in range
  click X Y            take, or combine when carrying a token
  take X Y             take a cache's token
  combine X Y          deposit a matching token into a cache
  status               show what you carry
  help                 this text
  quit                 save and exit";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Step { dx: i32, dy: i32 },
    Goto(LatLng),
    Look,
    Click(CellCoord),
    Take(CellCoord),
    Combine(CellCoord),
    Status,
    Help,
    Quit,
}

fn parse_cell(args: &[&str]) -> Result<CellCoord, String> {
    let key = match args {
        [key] => key.to_string(),
        [x, y] => format!("{x},{y}"),
        _ => return Err("expected a cell: X Y".to_string()),
    };
    key.parse::<CellCoord>().map_err(|e| e.to_string())
}

fn parse_position(args: &[&str]) -> Result<LatLng, String> {
    let [lat, lng] = args else {
        return Err("expected a position: LAT LNG".to_string());
    };
    let lat: f64 = lat.parse().map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lng: f64 = lng.parse().map_err(|_| format!("invalid longitude '{lng}'"))?;
    if !lat.is_finite() || !lng.is_finite() {
        return Err("position must be finite".to_string());
    }
    Ok(LatLng::new(lat, lng))
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let (verb, args) = (words[0].to_lowercase(), &words[1..]);
    let command = match verb.as_str() {
        "n" | "north" => Command::Step { dx: 0, dy: 1 },
        "s" | "south" => Command::Step { dx: 0, dy: -1 },
        "e" | "east" => Command::Step { dx: 1, dy: 0 },
        "w" | "west" => Command::Step { dx: -1, dy: 0 },
        "goto" => Command::Goto(parse_position(args)?),
        "look" | "l" => Command::Look,
        "click" => Command::Click(parse_cell(args)?),
        "take" => Command::Take(parse_cell(args)?),
        "combine" => Command::Combine(parse_cell(args)?),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn interaction_line(world: &World<TextPresenter>, cell: CellCoord, outcome: Interaction) -> String {
    match outcome {
        Interaction::Took { amount } => format!("took {amount} from {cell}. {}", world.status_line()),
        Interaction::Won { amount } => format!("You won! You hold a token of value {amount}."),
        Interaction::Combined { tokens } => {
            format!("combined into {cell}, which now holds {tokens}. {}", world.status_line())
        }
        Interaction::Unchanged => format!("nothing happens at {cell}. {}", world.status_line()),
        Interaction::Ignored => format!("no cache in range at {cell}"),
    }
}

pub fn look_lines(world: &World<TextPresenter>) -> Vec<String> {
    let mut lines = vec![format!(
        "you are at {} (cell {})",
        world.player().position,
        world.current_cell()
    )];
    let caches = world.visible_caches();
    if caches.is_empty() {
        lines.push("no caches in range".to_string());
    }
    lines.extend(caches.iter().map(|(cell, m)| describe(*cell, m)));
    lines.push(world.status_line());
    lines
}

/// Apply one command. Returns `false` when the loop should stop.
///
/// `save_player` runs after every interaction that changed a cache, before
/// anything is printed, so the carried token is durable as soon as the
/// cache memento is.
pub fn execute(
    world: &mut World<TextPresenter>,
    command: Command,
    save_player: &mut impl FnMut(&Player) -> Result<()>,
    out: &mut impl Write,
) -> Result<bool> {
    let mut lines = Vec::new();
    let outcome = match command {
        Command::Step { dx, dy } => {
            world.step(dx, dy);
            lines.push(format!("moved to cell {}", world.current_cell()));
            None
        }
        Command::Goto(pos) => {
            world.on_player_move(pos);
            lines.push(format!("moved to cell {}", world.current_cell()));
            None
        }
        Command::Look => {
            lines.extend(look_lines(world));
            None
        }
        Command::Click(cell) => Some((cell, world.on_cell_clicked(cell))),
        Command::Take(cell) => Some((cell, world.take(cell))),
        Command::Combine(cell) => Some((cell, world.combine(cell))),
        Command::Status => {
            lines.push(world.status_line());
            None
        }
        Command::Help => {
            lines.push(HELP.to_string());
            None
        }
        Command::Quit => return Ok(false),
    };

    if let Some((cell, outcome)) = outcome {
        if outcome.changed_state() {
            save_player(world.player()).context("failed to save player")?;
        }
        lines.push(interaction_line(world, cell, outcome));
    }

    for line in world.presenter_mut().drain().into_iter().chain(lines) {
        writeln!(out, "{line}").context("failed to write output")?;
    }
    Ok(true)
}

/// Run commands from `input` until `quit` or end of input.
pub fn run(
    world: &mut World<TextPresenter>,
    input: impl BufRead,
    mut save_player: impl FnMut(&Player) -> Result<()>,
    out: &mut impl Write,
) -> Result<()> {
    for line in world.presenter_mut().drain() {
        writeln!(out, "{line}").context("failed to write output")?;
    }
    writeln!(out, "{}", world.status_line())?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        match parse_command(&line) {
            Ok(Some(command)) => {
                if !execute(world, command, &mut save_player, out)? {
                    break;
                }
            }
            Ok(None) => {}
            Err(msg) => writeln!(out, "{msg}")?,
        }
    }
    Ok(())
}
