//! Human versus engine in the terminal.

use anyhow::{anyhow, bail, Result};
use games_connect4::{Board, Outcome, Player};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::policy::Policy;

fn legal_list(board: &Board) -> String {
    board
        .legal_actions()
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read a legal column from `input`, re-prompting on anything else.
fn prompt_column<R: BufRead, W: Write>(board: &Board, input: &mut R, output: &mut W) -> Result<u8> {
    loop {
        write!(output, "Your move [{}]: ", legal_list(board))?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed before the game finished");
        }

        match line.trim().parse::<u8>() {
            Ok(col) if board.is_legal(col) => return Ok(col),
            Ok(col) => writeln!(output, "Column {} is not playable, try again.", col)?,
            Err(_) => writeln!(output, "Enter a column number, e.g. 3.")?,
        }
    }
}

/// Play one game on the console. The human plays `human` (X moves first).
///
/// Returns the final outcome.
pub fn play_console<R: BufRead, W: Write>(
    engine: &mut dyn Policy,
    human: Player,
    mut input: R,
    mut output: W,
) -> Result<Outcome> {
    let mut board = Board::new();
    let mut mover = Player::Red;

    writeln!(
        output,
        "You are {} and {} moves first.",
        human.symbol(),
        Player::Red.symbol()
    )?;

    loop {
        writeln!(output, "\n{}", board)?;

        let column = if mover == human {
            prompt_column(&board, &mut input, &mut output)?
        } else {
            let column = engine.act(&board)?;
            if !board.is_legal(column) {
                return Err(anyhow!("{} returned illegal column {}", engine.name(), column));
            }
            writeln!(output, "{} plays {}", engine.name(), column)?;
            column
        };

        let row = board.apply_move(column, mover)?;
        debug!(player = %mover, column, "Console move");

        let outcome = if board.detect_win(row, column as usize, mover) {
            Some(Outcome::Win(mover))
        } else if board.is_draw() {
            Some(Outcome::Draw)
        } else {
            None
        };

        if let Some(outcome) = outcome {
            writeln!(output, "\n{}", board)?;
            match outcome {
                Outcome::Win(winner) if winner == human => writeln!(output, "You win!")?,
                Outcome::Win(winner) => writeln!(output, "{} wins.", winner.symbol())?,
                Outcome::Draw => writeln!(output, "Draw.")?,
            }
            return Ok(outcome);
        }

        mover = mover.opponent();
    }
}
