//! End-to-end tests for the move selector.

use std::time::Duration;

use games_connect4::{Board, Player, COLS, ROWS};
use mcts::{DecisionReason, MctsConfig, MoveSelector, StatsStore, StatsTable};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn play(columns: &[u8]) -> Board {
    let mut board = Board::new();
    let mut player = Player::Red;
    for &col in columns {
        board.apply_move(col, player).unwrap();
        player = player.opponent();
    }
    board
}

fn selector(budget: Duration) -> MoveSelector {
    MoveSelector::new(MctsConfig::for_testing().with_time_budget(budget))
}

#[test]
fn test_empty_board_opens_in_center_without_search() {
    for budget_ms in [1, 50, 500] {
        let mut sel = selector(Duration::from_millis(budget_ms));
        let decision = sel.act(&Board::new()).unwrap();

        assert_eq!(decision.column, 3);
        assert_eq!(decision.reason, DecisionReason::Opening);
        assert_eq!(sel.search().tree().get(sel.search().tree().root()).visit_count, 0);
    }
}

#[test]
fn test_takes_bottom_row_win_regardless_of_budget() {
    // Red: bottom row columns 0-2. Yellow stacked on top of them.
    let board = play(&[0, 0, 1, 1, 2, 2]);
    assert!(board.is_legal(3));

    for budget in [Duration::ZERO, Duration::from_millis(1), Duration::from_millis(200)] {
        let decision = selector(budget).act(&board).unwrap();
        assert_eq!(decision.column, 3);
        assert_eq!(decision.reason, DecisionReason::ImmediateWin);
    }
}

#[test]
fn test_blocks_threat_at_column_four() {
    // Yellow stacks three in column 4; Red to move has no win of its own.
    let board = play(&[0, 4, 6, 4, 0, 4]);
    assert_eq!(board.to_move(), Player::Red);
    assert_eq!(board.winning_column(Player::Red), None);

    let decision = selector(Duration::from_millis(10)).act(&board).unwrap();
    assert_eq!(decision.column, 4);
    assert_eq!(decision.reason, DecisionReason::Block);
}

#[test]
fn test_selects_for_yellow_too() {
    // Red threatens column 3 on the bottom row; Yellow must block.
    let board = play(&[0, 6, 1, 6, 2]);
    assert_eq!(board.to_move(), Player::Yellow);
    assert_eq!(selector(Duration::ZERO).select_move(&board).unwrap(), 3);
}

#[test]
fn test_never_returns_illegal_column() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);

    for game in 0..6 {
        let mut sel = selector(Duration::from_millis(5));
        let engine_side = if game % 2 == 0 { Player::Red } else { Player::Yellow };
        let mut board = Board::new();
        let mut player = Player::Red;

        while board.outcome().is_none() {
            let col = if player == engine_side {
                let col = sel.select_move(&board).unwrap();
                assert!(board.is_legal(col), "illegal column {} on\n{}", col, board);
                col
            } else {
                let legal = board.legal_actions();
                *legal.choose(&mut rng).unwrap()
            };
            board.apply_move(col, player).unwrap();
            player = player.opponent();
        }
    }
}

#[test]
fn test_nearly_full_board_returns_only_legal_column() {
    // Fill every column except the top cell of column 6 without any line of four.
    let mut rows = [[0i8; COLS]; ROWS];
    for (row, line) in rows.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            let band = (row / 2) % 2 == 1;
            *cell = if (col % 2 == 0) ^ band { 1 } else { -1 };
        }
    }
    rows[0][6] = 0;
    let board = Board::from_rows(rows).unwrap();
    assert_eq!(board.legal_actions(), vec![6]);
    assert_eq!(board.outcome(), None);

    let col = selector(Duration::from_millis(10)).select_move(&board).unwrap();
    assert_eq!(col, 6);
}

#[test]
fn test_store_accumulates_across_turns() {
    let mut sel: MoveSelector = selector(Duration::from_millis(20)).with_store(StatsTable::new());

    let first = play(&[3, 3]);
    let decision = sel.act(&first).unwrap();
    let after_first = sel.search().store().unwrap().len();
    assert!(after_first > 0);

    let mut second = first;
    second.apply_move(decision.column, Player::Red).unwrap();
    let reply = second
        .legal_actions()
        .into_iter()
        .find(|&c| {
            let mut next = second;
            next.apply_move(c, Player::Yellow).unwrap();
            next.winning_column(Player::Red).is_none()
                && next.winning_column(Player::Yellow).is_none()
        })
        .unwrap();
    second.apply_move(reply, Player::Yellow).unwrap();

    sel.act(&second).unwrap();
    assert!(sel.search().store().unwrap().len() > after_first);
}
