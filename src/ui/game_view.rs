use crate::game::{Board, Coord, GameSession, Occupant, Phase, Player};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    session: &GameSession,
    cursor: Coord,
    message: &Option<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(12),   // Board
            Constraint::Length(3), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, session, chunks[0]);
    render_board(frame, session.board(), cursor, chunks[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, chunks[3]);
}

fn player_color(player: Player) -> Color {
    match player {
        Player::One => Color::Red,
        Player::Two => Color::Yellow,
    }
}

fn render_header(frame: &mut Frame, session: &GameSession, area: ratatui::layout::Rect) {
    let (one, two) = session.score();
    let status = match session.phase() {
        Phase::Terminal(winner) => format!("Game Over: {} wins", winner.name()),
        Phase::InProgress(turn) => format!("Turn: {}", turn.name()),
        Phase::AwaitingContinuation { turn, .. } => format!("Turn: {} (jumping)", turn.name()),
    };
    let status = format!(
        "{}  |  Score {} - {}  |  {}",
        status,
        one,
        two,
        session.variant()
    );

    let header = Paragraph::new(status)
        .style(
            Style::default()
                .fg(player_color(session.turn()))
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Checkers"));

    frame.render_widget(header, area);
}

fn render_board(
    frame: &mut Frame,
    board: &Board,
    cursor: Coord,
    area: ratatui::layout::Rect,
) {
    let mut lines = Vec::new();

    let mut col_line = vec![Span::raw("    ")];
    for x in 0..board.width() {
        col_line.push(Span::raw(format!(" {x:<2}")));
    }
    lines.push(Line::from(col_line));

    for y in 0..board.height() {
        let mut row_spans = vec![Span::raw(format!("{y:>2}  "))];

        for x in 0..board.width() {
            let coord = Coord::new(x, y);
            let Some(cell) = board.get(coord) else {
                continue;
            };
            let decor = cell.decorations();
            let (symbol, mut style) = match cell.occupant() {
                _ if cell.is_disabled() => (" x ", Style::default().fg(Color::DarkGray)),
                Occupant::Blocked => ("   ", Style::default().bg(Color::Black)),
                Occupant::Empty if decor.target => (" + ", Style::default().fg(Color::Green)),
                Occupant::Empty => (" . ", Style::default().fg(Color::DarkGray)),
                Occupant::PlayerOne | Occupant::PlayerTwo => {
                    let symbol = if cell.is_king() { " ◉ " } else { " ● " };
                    let color = cell.owner().map_or(Color::White, player_color);
                    (symbol, Style::default().fg(color))
                }
            };
            if decor.selected {
                style = style.bg(Color::Cyan).add_modifier(Modifier::BOLD);
            } else if decor.movable {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if coord == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            row_spans.push(Span::styled(symbol, style));
        }

        lines.push(Line::from(row_spans));
    }

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: ratatui::layout::Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: ratatui::layout::Rect) {
    let line = Line::from("Arrows: Cursor  |  Enter: Select/Move  |  U: Undo  |  G: Guides  |  R: Restart  |  Q: Quit");

    let controls = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}
