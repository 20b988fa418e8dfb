//! Dashboard: headline numbers, recent patients and today's appointments

use super::render_scrollable_list;
use super::widgets::{render_stat_card, selected_style};
use crate::app::App;
use crate::state::schedule::appointments_on;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Greeting
            Constraint::Length(4), // Cards
            Constraint::Min(0),    // Lists
        ])
        .split(area);

    let greeting = Paragraph::new(vec![Line::from(vec![
        Span::styled(" Dashboard", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  Bem-vindo, {}", app.config.doctor_name()),
            Style::default().fg(Color::DarkGray),
        ),
    ])]);
    frame.render_widget(greeting, rows[0]);

    draw_cards(frame, rows[1], app);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    draw_recent(frame, lists[0], app);
    draw_upcoming(frame, lists[1], app);
}

fn draw_cards(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    render_stat_card(
        frame,
        cards[0],
        "Total de Pacientes",
        state.directory.patients().len().to_string(),
        "cadastrados",
    );
    render_stat_card(
        frame,
        cards[1],
        "Consultas Hoje",
        appointments_on(state.today, &state.upcoming).len().to_string(),
        "agendadas",
    );
    render_stat_card(
        frame,
        cards[2],
        "Pacientes Ativos",
        state.directory.active_count().to_string(),
        "em acompanhamento",
    );
    render_stat_card(
        frame,
        cards[3],
        "Fichas no Mês",
        state.directory.records_in_month(state.today).to_string(),
        "registradas",
    );
}

fn draw_recent(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .state
        .directory
        .recent()
        .iter()
        .map(|recent| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:<3}", recent.initials()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(format!("{:<20}", recent.name)),
                Span::styled(
                    format!("{} · {}", recent.when, recent.kind),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Pacientes Recentes ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(selected_style());
    render_scrollable_list(frame, area, list, app.state.selected_index);
}

fn draw_upcoming(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Próximas Consultas ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let today = appointments_on(app.state.today, &app.state.upcoming);
    if today.is_empty() {
        let empty = Paragraph::new("Nenhuma consulta para hoje.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = today
        .iter()
        .map(|appt| {
            Line::from(vec![
                Span::styled(
                    format!(" {} ", appt.time().format("%H:%M")),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(format!("{:<20}", appt.patient)),
                Span::styled(appt.kind.label(), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
