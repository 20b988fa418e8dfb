//! Agenda: month calendar plus the highlighted day's appointments

use crate::app::App;
use crate::state::schedule::{has_appointments, month_grid, month_name};
use chrono::Datelike;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const WEEKDAYS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(area);

    draw_calendar(frame, chunks[0], app);
    draw_day(frame, chunks[1], app);
}

fn draw_calendar(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let (year, month) = state.agenda_month();

    let mut lines = vec![Line::from(
        WEEKDAYS
            .iter()
            .map(|d| Span::styled(format!("{d:<4}"), Style::default().fg(Color::DarkGray)))
            .collect::<Vec<_>>(),
    )];

    for week in month_grid(year, month) {
        let spans: Vec<Span> = week
            .iter()
            .map(|slot| match slot {
                None => Span::raw("    "),
                Some(day) => {
                    let mut style = Style::default();
                    if has_appointments(*day, &state.appointments) {
                        style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
                    }
                    if *day == state.today {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    if *day == state.agenda_day {
                        style = style.bg(Color::Cyan).fg(Color::Black);
                    }
                    Span::styled(format!("{:>3} ", day.day()), style)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "● dia com consultas",
        Style::default().fg(Color::Green),
    )));

    let block = Block::default()
        .title(format!(" {} {} ", month_name(month), year))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_day(frame: &mut Frame, area: Rect, app: &App) {
    let day = app.state.agenda_day;
    let block = Block::default()
        .title(format!(" Consultas em {} ", day.format("%d/%m/%Y")))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let appointments = app.state.agenda_appointments();
    if appointments.is_empty() {
        let empty = Paragraph::new("Nenhuma consulta agendada para este dia.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = appointments
        .iter()
        .flat_map(|appt| {
            [
                Line::from(vec![
                    Span::styled(
                        format!(" {} ", appt.time_range()),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        appt.patient.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("   {}", appt.kind.label()),
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
