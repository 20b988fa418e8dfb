//! Layout components (sidebar, status bar)

use super::components::{render_sidebar_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::platform::{RESET_SHORTCUT, SAVE_SHORTCUT};
use crate::state::{DetailTab, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into sidebar and main content, leaving the last row for the status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20), // Sidebar
            Constraint::Min(0),     // Main content
        ])
        .split(rows[0]);

    (columns[0], columns[1])
}

/// Draw the clinic header and one button per section
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(View::SECTIONS.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        format!(" {}", app.config.clinic_name()),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, chunks[0]);

    let active = app.state.current_view.section();
    for (idx, view) in View::SECTIONS.iter().enumerate() {
        let key = char::from_digit(idx as u32 + 1, 10).unwrap_or(' ');
        render_sidebar_button(frame, chunks[idx + 1], key, view.title(), *view == active);
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", view_hints(app)),
        Style::default().fg(Color::Gray),
    )];

    if let Some(msg) = &app.status_message {
        let color = if msg.starts_with("Corrija") {
            Color::Yellow
        } else {
            Color::Green
        };
        spans.push(Span::raw("| "));
        spans.push(Span::styled(msg, Style::default().fg(color)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);
}

/// Keyboard hints for the current view
fn view_hints(app: &App) -> String {
    let form = format!("Tab:campo  ←/→:opção  Espaço:marcar  {SAVE_SHORTCUT}:salvar  {RESET_SHORTCUT}:limpar");
    match app.state.current_view {
        View::Dashboard => "j/k:nav  Enter:abrir  n:novo paciente  1-3:seção  q:sair".to_string(),
        View::Patients if app.state.search_active => "digite para buscar  Enter/Esc:fechar busca".to_string(),
        View::Patients => "j/k:nav  Enter:abrir  /:buscar  n:novo  q:sair".to_string(),
        View::PatientDetail if app.state.detail_tab == DetailTab::History => {
            "j/k:nav  ←/→:aba  Ctrl+T:aba  Esc:voltar".to_string()
        }
        View::PatientDetail => format!("{form}  Ctrl+T:aba  Esc:voltar"),
        View::PatientCreate => format!("{form}  Esc:cancelar"),
        View::Agenda => "h/l:dia  j/k:semana  [/]:mês  t:hoje  Esc:voltar".to_string(),
    }
}
