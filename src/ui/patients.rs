//! Patient list and patient detail views

use super::forms::draw_form;
use super::render_scrollable_list;
use super::widgets::selected_style;
use crate::app::App;
use crate::state::directory::{Patient, PatientStatus};
use crate::state::DetailTab;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

/// Draw the searchable patient list
pub fn draw_list(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    draw_search_bar(frame, chunks[0], app);

    let patients = app.state.filtered_patients();
    let title = format!(" Pacientes ({}) ", patients.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.state.search_active {
            Color::DarkGray
        } else {
            Color::Cyan
        }));

    if patients.is_empty() {
        let empty = Paragraph::new("Nenhum paciente encontrado.\nPressione 'n' para cadastrar.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = patients.iter().map(|p| patient_row(p)).collect();
    let list = List::new(items).block(block).highlight_style(selected_style());
    render_scrollable_list(frame, chunks[1], list, app.state.selected_index);
}

fn draw_search_bar(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.state.search_active;
    let query = &app.state.search_query;
    let text = if query.is_empty() && !active {
        Span::styled("Buscar por nome ou telefone (/)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(query.as_str())
    };
    let mut spans = vec![Span::raw(" "), text];
    if active {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }

    let block = Block::default()
        .title(" Buscar ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if active { Color::Cyan } else { Color::DarkGray }));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn patient_row(patient: &Patient) -> ListItem<'static> {
    let status_color = match patient.status {
        PatientStatus::Ativo => Color::Green,
        PatientStatus::Inativo => Color::DarkGray,
    };
    ListItem::new(Line::from(vec![
        Span::raw(format!(" {:<20}", patient.name)),
        Span::styled(
            format!("{:>3} anos  {:<2}", patient.age, patient.gender),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(format!("{:<17}", patient.phone)),
        Span::styled(
            format!("{:<12}", patient.last_visit_label()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(patient.status.label(), Style::default().fg(status_color)),
    ]))
}

/// Draw the patient header, the tab bar, and the active tab
pub fn draw_detail(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Patient card
            Constraint::Length(1), // Tabs
            Constraint::Min(0),    // Tab content
        ])
        .split(area);

    draw_patient_card(frame, chunks[0], app);

    let selected = DetailTab::ALL
        .iter()
        .position(|t| *t == app.state.detail_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(DetailTab::ALL.iter().map(|t| t.label()))
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[1]);

    match (&app.state.form, app.state.detail_tab) {
        (_, DetailTab::History) | (None, _) => draw_history(frame, chunks[2], app),
        (Some(editor), _) => draw_form(frame, chunks[2], editor),
    }
}

fn draw_patient_card(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!(" {} ", app.state.current_view.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(patient) = app.state.current_patient() else {
        let missing = Paragraph::new("Paciente não encontrado.")
            .style(Style::default().fg(Color::Red))
            .block(block);
        frame.render_widget(missing, area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(vec![
        Span::styled(patient.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {} anos · {}", patient.age, patient.status.label()), label),
    ])];

    match app.state.directory.details(&patient.id) {
        Some(details) => {
            lines.push(Line::from(vec![
                Span::styled("Nascimento: ", label),
                Span::raw(details.birth_date.format("%d/%m/%Y").to_string()),
                Span::styled("  CPF: ", label),
                Span::raw(details.cpf.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Contato: ", label),
                Span::raw(format!("{}  {}", details.phone, details.email)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Endereço: ", label),
                Span::raw(details.address.clone()),
            ]));
        }
        None => {
            lines.push(Line::from(vec![
                Span::styled("Telefone: ", label),
                Span::raw(patient.phone.clone()),
            ]));
            lines.push(Line::from(Span::styled(
                "Cadastro completo indisponível para este paciente.",
                label,
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn draw_history(frame: &mut Frame, area: Rect, app: &App) {
    let patient_id = app.state.view_params.patient_id.as_deref().unwrap_or_default();
    let records = app.state.directory.records(patient_id);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let block = Block::default()
        .title(" Histórico de Consultas ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if records.is_empty() {
        let empty = Paragraph::new("Nenhum registro para este paciente.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = records
        .iter()
        .map(|r| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", r.date.format("%d/%m/%Y")),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(format!("{:<32}", r.diagnosis)),
                Span::styled(r.doctor.clone(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();
    let list = List::new(items).block(block).highlight_style(selected_style());
    render_scrollable_list(frame, chunks[0], list, app.state.selected_index);

    let notes = app
        .state
        .directory
        .details(patient_id)
        .map(|d| d.notes.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("Sem observações.");
    let notes = Paragraph::new(notes)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Observações ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(notes, chunks[1]);
}
