//! UI module for rendering the TUI

mod agenda;
mod components;
mod dashboard;
mod forms;
mod layout;
mod patients;
mod widgets;

use crate::app::App;
use crate::state::View;
use components::render_error_dialog;
use ratatui::Frame;
pub use widgets::render_scrollable_list;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (sidebar_area, main_area) = layout::create_layout(frame.area());

    layout::draw_sidebar(frame, sidebar_area, app);

    match app.state.current_view {
        View::Dashboard => dashboard::draw(frame, main_area, app),
        View::Patients => patients::draw_list(frame, main_area, app),
        View::PatientDetail => patients::draw_detail(frame, main_area, app),
        View::PatientCreate => forms::draw_patient_create(frame, main_area, app),
        View::Agenda => agenda::draw(frame, main_area, app),
    }

    layout::draw_status_bar(frame, app);

    // Error dialog goes on top of everything
    if let Some(message) = app.state.current_error() {
        render_error_dialog(frame, message, app.state.error_queue.len() - 1);
    }
}
