//! Application state definitions

use super::directory::{Directory, Patient};
use super::forms::FormEditor;
use super::schedule::{appointments_on, next_month, prev_month, Appointment};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Patients,
    PatientDetail,
    PatientCreate,
    Agenda,
}

impl View {
    /// Sidebar sections, in display order
    pub const SECTIONS: [View; 3] = [View::Dashboard, View::Patients, View::Agenda];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Patients => "Pacientes",
            View::PatientDetail => "Detalhes do Paciente",
            View::PatientCreate => "Novo Paciente",
            View::Agenda => "Agenda",
        }
    }

    /// Sidebar section this view belongs to
    pub fn section(&self) -> View {
        match self {
            View::PatientDetail | View::PatientCreate => View::Patients,
            other => *other,
        }
    }

    pub fn has_form(&self) -> bool {
        matches!(self, View::PatientDetail | View::PatientCreate)
    }
}

/// View parameters for navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    pub patient_id: Option<String>,
}

/// Tabs of the patient detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    MedicalRecord,
    Phototherapy,
    History,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [
        DetailTab::MedicalRecord,
        DetailTab::Phototherapy,
        DetailTab::History,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MedicalRecord => "Ficha Clínica",
            Self::Phototherapy => "Fototerapia",
            Self::History => "Histórico",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::MedicalRecord => Self::Phototherapy,
            Self::Phototherapy => Self::History,
            Self::History => Self::MedicalRecord,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::MedicalRecord => Self::History,
            Self::Phototherapy => Self::MedicalRecord,
            Self::History => Self::Phototherapy,
        }
    }
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_params: ViewParams,
    pub view_history: Vec<(View, ViewParams)>,

    // Data
    pub directory: Directory,
    pub appointments: Vec<Appointment>,
    pub upcoming: Vec<Appointment>,
    pub today: NaiveDate,

    // Selection
    pub selected_index: usize,

    // Patient list search
    pub search_query: String,
    pub search_active: bool,

    // Patient detail
    pub detail_tab: DetailTab,

    /// Form open in the current view, if any
    pub form: Option<FormEditor>,

    // Agenda
    pub agenda_day: NaiveDate,

    /// Errors waiting to be shown, oldest first
    pub error_queue: VecDeque<String>,
}

impl AppState {
    pub fn new(
        directory: Directory,
        appointments: Vec<Appointment>,
        upcoming: Vec<Appointment>,
        today: NaiveDate,
        agenda_day: NaiveDate,
    ) -> Self {
        Self {
            current_view: View::default(),
            view_params: ViewParams::default(),
            view_history: Vec::new(),
            directory,
            appointments,
            upcoming,
            today,
            selected_index: 0,
            search_query: String::new(),
            search_active: false,
            detail_tab: DetailTab::default(),
            form: None,
            agenda_day,
            error_queue: VecDeque::new(),
        }
    }

    pub fn push_error(&mut self, message: String) {
        self.error_queue.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.error_queue.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.error_queue.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.error_queue.pop_front();
    }

    /// Move selection down
    pub fn move_selection_down(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up
    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Reset selection
    pub fn reset_selection(&mut self) {
        self.selected_index = 0;
    }

    /// Patients matching the current search
    pub fn filtered_patients(&self) -> Vec<&Patient> {
        self.directory.search(&self.search_query)
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.filtered_patients().get(self.selected_index).copied()
    }

    /// Patient shown by the detail view
    pub fn current_patient(&self) -> Option<&Patient> {
        self.view_params
            .patient_id
            .as_deref()
            .and_then(|id| self.directory.patient(id))
    }

    pub fn search_push(&mut self, c: char) {
        self.search_query.push(c);
        self.reset_selection();
    }

    pub fn search_pop(&mut self) {
        self.search_query.pop();
        self.reset_selection();
    }

    /// Appointments on the highlighted agenda day
    pub fn agenda_appointments(&self) -> Vec<&Appointment> {
        appointments_on(self.agenda_day, &self.appointments)
    }

    /// Move the highlighted agenda day by `days`
    pub fn shift_agenda_day(&mut self, days: i64) {
        if let Some(day) = self.agenda_day.checked_add_signed(Duration::days(days)) {
            self.agenda_day = day;
        }
    }

    pub fn next_agenda_month(&mut self) {
        self.agenda_day = next_month(self.agenda_day);
    }

    pub fn prev_agenda_month(&mut self) {
        self.agenda_day = prev_month(self.agenda_day);
    }

    pub fn agenda_month(&self) -> (i32, u32) {
        (self.agenda_day.year(), self.agenda_day.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::schedule::sample_appointments;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> AppState {
        AppState::new(
            Directory::sample(),
            sample_appointments(),
            Vec::new(),
            date(2024, 4, 15),
            date(2024, 4, 15),
        )
    }

    mod selection {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_move_selection_stops_at_bounds() {
            let mut state = state();
            state.move_selection_up();
            assert_eq!(state.selected_index, 0);
            for _ in 0..10 {
                state.move_selection_down(5);
            }
            assert_eq!(state.selected_index, 4);
        }

        #[test]
        fn test_move_selection_down_with_zero_max() {
            let mut state = state();
            state.move_selection_down(0);
            assert_eq!(state.selected_index, 0);
        }

        #[test]
        fn test_search_resets_selection() {
            let mut state = state();
            state.selected_index = 3;
            for c in "costa".chars() {
                state.search_push(c);
            }
            assert_eq!(state.selected_index, 0);
            assert_eq!(state.selected_patient().unwrap().name, "Juliana Costa");
            state.search_query.clear();
            assert_eq!(state.filtered_patients().len(), 5);
        }
    }

    mod agenda {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_day_shift_and_listing() {
            let mut state = state();
            assert_eq!(state.agenda_appointments().len(), 2);
            state.shift_agenda_day(2);
            assert_eq!(state.agenda_day, date(2024, 4, 17));
            assert_eq!(state.agenda_appointments()[0].patient, "Juliana Costa");
            state.shift_agenda_day(7);
            assert!(state.agenda_appointments().is_empty());
        }

        #[test]
        fn test_month_navigation() {
            let mut state = state();
            state.next_agenda_month();
            assert_eq!(state.agenda_month(), (2024, 5));
            state.prev_agenda_month();
            state.prev_agenda_month();
            assert_eq!(state.agenda_day, date(2024, 3, 1));
        }
    }

    #[test]
    fn test_error_queue_is_fifo() {
        let mut state = state();
        assert!(!state.has_errors());
        state.push_error("first".to_string());
        state.push_error("second".to_string());
        assert_eq!(state.current_error(), Some("first"));
        state.dismiss_error();
        assert_eq!(state.current_error(), Some("second"));
        state.dismiss_error();
        assert!(!state.has_errors());
    }

    #[test]
    fn test_view_sections() {
        assert_eq!(View::PatientDetail.section(), View::Patients);
        assert_eq!(View::Agenda.section(), View::Agenda);
        assert!(View::PatientCreate.has_form());
        assert!(!View::Dashboard.has_form());
    }

    #[test]
    fn test_detail_tab_cycle() {
        let tab = DetailTab::default();
        assert_eq!(tab.next().next().next(), tab);
        assert_eq!(tab.prev(), DetailTab::History);
        assert_eq!(DetailTab::Phototherapy.label(), "Fototerapia");
    }
}
