//! Application state and core logic

use crate::config::ClinicConfig;
use crate::platform::is_shortcut;
use crate::state::directory::Directory;
use crate::state::forms::{
    is_region_picker, FieldKind, FormDefinition, FormEditor, FormSession, RecordKind,
    SubmitError, SubmitOutcome, MEDICAL_RECORD_FORM, PATIENT_FORM, PHOTOTHERAPY_FORM,
};
use crate::state::schedule::{sample_appointments, upcoming_for};
use crate::state::{AppState, DetailTab, View, ViewParams};
use crate::store::{PersistRequest, RecordStoreTrait, SimulatedStore};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Store completion delivered back to the event loop
#[derive(Debug)]
pub struct SubmitCompletion {
    pub request: PersistRequest,
    pub outcome: Result<String>,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    pub config: ClinicConfig,
    store: Arc<dyn RecordStoreTrait>,
    submit_tx: mpsc::UnboundedSender<SubmitCompletion>,
    submit_rx: mpsc::UnboundedReceiver<SubmitCompletion>,
    /// Whether the app should quit
    quit: bool,
    /// Feedback line shown in the status bar
    pub status_message: Option<String>,
    /// Write preference changes back to the config file
    persist_config: bool,
}

impl App {
    /// Create a new App backed by the simulated store
    pub fn new(config: ClinicConfig) -> Self {
        let store = Arc::new(SimulatedStore::new(config.submit_delay()));
        let today = chrono::Local::now().date_naive();
        let mut app = Self::with_store(config, store, today);
        app.persist_config = true;
        app
    }

    pub fn with_store(
        config: ClinicConfig,
        store: Arc<dyn RecordStoreTrait>,
        today: NaiveDate,
    ) -> Self {
        let state = AppState::new(
            Directory::sample(),
            sample_appointments(),
            upcoming_for(today),
            today,
            config.agenda_start(),
        );
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        Self {
            state,
            config,
            store,
            submit_tx,
            submit_rx,
            quit: false,
            status_message: None,
            persist_config: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Whether keystrokes currently go into a text input
    pub fn is_typing(&self) -> bool {
        self.state.search_active || (self.state.current_view.has_form() && self.state.form.is_some())
    }

    fn form_is_submitting(&self) -> bool {
        self.state
            .form
            .as_ref()
            .is_some_and(|f| f.session.is_submitting())
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Clear any status messages on key press, unless a save is running
        if !self.form_is_submitting() {
            self.status_message = None;
        }

        if !self.is_typing() {
            match key.code {
                KeyCode::Char('q') => {
                    self.quit();
                    return Ok(());
                }
                KeyCode::Char(c @ '1'..='3') => {
                    let index = c as usize - '1' as usize;
                    if let Some(view) = View::SECTIONS.get(index).copied() {
                        if view != self.state.current_view {
                            self.navigate(view, ViewParams::default());
                        }
                    }
                    return Ok(());
                }
                _ => {}
            }
        }

        match self.state.current_view {
            View::Dashboard => self.handle_dashboard_key(key),
            View::Patients => self.handle_patients_key(key),
            View::PatientDetail => self.handle_patient_detail_key(key),
            View::PatientCreate => self.handle_form_key(key),
            View::Agenda => self.handle_agenda_key(key),
        }
        Ok(())
    }

    /// Navigate to a new view
    pub fn navigate(&mut self, view: View, params: ViewParams) {
        self.state.view_history.push((
            self.state.current_view,
            self.state.view_params.clone(),
        ));
        self.state.current_view = view;
        self.state.view_params = params;
        self.state.reset_selection();
        if view == View::PatientDetail {
            self.state.detail_tab = DetailTab::default();
        }
        self.sync_form();
    }

    /// Go back to previous view
    pub fn go_back(&mut self) {
        if self.form_is_submitting() {
            self.status_message = Some("Aguarde o salvamento terminar.".to_string());
            return;
        }
        // The patient form is never returned to
        while let Some((view, params)) = self.state.view_history.pop() {
            if view == View::PatientCreate {
                continue;
            }
            self.state.current_view = view;
            self.state.view_params = params;
            self.state.reset_selection();
            self.sync_form();
            return;
        }
        self.state.current_view = View::Dashboard;
        self.sync_form();
    }

    /// Open a fresh form matching the current view and tab
    fn sync_form(&mut self) {
        let today = self.state.today;
        let body_view = self.config.body_view();
        let patient_id = self.state.view_params.patient_id.clone();
        let editor = |definition: &'static FormDefinition| {
            let session = match &patient_id {
                Some(id) if definition.kind.needs_patient() => {
                    FormSession::for_patient(definition, today, id.clone())
                }
                _ => FormSession::new(definition, today),
            };
            FormEditor::new(session, body_view)
        };

        self.state.form = match (self.state.current_view, self.state.detail_tab) {
            (View::PatientCreate, _) => Some(editor(&PATIENT_FORM)),
            (View::PatientDetail, DetailTab::MedicalRecord) => Some(editor(&MEDICAL_RECORD_FORM)),
            (View::PatientDetail, DetailTab::Phototherapy) => Some(editor(&PHOTOTHERAPY_FORM)),
            _ => None,
        };
    }

    fn set_detail_tab(&mut self, tab: DetailTab) {
        if self.form_is_submitting() {
            self.status_message = Some("Aguarde o salvamento terminar.".to_string());
            return;
        }
        self.state.detail_tab = tab;
        self.state.reset_selection();
        self.sync_form();
    }

    fn open_patient(&mut self, id: String) {
        self.navigate(
            View::PatientDetail,
            ViewParams {
                patient_id: Some(id),
            },
        );
    }

    /// Handle keys in Dashboard view
    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        let total = self.state.directory.recent().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection_down(total),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Enter => {
                let target = self
                    .state
                    .directory
                    .recent()
                    .get(self.state.selected_index)
                    .and_then(|recent| {
                        self.state
                            .directory
                            .patients()
                            .iter()
                            .find(|p| p.name == recent.name)
                    })
                    .map(|p| p.id.clone());
                if let Some(id) = target {
                    self.open_patient(id);
                }
            }
            KeyCode::Char('n') => self.navigate(View::PatientCreate, ViewParams::default()),
            _ => {}
        }
    }

    /// Handle keys in Patients view
    fn handle_patients_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            match key.code {
                KeyCode::Char(c) => self.state.search_push(c),
                KeyCode::Backspace => self.state.search_pop(),
                KeyCode::Enter | KeyCode::Esc | KeyCode::Down => self.state.search_active = false,
                _ => {}
            }
            return;
        }

        let total = self.state.filtered_patients().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection_down(total),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Char('n') => self.navigate(View::PatientCreate, ViewParams::default()),
            KeyCode::Enter => {
                if let Some(id) = self.state.selected_patient().map(|p| p.id.clone()) {
                    self.open_patient(id);
                }
            }
            KeyCode::Esc => {
                if self.state.search_query.is_empty() {
                    self.go_back();
                } else {
                    self.state.search_query.clear();
                    self.state.reset_selection();
                }
            }
            _ => {}
        }
    }

    /// Handle keys in Patient Detail view
    fn handle_patient_detail_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('t') && is_shortcut(key.modifiers) {
            self.set_detail_tab(self.state.detail_tab.next());
            return;
        }

        if self.state.form.is_some() {
            self.handle_form_key(key);
            return;
        }

        // History tab
        let patient_id = self.state.view_params.patient_id.clone().unwrap_or_default();
        let total = self.state.directory.records(&patient_id).len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection_down(total),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.set_detail_tab(self.state.detail_tab.next())
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.set_detail_tab(self.state.detail_tab.prev())
            }
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    /// Handle keys in Agenda view
    fn handle_agenda_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.state.shift_agenda_day(-1),
            KeyCode::Char('l') | KeyCode::Right => self.state.shift_agenda_day(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.shift_agenda_day(-7),
            KeyCode::Char('j') | KeyCode::Down => self.state.shift_agenda_day(7),
            KeyCode::Char('[') | KeyCode::PageUp => self.state.prev_agenda_month(),
            KeyCode::Char(']') | KeyCode::PageDown => self.state.next_agenda_month(),
            KeyCode::Char('t') => self.state.agenda_day = self.state.today,
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    /// Handle keys while a form has focus
    fn handle_form_key(&mut self, key: KeyEvent) {
        if is_shortcut(key.modifiers) {
            match key.code {
                KeyCode::Char('s') => self.submit_form(),
                KeyCode::Char('r') => self.reset_form(),
                _ => {}
            }
            return;
        }
        if key.code == KeyCode::Esc {
            self.go_back();
            return;
        }

        let Some(editor) = self.state.form.as_mut() else {
            return;
        };
        let Some(field) = editor.active_field() else {
            return;
        };

        let result = match key.code {
            KeyCode::Tab => {
                editor.next_field();
                Ok(())
            }
            KeyCode::BackTab => {
                editor.prev_field();
                Ok(())
            }
            KeyCode::Left => editor.cycle(-1),
            KeyCode::Right => editor.cycle(1),
            KeyCode::Char('v') if matches!(field.kind, FieldKind::MultiSelect(o) if is_region_picker(o)) => {
                editor.swap_body_view();
                if self.persist_config {
                    self.config.default_body_view = Some(editor.body_view);
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "could not save body view preference");
                    }
                }
                Ok(())
            }
            KeyCode::Char(' ') | KeyCode::Enter if !field.kind.accepts_text() => editor.toggle(),
            KeyCode::Enter if field.kind.is_multiline() => editor.insert_char('\n'),
            KeyCode::Enter => {
                editor.next_field();
                Ok(())
            }
            KeyCode::Char(c) => editor.insert_char(c),
            KeyCode::Backspace => editor.backspace(),
            _ => Ok(()),
        };

        if let Err(e) = result {
            warn!(field = field.key, error = %e, "form input ignored");
        }
    }

    fn reset_form(&mut self) {
        if let Some(editor) = self.state.form.as_mut() {
            match editor.session.reset() {
                Ok(()) => self.status_message = Some("Formulário limpo.".to_string()),
                Err(e) => warn!(error = %e, "reset ignored"),
            }
        }
    }

    /// Validate the open form and hand a valid one to the store on a spawned task
    pub fn submit_form(&mut self) {
        let Some(editor) = self.state.form.as_mut() else {
            return;
        };
        match editor.session.begin_submit() {
            Ok(request) => {
                self.status_message = Some("Salvando...".to_string());
                let store = Arc::clone(&self.store);
                let tx = self.submit_tx.clone();
                tokio::spawn(async move {
                    let outcome = store.save(request.clone()).await;
                    if tx.send(SubmitCompletion { request, outcome }).is_err() {
                        warn!("submission finished after the app closed");
                    }
                });
            }
            Err(SubmitError::Invalid(result)) => {
                self.status_message = Some(format!(
                    "Corrija {} campo(s) destacado(s) antes de salvar.",
                    result.len()
                ));
            }
            Err(SubmitError::SessionBusy) => {}
            Err(e @ SubmitError::Store(_)) => self.push_error(e.to_string()),
        }
    }

    /// Apply finished submissions; called once per loop tick
    pub fn process_submissions(&mut self) {
        while let Ok(done) = self.submit_rx.try_recv() {
            self.apply_submission(done);
        }
    }

    fn apply_submission(&mut self, done: SubmitCompletion) {
        let SubmitCompletion { request, outcome } = done;
        let saved_id = outcome.as_ref().ok().cloned();

        let owner = self
            .state
            .form
            .as_mut()
            .filter(|f| f.session.is_submitting() && f.session.definition().kind == request.kind);
        match owner {
            Some(editor) => match editor.session.finish_submit(outcome) {
                Ok(SubmitOutcome::Saved { .. }) => {}
                Ok(SubmitOutcome::Failed { reason }) => {
                    self.status_message = None;
                    self.push_error(format!("Erro ao salvar: {reason}"));
                }
                Err(e) => warn!(error = %e, "stale submission ignored"),
            },
            None => {
                if let Err(e) = &outcome {
                    self.push_error(format!("Erro ao salvar: {e}"));
                }
            }
        }

        if let Some(id) = saved_id {
            self.record_saved(&request, &id);
        }
    }

    /// Reflect a saved record in the directory and move on
    fn record_saved(&mut self, request: &PersistRequest, id: &str) {
        let values = &request.values;
        let today = self.state.today;
        match request.kind {
            RecordKind::Patient => {
                self.state.directory.add_patient(id, values, today);
                info!(%id, "patient registered");
                self.navigate(View::Patients, ViewParams::default());
                self.status_message = Some("Paciente cadastrado com sucesso!".to_string());
            }
            RecordKind::MedicalRecord | RecordKind::PhototherapyRecord => {
                let Some(patient_id) = request.patient_id.as_deref() else {
                    warn!(%id, "record saved without a patient");
                    return;
                };
                let date_key = if request.kind == RecordKind::MedicalRecord {
                    "date"
                } else {
                    "sessionDate"
                };
                let date = NaiveDate::parse_from_str(values.text(date_key), "%Y-%m-%d")
                    .unwrap_or(today);
                let summary = record_summary(request);
                let doctor = self.config.doctor_name().to_string();
                self.state
                    .directory
                    .add_record(id, patient_id, date, &summary, &doctor);
                self.status_message = Some(format!("{} salva com sucesso!", request.kind.label()));
            }
        }
    }
}

/// One-line history label for a saved clinical record
fn record_summary(request: &PersistRequest) -> String {
    let values = &request.values;
    match request.kind {
        RecordKind::PhototherapyRecord => {
            let code = values.text("diagnosis");
            let label = if code == "outro" {
                values.text("diagnosisOther")
            } else {
                PHOTOTHERAPY_FORM
                    .field("diagnosis")
                    .and_then(|f| f.kind.options())
                    .and_then(|options| options.iter().find(|o| o.value == code))
                    .map_or(code, |o| o.label)
            };
            format!("Fototerapia: {label}")
        }
        _ => values.text("diagnosis").to_string(),
    }
}
