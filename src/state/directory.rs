//! Patient directory: list rows, detail cards, record history and the
//! dashboard's recent-patient feed

use super::forms::FormValues;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientStatus {
    Ativo,
    Inativo,
}

impl PatientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ativo => "Ativo",
            Self::Inativo => "Inativo",
        }
    }
}

/// Row of the patient list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub last_visit: Option<NaiveDate>,
    pub status: PatientStatus,
}

impl Patient {
    pub fn last_visit_label(&self) -> String {
        self.last_visit
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Full registration data shown on the detail card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub patient_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecordEntry {
    pub id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    pub diagnosis: String,
    pub doctor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentPatient {
    pub name: String,
    /// Relative time such as "Hoje, 14:30"
    pub when: String,
    pub kind: String,
}

impl RecentPatient {
    /// First letter of the first and last names
    pub fn initials(&self) -> String {
        let mut words = self.name.split_whitespace();
        let first = words.next().and_then(|w| w.chars().next());
        let last = words.last().and_then(|w| w.chars().next());
        first.into_iter().chain(last).collect::<String>().to_uppercase()
    }
}

/// Whole years between `birth` and `today`
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// In-memory patient data backing the list, detail and dashboard views
#[derive(Debug, Clone, Default)]
pub struct Directory {
    patients: Vec<Patient>,
    details: Vec<PatientDetails>,
    records: Vec<MedicalRecordEntry>,
    recent: Vec<RecentPatient>,
}

impl Directory {
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn details(&self, id: &str) -> Option<&PatientDetails> {
        self.details.iter().find(|d| d.patient_id == id)
    }

    /// Record history of a patient, newest first
    pub fn records(&self, patient_id: &str) -> Vec<&MedicalRecordEntry> {
        let mut found: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        found
    }

    pub fn recent(&self) -> &[RecentPatient] {
        &self.recent
    }

    pub fn active_count(&self) -> usize {
        self.patients
            .iter()
            .filter(|p| p.status == PatientStatus::Ativo)
            .count()
    }

    /// Records dated in the same month as `today`
    pub fn records_in_month(&self, today: NaiveDate) -> usize {
        self.records
            .iter()
            .filter(|r| r.date.year() == today.year() && r.date.month() == today.month())
            .count()
    }

    /// Patients whose name or phone contains `query`, case-insensitively
    pub fn search(&self, query: &str) -> Vec<&Patient> {
        let needle = query.trim().to_lowercase();
        self.patients
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.phone.contains(&needle)
            })
            .collect()
    }

    /// Register a patient from a saved patient form
    pub fn add_patient(&mut self, id: &str, values: &FormValues, today: NaiveDate) {
        let birth_date = NaiveDate::parse_from_str(values.text("birthDate"), "%Y-%m-%d")
            .unwrap_or(today);
        let gender = match values.text("gender") {
            "masculino" => "M",
            "feminino" => "F",
            _ => "O",
        };
        self.patients.push(Patient {
            id: id.to_string(),
            name: values.text("name").to_string(),
            age: age_on(birth_date, today),
            gender: gender.to_string(),
            phone: values.text("phone").to_string(),
            last_visit: None,
            status: PatientStatus::Ativo,
        });
        self.details.push(PatientDetails {
            patient_id: id.to_string(),
            name: values.text("name").to_string(),
            birth_date,
            gender: values.text("gender").to_string(),
            cpf: values.text("cpf").to_string(),
            phone: values.text("phone").to_string(),
            email: values.text("email").to_string(),
            address: values.text("address").to_string(),
            notes: values.text("notes").to_string(),
        });
    }

    /// Append a history entry for a saved clinical record
    pub fn add_record(
        &mut self,
        id: &str,
        patient_id: &str,
        date: NaiveDate,
        diagnosis: &str,
        doctor: &str,
    ) {
        self.records.push(MedicalRecordEntry {
            id: id.to_string(),
            patient_id: patient_id.to_string(),
            date,
            diagnosis: diagnosis.to_string(),
            doctor: doctor.to_string(),
        });
        if let Some(patient) = self.patients.iter_mut().find(|p| p.id == patient_id) {
            patient.last_visit = Some(patient.last_visit.map_or(date, |d| d.max(date)));
        }
    }

    /// Demo data set
    pub fn sample() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let patient = |id: &str, name: &str, age, gender: &str, phone: &str, last, status| Patient {
            id: id.to_string(),
            name: name.to_string(),
            age,
            gender: gender.to_string(),
            phone: phone.to_string(),
            last_visit: Some(last),
            status,
        };
        let record = |id: &str, d, diagnosis: &str| MedicalRecordEntry {
            id: id.to_string(),
            patient_id: "1".to_string(),
            date: d,
            diagnosis: diagnosis.to_string(),
            doctor: "Dr. Ricardo".to_string(),
        };
        let recent = |name: &str, when: &str, kind: &str| RecentPatient {
            name: name.to_string(),
            when: when.to_string(),
            kind: kind.to_string(),
        };

        Self {
            patients: vec![
                patient("1", "Ana Silva", 42, "F", "(11) 98765-4321", date(2024, 3, 12), PatientStatus::Ativo),
                patient("2", "Carlos Oliveira", 35, "M", "(11) 91234-5678", date(2024, 3, 5), PatientStatus::Ativo),
                patient("3", "Mariana Santos", 28, "F", "(11) 99876-5432", date(2024, 2, 28), PatientStatus::Ativo),
                patient("4", "Pedro Almeida", 56, "M", "(11) 95555-4444", date(2024, 2, 15), PatientStatus::Inativo),
                patient("5", "Juliana Costa", 31, "F", "(11) 94444-3333", date(2024, 2, 10), PatientStatus::Ativo),
            ],
            details: vec![PatientDetails {
                patient_id: "1".to_string(),
                name: "Ana Silva".to_string(),
                birth_date: date(1982, 5, 15),
                gender: "feminino".to_string(),
                cpf: "123.456.789-00".to_string(),
                phone: "(11) 98765-4321".to_string(),
                email: "ana.silva@email.com".to_string(),
                address: "Rua das Flores, 123 - São Paulo, SP".to_string(),
                notes: "Paciente com histórico de hipertensão. Alérgica a penicilina.".to_string(),
            }],
            records: vec![
                record("1", date(2024, 3, 15), "Hipertensão Arterial"),
                record("2", date(2024, 2, 28), "Gripe"),
                record("3", date(2024, 1, 10), "Check-up de rotina"),
                record("4", date(2023, 12, 5), "Dor lombar"),
            ],
            recent: vec![
                recent("Ana Silva", "Hoje, 14:30", "Consulta"),
                recent("Carlos Oliveira", "Hoje, 16:00", "Retorno"),
                recent("Mariana Santos", "Ontem, 10:15", "Exame"),
                recent("Pedro Almeida", "Ontem, 11:30", "Consulta"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::FieldValue;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sample_lookup() {
        let dir = Directory::sample();
        assert_eq!(dir.patients().len(), 5);
        assert_eq!(dir.patient("4").unwrap().status, PatientStatus::Inativo);
        assert_eq!(dir.details("1").unwrap().cpf, "123.456.789-00");
        assert!(dir.details("2").is_none());
        assert_eq!(dir.active_count(), 4);
    }

    #[test]
    fn test_records_newest_first() {
        let dir = Directory::sample();
        let diagnoses: Vec<&str> = dir.records("1").iter().map(|r| r.diagnosis.as_str()).collect();
        assert_eq!(
            diagnoses,
            vec!["Hipertensão Arterial", "Gripe", "Check-up de rotina", "Dor lombar"]
        );
        assert!(dir.records("2").is_empty());
    }

    #[test]
    fn test_search_matches_name_case_insensitively() {
        let dir = Directory::sample();
        let names: Vec<&str> = dir.search("SIL").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana Silva"]);
        assert_eq!(dir.search("  ").len(), 5);
        assert_eq!(dir.search("95555").len(), 1);
        assert!(dir.search("zzz").is_empty());
    }

    #[test]
    fn test_initials() {
        let recent = RecentPatient {
            name: "Carlos Oliveira".to_string(),
            when: String::new(),
            kind: String::new(),
        };
        assert_eq!(recent.initials(), "CO");
        let single = RecentPatient {
            name: "ana".to_string(),
            ..recent
        };
        assert_eq!(single.initials(), "A");
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = date(1982, 5, 15);
        assert_eq!(age_on(birth, date(2024, 5, 14)), 41);
        assert_eq!(age_on(birth, date(2024, 5, 15)), 42);
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_add_patient_from_form_values() {
        let mut dir = Directory::sample();
        let values: FormValues = [
            ("name", FieldValue::Text("Roberto Ferreira".to_string())),
            ("birthDate", FieldValue::Text("1990-01-20".to_string())),
            ("gender", FieldValue::Text("masculino".to_string())),
            ("phone", FieldValue::Text("(11) 90000-0000".to_string())),
        ]
        .into_iter()
        .collect();
        dir.add_patient("abc", &values, date(2024, 4, 15));

        let patient = dir.patient("abc").unwrap();
        assert_eq!(patient.age, 34);
        assert_eq!(patient.gender, "M");
        assert_eq!(patient.last_visit_label(), "-");
        assert_eq!(dir.details("abc").unwrap().name, "Roberto Ferreira");
    }

    #[test]
    fn test_add_record_updates_last_visit() {
        let mut dir = Directory::sample();
        dir.add_record("r9", "2", date(2024, 4, 15), "Enxaqueca", "Dr. Ricardo");
        assert_eq!(dir.patient("2").unwrap().last_visit, Some(date(2024, 4, 15)));
        assert_eq!(dir.records("2").len(), 1);
        assert_eq!(dir.records_in_month(date(2024, 4, 1)), 1);
    }
}
