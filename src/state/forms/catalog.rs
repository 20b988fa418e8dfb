//! Built-in form catalogs
//!
//! One [`FormDefinition`] per record type. General-medicine and phototherapy
//! records are separate catalogs sharing the same engine.

use super::error::CatalogError;
use super::field::{DefaultValue, FieldKind, FieldSpec, GroupEntry, SelectOption};
use super::rules::{DisclosureRule, TriggerValue};
use crate::state::body_area::REGION_OPTIONS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Record type a form produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Patient,
    MedicalRecord,
    PhototherapyRecord,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient => "Paciente",
            Self::MedicalRecord => "Ficha Clínica",
            Self::PhototherapyRecord => "Ficha de Fototerapia",
        }
    }

    /// Whether records of this kind hang off an existing patient
    pub fn needs_patient(&self) -> bool {
        !matches!(self, Self::Patient)
    }
}

/// A catalog of fields plus the rules that govern them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormDefinition {
    pub kind: RecordKind,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    pub rules: &'static [DisclosureRule],
}

impl FormDefinition {
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Verify the catalog invariants: unique keys, non-empty select options,
    /// triggers that are boolean/select fields of this form with a matching
    /// value, and revealed keys that exist.
    pub fn check(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for field in self.fields {
            if !seen.insert(field.key) {
                return Err(CatalogError::DuplicateKey(field.key));
            }
            if field.kind.options().is_some_and(|options| options.is_empty()) {
                return Err(CatalogError::EmptyOptions(field.key));
            }
        }

        for rule in self.rules {
            let trigger = self
                .field(rule.trigger_key)
                .ok_or(CatalogError::UnknownTrigger(rule.trigger_key))?;
            match (rule.trigger_value, trigger.kind) {
                (TriggerValue::Bool(_), FieldKind::Boolean)
                | (TriggerValue::Option(_), FieldKind::SingleSelect(_))
                | (TriggerValue::Option(_), FieldKind::MultiSelect(_)) => {}
                (_, FieldKind::Boolean | FieldKind::SingleSelect(_) | FieldKind::MultiSelect(_)) => {
                    return Err(CatalogError::TriggerValueMismatch(rule.trigger_key))
                }
                _ => return Err(CatalogError::InvalidTriggerKind(rule.trigger_key)),
            }
            if !rule.trigger_fits(&trigger.kind) {
                return Err(CatalogError::TriggerValueMismatch(rule.trigger_key));
            }
            if let Some(missing) = rule
                .revealed_keys
                .iter()
                .copied()
                .find(|key| self.field(key).is_none())
            {
                return Err(CatalogError::UnknownRevealedKey(missing));
            }
        }
        Ok(())
    }
}

/// All built-in forms
pub const ALL_FORMS: [&FormDefinition; 3] =
    [&PATIENT_FORM, &MEDICAL_RECORD_FORM, &PHOTOTHERAPY_FORM];

// Patient

const GENDERS: &[SelectOption] = &[
    SelectOption::new("masculino", "Masculino"),
    SelectOption::new("feminino", "Feminino"),
    SelectOption::new("outro", "Outro"),
];

const PATIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Nome Completo", FieldKind::Text)
        .required("O nome deve ter pelo menos 2 caracteres.")
        .min_len(2, "O nome deve ter pelo menos 2 caracteres.")
        .placeholder("Nome do paciente"),
    FieldSpec::new("birthDate", "Data de Nascimento", FieldKind::Date)
        .required("A data de nascimento é obrigatória.")
        .placeholder("AAAA-MM-DD"),
    FieldSpec::new("gender", "Gênero", FieldKind::SingleSelect(GENDERS))
        .required("O gênero é obrigatório.")
        .placeholder("Selecione o gênero"),
    FieldSpec::new("cpf", "CPF", FieldKind::Text)
        .required("O CPF deve ter 11 dígitos.")
        .min_len(11, "O CPF deve ter 11 dígitos.")
        .placeholder("000.000.000-00"),
    FieldSpec::new("phone", "Telefone", FieldKind::Text)
        .required("O telefone deve ter pelo menos 10 dígitos.")
        .min_len(10, "O telefone deve ter pelo menos 10 dígitos.")
        .placeholder("(00) 00000-0000"),
    FieldSpec::new("email", "Email", FieldKind::Text)
        .required("Email inválido.")
        .email("Email inválido.")
        .placeholder("email@exemplo.com"),
    FieldSpec::new("address", "Endereço", FieldKind::Text)
        .required("O endereço deve ter pelo menos 5 caracteres.")
        .min_len(5, "O endereço deve ter pelo menos 5 caracteres.")
        .placeholder("Endereço completo"),
    FieldSpec::new("notes", "Observações", FieldKind::TextArea)
        .placeholder("Alergias, condições pré-existentes ou outras informações relevantes."),
];

pub const PATIENT_FORM: FormDefinition = FormDefinition {
    kind: RecordKind::Patient,
    title: "Novo Paciente",
    fields: PATIENT_FIELDS,
    rules: &[],
};

// General medicine record

const MEDICAL_RECORD_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("date", "Data da Consulta", FieldKind::Date)
        .required("A data é obrigatória.")
        .default_value(DefaultValue::Today),
    FieldSpec::new("weight", "Peso (kg)", FieldKind::Text)
        .required("O peso é obrigatório.")
        .placeholder("70.5"),
    FieldSpec::new("height", "Altura (cm)", FieldKind::Text)
        .required("A altura é obrigatória.")
        .placeholder("175"),
    FieldSpec::new("bloodPressure", "Pressão Arterial", FieldKind::Text)
        .required("A pressão arterial é obrigatória.")
        .placeholder("120/80"),
    FieldSpec::new("temperature", "Temperatura (°C)", FieldKind::Text).placeholder("36.5"),
    FieldSpec::new("symptoms", "Sintomas", FieldKind::TextArea)
        .required("Os sintomas são obrigatórios.")
        .placeholder("Descreva os sintomas relatados pelo paciente"),
    FieldSpec::new("diagnosis", "Diagnóstico", FieldKind::TextArea)
        .required("O diagnóstico é obrigatório.")
        .placeholder("Diagnóstico clínico"),
    FieldSpec::new("treatment", "Tratamento", FieldKind::TextArea)
        .required("O tratamento é obrigatório.")
        .placeholder("Plano de tratamento"),
    FieldSpec::new("medications", "Medicamentos", FieldKind::TextArea)
        .placeholder("Medicamentos prescritos"),
    FieldSpec::new("exams", "Exames", FieldKind::TextArea).placeholder("Exames solicitados"),
    FieldSpec::new("followUp", "Retorno", FieldKind::Boolean)
        .placeholder("Marcar retorno para o paciente"),
    FieldSpec::new("followUpDate", "Data do Retorno", FieldKind::Date)
        .missing_message("A data do retorno é obrigatória.")
        .placeholder("AAAA-MM-DD"),
    FieldSpec::new("notes", "Observações Adicionais", FieldKind::TextArea)
        .placeholder("Observações adicionais sobre a consulta"),
];

const MEDICAL_RECORD_RULES: &[DisclosureRule] = &[DisclosureRule::new(
    "followUp",
    TriggerValue::Bool(true),
    &["followUpDate"],
    true,
)];

pub const MEDICAL_RECORD_FORM: FormDefinition = FormDefinition {
    kind: RecordKind::MedicalRecord,
    title: "Ficha Clínica",
    fields: MEDICAL_RECORD_FIELDS,
    rules: MEDICAL_RECORD_RULES,
};

// Phototherapy record

const PHOTOTYPES: &[SelectOption] = &[
    SelectOption::new("I", "I - sempre queima, nunca bronzeia"),
    SelectOption::new("II", "II - queima facilmente"),
    SelectOption::new("III", "III - queima moderadamente"),
    SelectOption::new("IV", "IV - queima pouco"),
    SelectOption::new("V", "V - raramente queima"),
    SelectOption::new("VI", "VI - nunca queima"),
];

const PHOTO_DIAGNOSES: &[SelectOption] = &[
    SelectOption::new("psoriase", "Psoríase"),
    SelectOption::new("vitiligo", "Vitiligo"),
    SelectOption::new("dermatiteAtopica", "Dermatite atópica"),
    SelectOption::new("micoseFungoide", "Micose fungoide"),
    SelectOption::new("outro", "Outro"),
];

const MODALITIES: &[SelectOption] = &[
    SelectOption::new("uvbNb", "UVB banda estreita"),
    SelectOption::new("puva", "PUVA"),
    SelectOption::new("uva1", "UVA1"),
];

const LAB_EXAMS: &[GroupEntry] = &[
    GroupEntry::new("hemogram", "Hemograma"),
    GroupEntry::new("liverFunction", "Função hepática"),
    GroupEntry::new("renalFunction", "Função renal"),
    GroupEntry::new("ana", "FAN"),
];

const PHOTOTHERAPY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("sessionDate", "Data da Avaliação", FieldKind::Date)
        .required("A data é obrigatória.")
        .default_value(DefaultValue::Today),
    FieldSpec::new("skinPhototype", "Fototipo", FieldKind::SingleSelect(PHOTOTYPES))
        .required("O fototipo é obrigatório."),
    FieldSpec::new("diagnosis", "Diagnóstico", FieldKind::SingleSelect(PHOTO_DIAGNOSES))
        .required("O diagnóstico é obrigatório."),
    FieldSpec::new("diagnosisOther", "Outro diagnóstico", FieldKind::Text)
        .missing_message("Descreva o diagnóstico.")
        .placeholder("Descreva o diagnóstico"),
    FieldSpec::new(
        "affectedAreas",
        "Áreas afetadas",
        FieldKind::MultiSelect(&REGION_OPTIONS),
    )
    .required("Selecione ao menos uma área."),
    FieldSpec::new("previousPhototherapy", "Fototerapia prévia", FieldKind::Boolean)
        .placeholder("Paciente já realizou fototerapia"),
    FieldSpec::new("previousModality", "Modalidade prévia", FieldKind::SingleSelect(MODALITIES))
        .missing_message("Informe a modalidade prévia."),
    FieldSpec::new("previousMaxDose", "Dose máxima prévia (J/cm²)", FieldKind::Text)
        .placeholder("1.5"),
    FieldSpec::new("previousSessions", "Número de sessões prévias", FieldKind::Text)
        .placeholder("30"),
    FieldSpec::new(
        "photosensitizingMeds",
        "Medicação fotossensibilizante",
        FieldKind::Boolean,
    )
    .placeholder("Uso atual de medicação fotossensibilizante"),
    FieldSpec::new("photosensitizingMedsList", "Quais medicações", FieldKind::TextArea)
        .missing_message("Liste as medicações fotossensibilizantes.")
        .placeholder("Liste as medicações em uso"),
    FieldSpec::new("labExams", "Exames laboratoriais", FieldKind::Group(LAB_EXAMS)),
    FieldSpec::new("initialDose", "Dose inicial (mJ/cm²)", FieldKind::Text)
        .required("A dose inicial é obrigatória.")
        .placeholder("300"),
    FieldSpec::new("notes", "Observações", FieldKind::TextArea),
];

const PHOTOTHERAPY_RULES: &[DisclosureRule] = &[
    DisclosureRule::new(
        "diagnosis",
        TriggerValue::Option("outro"),
        &["diagnosisOther"],
        true,
    ),
    DisclosureRule::new(
        "previousPhototherapy",
        TriggerValue::Bool(true),
        &["previousModality"],
        true,
    ),
    DisclosureRule::new(
        "previousPhototherapy",
        TriggerValue::Bool(true),
        &["previousMaxDose", "previousSessions"],
        false,
    ),
    DisclosureRule::new(
        "photosensitizingMeds",
        TriggerValue::Bool(true),
        &["photosensitizingMedsList"],
        true,
    ),
];

pub const PHOTOTHERAPY_FORM: FormDefinition = FormDefinition {
    kind: RecordKind::PhototherapyRecord,
    title: "Ficha de Fototerapia",
    fields: PHOTOTHERAPY_FIELDS,
    rules: PHOTOTHERAPY_RULES,
};
