//! Appointment list and the calendar queries over it

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentKind {
    Consulta,
    Retorno,
    Exame,
}

impl AppointmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Consulta => "Consulta",
            Self::Retorno => "Retorno",
            Self::Exame => "Exame",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u32,
    pub patient: String,
    pub starts_at: NaiveDateTime,
    pub kind: AppointmentKind,
    pub duration_minutes: u32,
}

impl Appointment {
    pub fn time(&self) -> NaiveTime {
        self.starts_at.time()
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// `14:30 - 15:00`
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.starts_at.format("%H:%M"),
            self.ends_at().format("%H:%M")
        )
    }
}

/// Appointments falling on `date`, earliest first
pub fn appointments_on(date: NaiveDate, appointments: &[Appointment]) -> Vec<&Appointment> {
    let mut found: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.starts_at.date() == date)
        .collect();
    found.sort_by_key(|a| a.time());
    found
}

pub fn has_appointments(date: NaiveDate, appointments: &[Appointment]) -> bool {
    appointments.iter().any(|a| a.starts_at.date() == date)
}

/// Weeks of a month, Sunday first. Days outside the month are `None`.
pub fn month_grid(year: i32, month: u32) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let lead = first.weekday().num_days_from_sunday() as usize;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = lead;
    let mut day = first;
    while day.month() == month {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

/// First day of the month after `date`'s month
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// First day of the month before `date`'s month
pub fn prev_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Janeiro",
        2 => "Fevereiro",
        3 => "Março",
        4 => "Abril",
        5 => "Maio",
        6 => "Junho",
        7 => "Julho",
        8 => "Agosto",
        9 => "Setembro",
        10 => "Outubro",
        11 => "Novembro",
        _ => "Dezembro",
    }
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

fn appointment(
    id: u32,
    patient: &str,
    starts_at: NaiveDateTime,
    kind: AppointmentKind,
) -> Appointment {
    Appointment {
        id,
        patient: patient.to_string(),
        starts_at,
        kind,
        duration_minutes: 30,
    }
}

/// Sample agenda for April 2024
pub fn sample_appointments() -> Vec<Appointment> {
    let day = |d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap_or_default();
    vec![
        appointment(1, "Ana Silva", at(day(15), 14, 30), AppointmentKind::Consulta),
        appointment(2, "Carlos Oliveira", at(day(15), 16, 0), AppointmentKind::Retorno),
        appointment(3, "Mariana Santos", at(day(16), 10, 0), AppointmentKind::Exame),
        appointment(4, "Pedro Almeida", at(day(16), 11, 30), AppointmentKind::Consulta),
        appointment(5, "Juliana Costa", at(day(17), 9, 0), AppointmentKind::Consulta),
    ]
}

/// The dashboard's "Próximas Consultas" feed, pinned to `today`
pub fn upcoming_for(today: NaiveDate) -> Vec<Appointment> {
    vec![
        appointment(101, "Ana Silva", at(today, 14, 30), AppointmentKind::Consulta),
        appointment(102, "Carlos Oliveira", at(today, 16, 0), AppointmentKind::Retorno),
        appointment(103, "Juliana Costa", at(today, 17, 15), AppointmentKind::Consulta),
        appointment(104, "Roberto Ferreira", at(today, 18, 0), AppointmentKind::Exame),
    ]
}
