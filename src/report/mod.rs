//! JSON summary of a mission's typed view.

use crate::mission::MissionDocument;
use crate::model::{MissionFields, SQUAD_SIZE};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct WingSummary {
    pub name: String,
    pub class: Option<String>,
    pub planes: i32,
    pub fuel: i32,
    pub skills: [i32; SQUAD_SIZE],
    pub waypoints: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionSummary {
    pub source: Option<String>,
    pub generated_at: DateTime<Utc>,
    /// Season as a calendar date, when year/month/day form one.
    pub date: Option<NaiveDate>,
    pub fields: MissionFields,
    pub sections: usize,
    pub wings: Vec<WingSummary>,
}

impl MissionSummary {
    pub fn from_document(doc: &MissionDocument) -> Self {
        let fields = doc.fields().clone();
        let date = match (fields.year, fields.month, fields.day) {
            (Some(y), Some(m), Some(d)) => u32::try_from(m)
                .ok()
                .zip(u32::try_from(d).ok())
                .and_then(|(m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            _ => None,
        };
        let wings = doc
            .wings()
            .iter()
            .map(|w| WingSummary {
                name: w.name.clone(),
                class: w.class.clone(),
                planes: w.planes,
                fuel: w.fuel,
                skills: w.skills,
                waypoints: w.waypoints.len(),
            })
            .collect();
        Self {
            source: doc
                .source_path()
                .map(|p| p.to_string_lossy().to_string()),
            generated_at: Utc::now(),
            date,
            fields,
            sections: doc.sections().len(),
            wings,
        }
    }
}

pub fn write_json_report(summary: &MissionSummary, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(summary).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())?;
    Ok(())
}
