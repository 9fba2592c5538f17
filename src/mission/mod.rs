//! Mission document: raw section store plus the typed overlay, with load/save lifecycle.

use crate::config::MAX_MISSION_FILE_BYTES;
use crate::model::{
    extract_fields, extract_wings, reconcile_fields, reconcile_wings, MissionFields, Wing,
};
use crate::parser::{FormatError, ParseMode, SectionStore};
use crate::util::fow_output_path;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("cannot derive output path from {0}: expected a file name with a 3-character extension")]
    OutputPath(PathBuf),
    #[error("refusing to overwrite source mission {0}")]
    WouldOverwriteSource(PathBuf),
    #[error("document has no source path; use save_to")]
    NoSourcePath,
}

impl MissionError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        MissionError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A loaded `.mis` file.
///
/// The section store is the source of truth for everything that is written
/// out. Typed fields and wings are projections taken at load; edits to them
/// stay in memory until [`save`](Self::save) (or [`to_text`](Self::to_text))
/// writes every changed value back into its line. Unchanged content is emitted
/// exactly as loaded, minus comments and blank lines.
#[derive(Debug, Clone)]
pub struct MissionDocument {
    sections: SectionStore,
    fields: MissionFields,
    wings: Vec<Wing>,
    /// Overlay as last synchronized with `sections`.
    baseline_fields: MissionFields,
    baseline_wings: Vec<Wing>,
    source: Option<PathBuf>,
}

impl MissionDocument {
    /// Read and parse a mission file. Either the whole document loads or an error is returned.
    pub fn load(path: &Path) -> Result<Self, MissionError> {
        let meta = fs::metadata(path).map_err(|e| MissionError::io(path, e))?;
        if meta.len() > MAX_MISSION_FILE_BYTES as u64 {
            return Err(FormatError::InputTooLarge {
                max: MAX_MISSION_FILE_BYTES,
            }
            .into());
        }
        let bytes = fs::read(path).map_err(|e| MissionError::io(path, e))?;
        // legacy missions carry cp1251/cp1252 pilot names and skins
        let text = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = text {
            tracing::warn!(
                "{}: invalid UTF-8 replaced with U+FFFD",
                path.display()
            );
        }
        let mut doc = Self::parse(&text)?;
        doc.source = Some(path.to_path_buf());
        tracing::debug!(
            "loaded {}: {} section(s), {} wing(s)",
            path.display(),
            doc.sections.len(),
            doc.wings.len()
        );
        Ok(doc)
    }

    pub fn parse(text: &str) -> Result<Self, FormatError> {
        Self::parse_with(text, ParseMode::Lenient)
    }

    pub fn parse_with(text: &str, mode: ParseMode) -> Result<Self, FormatError> {
        let sections = SectionStore::parse_with(text, mode)?;
        Self::from_sections(sections)
    }

    pub fn from_sections(sections: SectionStore) -> Result<Self, FormatError> {
        let fields = extract_fields(&sections)?;
        let wings = extract_wings(&sections)?;
        Ok(Self {
            baseline_fields: fields.clone(),
            baseline_wings: wings.clone(),
            sections,
            fields,
            wings,
            source: None,
        })
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Where [`save`](Self::save) writes: `<stem>-fow.mis` next to the source.
    pub fn output_path(&self) -> Result<PathBuf, MissionError> {
        let source = self.source.as_deref().ok_or(MissionError::NoSourcePath)?;
        fow_output_path(source).ok_or_else(|| MissionError::OutputPath(source.to_path_buf()))
    }

    /// Raw sections as loaded (edits to typed fields are not visible here until reconciled).
    pub fn sections(&self) -> &SectionStore {
        &self.sections
    }

    pub fn fields(&self) -> &MissionFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut MissionFields {
        &mut self.fields
    }

    pub fn wings(&self) -> &[Wing] {
        &self.wings
    }

    /// Wings may be edited, added or removed; see [`reconcile`](Self::reconcile).
    pub fn wings_mut(&mut self) -> &mut Vec<Wing> {
        &mut self.wings
    }

    pub fn wing(&self, name: &str) -> Option<&Wing> {
        self.wings.iter().find(|w| w.name == name)
    }

    pub fn wing_mut(&mut self, name: &str) -> Option<&mut Wing> {
        self.wings.iter_mut().find(|w| w.name == name)
    }

    pub fn map(&self) -> Option<&str> {
        self.fields.map.as_deref()
    }

    pub fn set_map(&mut self, map: impl Into<String>) {
        self.fields.map = Some(map.into());
    }

    pub fn time(&self) -> Option<f64> {
        self.fields.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.fields.time = Some(time);
    }

    pub fn cloud_type(&self) -> Option<i32> {
        self.fields.cloud_type
    }

    pub fn set_cloud_type(&mut self, cloud_type: i32) {
        self.fields.cloud_type = Some(cloud_type);
    }

    pub fn cloud_height(&self) -> Option<f64> {
        self.fields.cloud_height
    }

    pub fn set_cloud_height(&mut self, height: f64) {
        self.fields.cloud_height = Some(height);
    }

    /// `(year, month, day)` from `[SEASON]`.
    pub fn date(&self) -> (Option<i32>, Option<i32>, Option<i32>) {
        (self.fields.year, self.fields.month, self.fields.day)
    }

    pub fn set_date(&mut self, year: i32, month: i32, day: i32) {
        self.fields.year = Some(year);
        self.fields.month = Some(month);
        self.fields.day = Some(day);
    }

    pub fn wind(&self) -> (Option<f64>, Option<f64>) {
        (self.fields.wind_direction, self.fields.wind_speed)
    }

    pub fn set_wind(&mut self, direction: f64, speed: f64) {
        self.fields.wind_direction = Some(direction);
        self.fields.wind_speed = Some(speed);
    }

    pub fn gust(&self) -> Option<i32> {
        self.fields.gust
    }

    pub fn set_gust(&mut self, gust: i32) {
        self.fields.gust = Some(gust);
    }

    pub fn turbulence(&self) -> Option<i32> {
        self.fields.turbulence
    }

    pub fn set_turbulence(&mut self, turbulence: i32) {
        self.fields.turbulence = Some(turbulence);
    }

    /// Write every overlay change since the last reconciliation into the
    /// section store. Returns the number of values written back.
    pub fn reconcile(&mut self) -> usize {
        let mut written = reconcile_fields(&mut self.sections, &self.baseline_fields, &self.fields);
        written += reconcile_wings(&mut self.sections, &self.baseline_wings, &self.wings);
        self.baseline_fields = self.fields.clone();
        self.baseline_wings = self.wings.clone();
        written
    }

    /// Reconcile and serialize without touching the filesystem.
    pub fn to_text(&mut self) -> String {
        self.reconcile();
        self.sections.serialize()
    }

    /// Reconcile and write to [`output_path`](Self::output_path). Returns the path written.
    pub fn save(&mut self) -> Result<PathBuf, MissionError> {
        let out = self.output_path()?;
        self.save_to(&out)?;
        Ok(out)
    }

    /// Reconcile and write to `path`, which must not be the source file.
    ///
    /// The text goes to a sibling `.tmp` file first and is renamed into place,
    /// so a failed write leaves any previous output intact.
    pub fn save_to(&mut self, path: &Path) -> Result<(), MissionError> {
        if let Some(source) = &self.source {
            if same_file(source, path) {
                return Err(MissionError::WouldOverwriteSource(path.to_path_buf()));
            }
        }
        let written = self.reconcile();
        let text = self.sections.serialize();
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);
        fs::write(&tmp, text).map_err(|e| MissionError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            MissionError::io(path, e)
        })?;
        tracing::info!("wrote {} ({} value(s) updated)", path.display(), written);
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
