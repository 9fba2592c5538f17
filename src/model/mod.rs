//! Typed overlay over a mission's sections: weather/date/map scalars, wings and waypoints.

mod extract;
mod reconcile;

pub use extract::{
    extract_fields, extract_waypoints, extract_wing, extract_wings, way_section,
    way_section_name, wing_identifiers, wing_section, WING_LIST_SECTION,
};
pub use reconcile::{reconcile_fields, reconcile_wings};
use serde::Serialize;

/// Number of squad positions in a wing.
pub const SQUAD_SIZE: usize = 4;

/// Scalar fields promoted out of the `MAIN`, `SEASON` and `WEATHER` sections.
/// Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissionFields {
    pub map: Option<String>,
    pub time: Option<f64>,
    pub cloud_type: Option<i32>,
    pub cloud_height: Option<f64>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub gust: Option<i32>,
    pub turbulence: Option<i32>,
}

/// One governed scalar: where it lives and how it is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Map,
    Time,
    CloudType,
    CloudHeight,
    Year,
    Month,
    Day,
    WindDirection,
    WindSpeed,
    Gust,
    Turbulence,
}

/// A scalar value as read from or written to a `Key value` line.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Int(i32),
    Float(f64),
}

impl ScalarValue {
    /// Text written after the key on reconciliation.
    pub fn to_field_text(&self) -> String {
        match self {
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Int(n) => n.to_string(),
            ScalarValue::Float(x) => format_float(*x),
        }
    }
}

impl ScalarField {
    pub const ALL: [ScalarField; 11] = [
        ScalarField::Map,
        ScalarField::Time,
        ScalarField::CloudType,
        ScalarField::CloudHeight,
        ScalarField::Year,
        ScalarField::Month,
        ScalarField::Day,
        ScalarField::WindDirection,
        ScalarField::WindSpeed,
        ScalarField::Gust,
        ScalarField::Turbulence,
    ];

    pub fn section(self) -> &'static str {
        match self {
            ScalarField::Map
            | ScalarField::Time
            | ScalarField::CloudType
            | ScalarField::CloudHeight => "MAIN",
            ScalarField::Year | ScalarField::Month | ScalarField::Day => "SEASON",
            ScalarField::WindDirection
            | ScalarField::WindSpeed
            | ScalarField::Gust
            | ScalarField::Turbulence => "WEATHER",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ScalarField::Map => "MAP",
            ScalarField::Time => "TIME",
            ScalarField::CloudType => "CloudType",
            ScalarField::CloudHeight => "CloudHeight",
            ScalarField::Year => "Year",
            ScalarField::Month => "Month",
            ScalarField::Day => "Day",
            ScalarField::WindDirection => "WindDirection",
            ScalarField::WindSpeed => "WindSpeed",
            ScalarField::Gust => "Gust",
            ScalarField::Turbulence => "Turbulence",
        }
    }

    /// Field governed by `key` inside `section`, if any.
    pub fn lookup(section: &str, key: &str) -> Option<ScalarField> {
        Self::ALL
            .into_iter()
            .find(|f| f.section() == section && f.key() == key)
    }
}

impl MissionFields {
    pub fn get(&self, field: ScalarField) -> Option<ScalarValue> {
        match field {
            ScalarField::Map => self.map.clone().map(ScalarValue::Text),
            ScalarField::Time => self.time.map(ScalarValue::Float),
            ScalarField::CloudType => self.cloud_type.map(ScalarValue::Int),
            ScalarField::CloudHeight => self.cloud_height.map(ScalarValue::Float),
            ScalarField::Year => self.year.map(ScalarValue::Int),
            ScalarField::Month => self.month.map(ScalarValue::Int),
            ScalarField::Day => self.day.map(ScalarValue::Int),
            ScalarField::WindDirection => self.wind_direction.map(ScalarValue::Float),
            ScalarField::WindSpeed => self.wind_speed.map(ScalarValue::Float),
            ScalarField::Gust => self.gust.map(ScalarValue::Int),
            ScalarField::Turbulence => self.turbulence.map(ScalarValue::Int),
        }
    }
}

/// A flight group listed in the `[Wing]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Wing {
    /// Identifier from `[Wing]`; also the name of the attributes section.
    pub name: String,
    pub planes: i32,
    pub skills: [i32; SQUAD_SIZE],
    pub skins: [Option<String>; SQUAD_SIZE],
    pub pilots: [Option<String>; SQUAD_SIZE],
    pub number_on: [i32; SQUAD_SIZE],
    pub class: Option<String>,
    pub fuel: i32,
    pub weapons: Option<String>,
    pub start_time: i32,
    /// Flight plan order.
    pub waypoints: Vec<Waypoint>,
}

impl Wing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn way_section_name(&self) -> String {
        way_section_name(&self.name)
    }
}

/// One point of a wing's flight plan. Owned by its [`Wing`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    /// e.g. `TAKEOFF`, `NORMFLY`, `GATTACK`, `LANDING`.
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub altitude: f64,
    pub speed: f64,
    pub target: Option<String>,
}

impl Waypoint {
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{} {} {} {} {}",
            self.kind,
            format_float(self.x),
            format_float(self.y),
            format_float(self.altitude),
            format_float(self.speed)
        );
        if let Some(t) = &self.target {
            line.push(' ');
            line.push_str(t);
        }
        line
    }
}

/// Render a float for a mission line: integral values keep one decimal (`1500.0`).
pub fn format_float(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{:.1}", x)
    } else {
        x.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_respects_section() {
        assert_eq!(ScalarField::lookup("MAIN", "CloudType"), Some(ScalarField::CloudType));
        assert_eq!(ScalarField::lookup("WEATHER", "CloudType"), None);
        assert_eq!(ScalarField::lookup("MAIN", "cloudtype"), None);
    }

    #[test]
    fn float_formatting() {
        assert_eq!(format_float(1500.0), "1500.0");
        assert_eq!(format_float(12.75), "12.75");
        assert_eq!(format_float(-3.0), "-3.0");
    }

    #[test]
    fn waypoint_line() {
        let wp = Waypoint {
            kind: "GATTACK".to_string(),
            x: 1000.0,
            y: 2500.5,
            altitude: 500.0,
            speed: 300.0,
            target: Some("0_Chief 0".to_string()),
        };
        assert_eq!(wp.to_line(), "GATTACK 1000.0 2500.5 500.0 300.0 0_Chief 0");
    }
}
