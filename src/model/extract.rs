//! Project typed fields, wings and waypoints out of a parsed section store.

use super::{MissionFields, ScalarField, Waypoint, Wing, SQUAD_SIZE};
use crate::parser::{parse_float, parse_int, split_key_value, FormatError, SectionStore};
use std::collections::HashSet;

/// Section listing wing identifiers, one per line.
pub const WING_LIST_SECTION: &str = "Wing";

const SCALAR_SECTIONS: [&str; 3] = ["MAIN", "SEASON", "WEATHER"];

/// Minimum tokens for a waypoint line: type, X, Y, altitude, speed.
const WAYPOINT_MIN_TOKENS: usize = 5;

/// Read the governed scalars. Unknown keys are ignored; the last line for a key wins.
pub fn extract_fields(store: &SectionStore) -> Result<MissionFields, FormatError> {
    let mut fields = MissionFields::default();
    for section in SCALAR_SECTIONS {
        let Some(lines) = store.get(section) else {
            continue;
        };
        for line in lines {
            let Some((key, value)) = split_key_value(line) else {
                continue;
            };
            let Some(field) = ScalarField::lookup(section, key) else {
                continue;
            };
            match field {
                ScalarField::Map => fields.map = Some(value.to_string()),
                ScalarField::Time => fields.time = Some(parse_float(key, value)?),
                ScalarField::CloudType => fields.cloud_type = Some(parse_int(key, value)?),
                ScalarField::CloudHeight => fields.cloud_height = Some(parse_float(key, value)?),
                ScalarField::Year => fields.year = Some(parse_int(key, value)?),
                ScalarField::Month => fields.month = Some(parse_int(key, value)?),
                ScalarField::Day => fields.day = Some(parse_int(key, value)?),
                ScalarField::WindDirection => {
                    fields.wind_direction = Some(parse_float(key, value)?)
                }
                ScalarField::WindSpeed => fields.wind_speed = Some(parse_float(key, value)?),
                ScalarField::Gust => fields.gust = Some(parse_int(key, value)?),
                ScalarField::Turbulence => fields.turbulence = Some(parse_int(key, value)?),
            }
        }
    }
    Ok(fields)
}

/// Identifiers listed in `[Wing]`, in order, each at most once.
pub fn wing_identifiers(store: &SectionStore) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for line in store.get(WING_LIST_SECTION).unwrap_or_default() {
        let id = line.trim();
        if id.is_empty() {
            continue;
        }
        if !seen.insert(id.to_string()) {
            tracing::warn!("wing {} listed more than once; keeping the first entry", id);
            continue;
        }
        out.push(id.to_string());
    }
    out
}

pub fn way_section_name(id: &str) -> String {
    format!("{}_Way", id)
}

/// Attribute lines of the wing `id`.
pub fn wing_section<'a>(store: &'a SectionStore, id: &str) -> Option<&'a [String]> {
    store.get(id)
}

/// Waypoint lines of the wing `id`.
pub fn way_section<'a>(store: &'a SectionStore, id: &str) -> Option<&'a [String]> {
    store.get(&way_section_name(id))
}

/// Keys accepted in a wing attributes section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WingKey {
    Planes,
    /// `Skill` without a slot broadcasts to every slot.
    Skill(Option<usize>),
    Skin(usize),
    Pilot(usize),
    NumberOn(usize),
    Class,
    Fuel,
    Weapons,
    StartTime,
}

impl WingKey {
    pub(super) fn parse(key: &str) -> Option<WingKey> {
        match key {
            "Planes" => return Some(WingKey::Planes),
            "Skill" => return Some(WingKey::Skill(None)),
            "Class" => return Some(WingKey::Class),
            "Fuel" => return Some(WingKey::Fuel),
            "weapons" => return Some(WingKey::Weapons),
            "StartTime" => return Some(WingKey::StartTime),
            _ => {}
        }
        let slotted: [(&str, fn(usize) -> WingKey); 4] = [
            ("Skill", |i| WingKey::Skill(Some(i))),
            ("skin", WingKey::Skin),
            ("pilot", WingKey::Pilot),
            ("numberOn", WingKey::NumberOn),
        ];
        for (prefix, make) in slotted {
            if let Some(slot) = key.strip_prefix(prefix).and_then(squad_slot) {
                return Some(make(slot));
            }
        }
        None
    }

    pub(super) fn key(self) -> String {
        match self {
            WingKey::Planes => "Planes".to_string(),
            WingKey::Skill(None) => "Skill".to_string(),
            WingKey::Skill(Some(i)) => format!("Skill{}", i),
            WingKey::Skin(i) => format!("skin{}", i),
            WingKey::Pilot(i) => format!("pilot{}", i),
            WingKey::NumberOn(i) => format!("numberOn{}", i),
            WingKey::Class => "Class".to_string(),
            WingKey::Fuel => "Fuel".to_string(),
            WingKey::Weapons => "weapons".to_string(),
            WingKey::StartTime => "StartTime".to_string(),
        }
    }
}

fn squad_slot(suffix: &str) -> Option<usize> {
    match suffix {
        "0" => Some(0),
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        _ => None,
    }
}

/// Build a wing from its attribute lines. Each line overwrites what came before.
pub fn extract_wing(id: &str, lines: &[String]) -> Result<Wing, FormatError> {
    let mut wing = Wing::new(id);
    for line in lines {
        let Some((key, value)) = split_key_value(line) else {
            continue;
        };
        let Some(wk) = WingKey::parse(key) else {
            continue;
        };
        wing_key_apply(&mut wing, wk, key, value)?;
    }
    Ok(wing)
}

fn wing_key_apply(wing: &mut Wing, wk: WingKey, key: &str, value: &str) -> Result<(), FormatError> {
    match wk {
        WingKey::Planes => wing.planes = parse_int(key, value)?,
        WingKey::Skill(None) => wing.skills = [parse_int(key, value)?; SQUAD_SIZE],
        WingKey::Skill(Some(i)) => wing.skills[i] = parse_int(key, value)?,
        WingKey::Skin(i) => wing.skins[i] = Some(value.to_string()),
        WingKey::Pilot(i) => wing.pilots[i] = Some(value.to_string()),
        WingKey::NumberOn(i) => wing.number_on[i] = parse_int(key, value)?,
        WingKey::Class => wing.class = Some(value.to_string()),
        WingKey::Fuel => wing.fuel = parse_int(key, value)?,
        WingKey::Weapons => wing.weapons = Some(value.to_string()),
        WingKey::StartTime => wing.start_time = parse_int(key, value)?,
    }
    Ok(())
}

/// Parse a waypoint line, or `None` when it has fewer than five tokens.
pub(super) fn parse_waypoint(line: &str) -> Result<Option<Waypoint>, FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < WAYPOINT_MIN_TOKENS {
        return Ok(None);
    }
    let target = if tokens.len() > WAYPOINT_MIN_TOKENS {
        Some(tokens[WAYPOINT_MIN_TOKENS..].join(" "))
    } else {
        None
    };
    Ok(Some(Waypoint {
        kind: tokens[0].to_string(),
        x: parse_float("X", tokens[1])?,
        y: parse_float("Y", tokens[2])?,
        altitude: parse_float("Altitude", tokens[3])?,
        speed: parse_float("Speed", tokens[4])?,
        target,
    }))
}

/// Waypoints in flight-plan order. Short lines are skipped.
pub fn extract_waypoints(lines: &[String]) -> Result<Vec<Waypoint>, FormatError> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        match parse_waypoint(line)? {
            Some(wp) => out.push(wp),
            None => tracing::debug!("skipping short waypoint line {:?}", line),
        }
    }
    Ok(out)
}

/// Every listed wing that has an attributes section, with its waypoints.
pub fn extract_wings(store: &SectionStore) -> Result<Vec<Wing>, FormatError> {
    let mut wings = Vec::new();
    for id in wing_identifiers(store) {
        let Some(lines) = wing_section(store, &id) else {
            tracing::debug!("wing {} has no attributes section; skipped", id);
            continue;
        };
        let mut wing = extract_wing(&id, lines)?;
        if let Some(way) = way_section(store, &id) {
            wing.waypoints = extract_waypoints(way)?;
        }
        wings.push(wing);
    }
    Ok(wings)
}
