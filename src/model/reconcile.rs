//! Write overlay changes back into the section store.
//!
//! Only fields that differ from the snapshot taken at load are written, so
//! untouched lines survive byte-for-byte. A changed value rewrites the last
//! line carrying its key (the one it was read from), is appended when the key
//! was absent, and removes the key's lines when cleared.

use super::extract::{parse_waypoint, WingKey};
use super::{
    way_section_name, MissionFields, ScalarField, Wing, SQUAD_SIZE, WING_LIST_SECTION,
};
use crate::parser::{line_key, SectionStore};

/// Reconcile scalar fields. Returns the number of fields written back.
pub fn reconcile_fields(
    store: &mut SectionStore,
    baseline: &MissionFields,
    current: &MissionFields,
) -> usize {
    let mut written = 0;
    for field in ScalarField::ALL {
        let new = current.get(field);
        if baseline.get(field) == new {
            continue;
        }
        let value = new.map(|v| v.to_field_text());
        upsert_key(store, field.section(), field.key(), value.as_deref());
        tracing::debug!("reconciled {}.{}", field.section(), field.key());
        written += 1;
    }
    written
}

/// Reconcile wings, their attributes and their waypoint sections.
/// Returns the number of attributes and waypoint sections written back.
pub fn reconcile_wings(store: &mut SectionStore, baseline: &[Wing], current: &[Wing]) -> usize {
    let mut written = 0;
    for old in baseline {
        if !current.iter().any(|w| w.name == old.name) {
            store.remove_lines(WING_LIST_SECTION, |l| l.trim() == old.name);
            tracing::debug!("removed wing {} from the wing list", old.name);
            written += 1;
        }
    }
    for wing in current {
        let added;
        let old = match baseline.iter().find(|w| w.name == wing.name) {
            Some(w) => w,
            None => {
                store.push_line(WING_LIST_SECTION, wing.name.clone());
                added = Wing::new(wing.name.clone());
                written += 1;
                &added
            }
        };
        written += reconcile_attributes(store, old, wing);
        if old.waypoints != wing.waypoints {
            rewrite_waypoints(store, old, wing);
            written += 1;
        }
    }
    written
}

fn reconcile_attributes(store: &mut SectionStore, old: &Wing, new: &Wing) -> usize {
    let mut written = 0;
    for ((key, before), (_, after)) in attributes(old).into_iter().zip(attributes(new)) {
        if before == after {
            continue;
        }
        let key_name = key.key();
        match key {
            WingKey::Skill(Some(_)) => {
                // appended so it wins over any `Skill` broadcast line on reload
                store.remove_lines(&new.name, |l| line_key(l) == key_name);
                if let Some(v) = &after {
                    store.push_line(&new.name, format!("{} {}", key_name, v));
                }
            }
            _ => upsert_key(store, &new.name, &key_name, after.as_deref()),
        }
        tracing::debug!("reconciled {}.{}", new.name, key_name);
        written += 1;
    }
    written
}

/// Every writable attribute of a wing as `(key, text)`, in a fixed order.
fn attributes(w: &Wing) -> Vec<(WingKey, Option<String>)> {
    let mut out = vec![(WingKey::Planes, Some(w.planes.to_string()))];
    for i in 0..SQUAD_SIZE {
        out.push((WingKey::Skill(Some(i)), Some(w.skills[i].to_string())));
        out.push((WingKey::Skin(i), w.skins[i].clone()));
        out.push((WingKey::Pilot(i), w.pilots[i].clone()));
        out.push((WingKey::NumberOn(i), Some(w.number_on[i].to_string())));
    }
    out.push((WingKey::Class, w.class.clone()));
    out.push((WingKey::Fuel, Some(w.fuel.to_string())));
    out.push((WingKey::Weapons, w.weapons.clone()));
    out.push((WingKey::StartTime, Some(w.start_time.to_string())));
    out
}

/// Rebuild `<name>_Way`. Waypoints equal to their snapshot keep the original
/// line; short lines are not carried over.
fn rewrite_waypoints(store: &mut SectionStore, old: &Wing, new: &Wing) {
    let section = way_section_name(&new.name);
    let original: Vec<String> = store
        .get(&section)
        .unwrap_or_default()
        .iter()
        .filter(|l| matches!(parse_waypoint(l), Ok(Some(_))))
        .cloned()
        .collect();
    let lines = new
        .waypoints
        .iter()
        .enumerate()
        .map(|(i, wp)| match (old.waypoints.get(i), original.get(i)) {
            (Some(before), Some(line)) if before == wp => line.clone(),
            _ => wp.to_line(),
        })
        .collect();
    store.replace_section(&section, lines);
    tracing::debug!(
        "rewrote {} with {} waypoint(s)",
        section,
        new.waypoints.len()
    );
}

fn upsert_key(store: &mut SectionStore, section: &str, key: &str, value: Option<&str>) {
    let matches_key = |l: &str| line_key(l) == key;
    match value {
        Some(v) => {
            let line = format!("{} {}", key, v);
            if !store.set_last_line(section, matches_key, line.clone()) {
                store.push_line(section, line);
            }
        }
        None => {
            store.remove_lines(section, matches_key);
        }
    }
}
