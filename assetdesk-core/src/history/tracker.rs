use std::collections::HashMap;

use assetdesk_db_entities::Asset::{self, AssetStatus};
use assetdesk_db_entities::Staff;
use chrono::NaiveDate;
use uuid::Uuid;

pub const FIELD_NAME: &str = "name";
pub const FIELD_STAFF_ID: &str = "staff_id";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_ASSIGNED_TO: &str = "assigned_to";
pub const FIELD_CATEGORY: &str = "category_id";
pub const FIELD_SERIAL_NUMBER: &str = "serial_number";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PURCHASE_DATE: &str = "purchase_date";
pub const FIELD_LOCATION: &str = "location_id";

pub const ASSET_TRACKED_FIELDS: [&str; 6] = [
    FIELD_STATUS,
    FIELD_ASSIGNED_TO,
    FIELD_CATEGORY,
    FIELD_SERIAL_NUMBER,
    FIELD_DESCRIPTION,
    FIELD_PURCHASE_DATE,
];

/// Free text as it should be stored and compared: missing, empty and
/// whitespace-only values are all "no value".
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.to_owned()),
        _ => None,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One changed field, ready to be written as a history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub effective_date: Option<NaiveDate>,
}

/// Human-readable names for the foreign keys that appear in history rows.
#[derive(Debug, Clone, Default)]
pub struct DisplayNames {
    pub categories: HashMap<Uuid, String>,
    pub staff: HashMap<Uuid, String>,
    pub locations: HashMap<Uuid, String>,
}

impl DisplayNames {
    fn render(map: &HashMap<Uuid, String>, id: Option<Uuid>) -> Option<String> {
        id.map(|id| map.get(&id).cloned().unwrap_or_else(|| id.to_string()))
    }

    pub fn category(&self, id: Option<Uuid>) -> Option<String> {
        Self::render(&self.categories, id)
    }

    pub fn staff(&self, id: Option<Uuid>) -> Option<String> {
        Self::render(&self.staff, id)
    }

    pub fn location(&self, id: Option<Uuid>) -> Option<String> {
        Self::render(&self.locations, id)
    }
}

/// The tracked subset of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetSnapshot {
    pub status: AssetStatus,
    pub assigned_to: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub purchase_date: Option<NaiveDate>,
}

impl From<&Asset::Model> for AssetSnapshot {
    fn from(asset: &Asset::Model) -> Self {
        Self {
            status: asset.status,
            assigned_to: asset.assigned_to,
            category_id: asset.category_id,
            serial_number: asset.serial_number.clone(),
            description: asset.description.clone(),
            purchase_date: asset.purchase_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaffSnapshot {
    pub location_id: Option<Uuid>,
}

impl From<&Staff::Model> for StaffSnapshot {
    fn from(staff: &Staff::Model) -> Self {
        Self {
            location_id: staff.location_id,
        }
    }
}

fn id_key(id: Option<Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    fn new() -> Self {
        Self { changes: vec![] }
    }

    /// Compares normalized keys and records the display values when they differ.
    fn compare(
        &mut self,
        field: &'static str,
        (old_key, old_display): (Option<String>, Option<String>),
        (new_key, new_display): (Option<String>, Option<String>),
        effective_date: Option<NaiveDate>,
    ) {
        if old_key != new_key {
            self.changes.push(FieldChange {
                field,
                old_value: old_display,
                new_value: new_display,
                effective_date,
            });
        }
    }

    fn compare_text(&mut self, field: &'static str, old: Option<&str>, new: Option<&str>) {
        let old = normalize_text(old);
        let new = normalize_text(new);
        self.compare(field, (old.clone(), old), (new.clone(), new), None);
    }
}

/// Lists the tracked asset fields that differ between `old` and `new`.
///
/// `effective_date` is attached to a status change only; every other field
/// is dated by the row's own creation time.
pub fn diff_asset(
    old: &AssetSnapshot,
    new: &AssetSnapshot,
    names: &DisplayNames,
    effective_date: Option<NaiveDate>,
) -> Vec<FieldChange> {
    let mut set = ChangeSet::new();

    let status = |s: AssetStatus| Some(s.as_str().to_owned());
    set.compare(
        FIELD_STATUS,
        (status(old.status), status(old.status)),
        (status(new.status), status(new.status)),
        effective_date,
    );
    set.compare(
        FIELD_ASSIGNED_TO,
        (id_key(old.assigned_to), names.staff(old.assigned_to)),
        (id_key(new.assigned_to), names.staff(new.assigned_to)),
        None,
    );
    set.compare(
        FIELD_CATEGORY,
        (id_key(old.category_id), names.category(old.category_id)),
        (id_key(new.category_id), names.category(new.category_id)),
        None,
    );
    set.compare_text(
        FIELD_SERIAL_NUMBER,
        old.serial_number.as_deref(),
        new.serial_number.as_deref(),
    );
    set.compare_text(
        FIELD_DESCRIPTION,
        old.description.as_deref(),
        new.description.as_deref(),
    );
    let date = |d: Option<NaiveDate>| d.map(format_date);
    set.compare(
        FIELD_PURCHASE_DATE,
        (date(old.purchase_date), date(old.purchase_date)),
        (date(new.purchase_date), date(new.purchase_date)),
        None,
    );

    set.changes
}

/// Staff history only follows location reassignments.
pub fn diff_staff(
    old: &StaffSnapshot,
    new: &StaffSnapshot,
    names: &DisplayNames,
    effective_date: Option<NaiveDate>,
) -> Vec<FieldChange> {
    let mut set = ChangeSet::new();
    set.compare(
        FIELD_LOCATION,
        (id_key(old.location_id), names.location(old.location_id)),
        (id_key(new.location_id), names.location(new.location_id)),
        effective_date,
    );
    set.changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> AssetSnapshot {
        AssetSnapshot {
            status: AssetStatus::Active,
            assigned_to: None,
            category_id: None,
            serial_number: Some("SN-1".into()),
            description: None,
            purchase_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        }
    }

    #[test]
    fn identical_snapshots_produce_nothing() {
        let old = snapshot();
        assert!(diff_asset(&old, &old.clone(), &DisplayNames::default(), None).is_empty());
    }

    #[test]
    fn empty_and_missing_text_are_equal() {
        let old = AssetSnapshot {
            description: None,
            serial_number: Some("".into()),
            ..snapshot()
        };
        let new = AssetSnapshot {
            description: Some("   ".into()),
            serial_number: None,
            ..snapshot()
        };
        assert!(diff_asset(&old, &new, &DisplayNames::default(), None).is_empty());
    }

    #[test]
    fn each_tracked_field_yields_exactly_one_row() {
        let staff_id = Uuid::new_v4();
        let category_id = Uuid::new_v4();
        let variants: Vec<(&str, AssetSnapshot)> = vec![
            (
                FIELD_STATUS,
                AssetSnapshot {
                    status: AssetStatus::Maintenance,
                    ..snapshot()
                },
            ),
            (
                FIELD_ASSIGNED_TO,
                AssetSnapshot {
                    assigned_to: Some(staff_id),
                    ..snapshot()
                },
            ),
            (
                FIELD_CATEGORY,
                AssetSnapshot {
                    category_id: Some(category_id),
                    ..snapshot()
                },
            ),
            (
                FIELD_SERIAL_NUMBER,
                AssetSnapshot {
                    serial_number: Some("SN-2".into()),
                    ..snapshot()
                },
            ),
            (
                FIELD_DESCRIPTION,
                AssetSnapshot {
                    description: Some("dented lid".into()),
                    ..snapshot()
                },
            ),
            (
                FIELD_PURCHASE_DATE,
                AssetSnapshot {
                    purchase_date: None,
                    ..snapshot()
                },
            ),
        ];

        for (field, new) in variants {
            let changes = diff_asset(&snapshot(), &new, &DisplayNames::default(), None);
            assert_eq!(changes.len(), 1, "{field}");
            assert_eq!(changes[0].field, field);
        }
        assert_eq!(ASSET_TRACKED_FIELDS.len(), 6);
    }

    #[test]
    fn foreign_keys_are_rendered_as_names() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut names = DisplayNames::default();
        names.staff.insert(alice, "Alice".into());
        names.staff.insert(bob, "Bob".into());

        let old = AssetSnapshot {
            assigned_to: Some(alice),
            ..snapshot()
        };
        let new = AssetSnapshot {
            assigned_to: Some(bob),
            ..snapshot()
        };
        let changes = diff_asset(&old, &new, &names, None);
        assert_eq!(changes[0].old_value.as_deref(), Some("Alice"));
        assert_eq!(changes[0].new_value.as_deref(), Some("Bob"));
    }

    #[test]
    fn unknown_ids_fall_back_to_the_raw_id() {
        let id = Uuid::new_v4();
        let new = AssetSnapshot {
            category_id: Some(id),
            ..snapshot()
        };
        let changes = diff_asset(&snapshot(), &new, &DisplayNames::default(), None);
        assert_eq!(changes[0].old_value, None);
        assert_eq!(changes[0].new_value, Some(id.to_string()));
    }

    #[test]
    fn effective_date_only_sticks_to_status() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15);
        let new = AssetSnapshot {
            status: AssetStatus::Disposed,
            description: Some("scrapped".into()),
            ..snapshot()
        };
        let changes = diff_asset(&snapshot(), &new, &DisplayNames::default(), date);
        assert_eq!(changes.len(), 2);
        let status = changes.iter().find(|c| c.field == FIELD_STATUS).unwrap();
        let description = changes
            .iter()
            .find(|c| c.field == FIELD_DESCRIPTION)
            .unwrap();
        assert_eq!(status.effective_date, date);
        assert_eq!(status.old_value.as_deref(), Some("active"));
        assert_eq!(status.new_value.as_deref(), Some("disposed"));
        assert_eq!(description.effective_date, None);
    }

    #[test]
    fn staff_location_changes() {
        let hq = Uuid::new_v4();
        let mut names = DisplayNames::default();
        names.locations.insert(hq, "HQ".into());
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);

        let changes = diff_staff(
            &StaffSnapshot { location_id: None },
            &StaffSnapshot {
                location_id: Some(hq),
            },
            &names,
            date,
        );
        assert_eq!(
            changes,
            vec![FieldChange {
                field: FIELD_LOCATION,
                old_value: None,
                new_value: Some("HQ".into()),
                effective_date: date,
            }]
        );

        assert!(diff_staff(
            &StaffSnapshot {
                location_id: Some(hq)
            },
            &StaffSnapshot {
                location_id: Some(hq)
            },
            &names,
            date,
        )
        .is_empty());
    }
}
