// ── Fallback catalogue ──
//
// Hand-authored snapshot of the data types every intake form depends on.
// Served whenever the catalogue service cannot be read, so forms stay
// usable offline. Versioned only by edits to this file.

use refcat_api::{DataPoint, DataType, EntityId};

use crate::model::{active_only, sort_by_order};

struct Seed {
    name: &'static str,
    label: &'static str,
    sort_order: i32,
    active: bool,
}

struct SeedType {
    name: &'static str,
    display_name: &'static str,
    points: &'static [Seed],
}

const fn seed(name: &'static str, label: &'static str, sort_order: i32) -> Seed {
    Seed {
        name,
        label,
        sort_order,
        active: true,
    }
}

static CATALOGUE: &[SeedType] = &[
    SeedType {
        name: "disability_types",
        display_name: "Disability Types",
        points: &[
            seed("intellectual", "Intellectual Disability", 1),
            seed("physical", "Physical Disability", 2),
            seed("sensory", "Sensory Disability", 3),
            seed("psychosocial", "Psychosocial Disability", 4),
        ],
    },
    SeedType {
        name: "service_types",
        display_name: "Service Types",
        points: &[
            seed("physiotherapy", "Physiotherapy", 1),
            seed("chiro", "Chiropractic", 2),
            seed("psychologist", "Psychology", 3),
            seed("occupational_therapy", "Occupational Therapy", 4),
            seed("speech_pathology", "Speech Pathology", 5),
        ],
    },
    SeedType {
        name: "plan_types",
        display_name: "Plan Types",
        points: &[
            seed("plan-managed", "Plan Managed", 1),
            seed("self-managed", "Self Managed", 2),
            seed("agency-managed", "Agency Managed", 3),
        ],
    },
    SeedType {
        name: "contact_methods",
        display_name: "Contact Methods",
        points: &[
            seed("phone", "Phone Call", 1),
            seed("email", "Email", 2),
            seed("sms", "SMS/Text Message", 3),
        ],
    },
    SeedType {
        name: "risk_levels",
        display_name: "Risk Levels",
        points: &[
            seed("low", "Low Risk", 1),
            seed("medium", "Medium Risk", 2),
            seed("high", "High Risk", 3),
        ],
    },
    SeedType {
        name: "support_categories",
        display_name: "Support Categories",
        points: &[
            seed("core_support", "Core Support", 1),
            seed("capacity_building", "Capacity Building", 2),
            seed("capital_support", "Capital Support", 3),
        ],
    },
    SeedType {
        name: "urgency_levels",
        display_name: "Urgency Levels",
        points: &[
            seed("low", "Low - Non-urgent", 1),
            seed("medium", "Medium - Standard priority", 2),
            seed("high", "High - Urgent", 3),
            seed("critical", "Critical - Immediate attention required", 4),
        ],
    },
];

fn type_id(name: &str) -> EntityId {
    EntityId::Opaque(format!("fb-{name}"))
}

/// Fallback points for `name`: active only, ordered by sort order with ties
/// in declaration order. Unknown names yield an empty list.
pub fn get(name: &str) -> Vec<DataPoint> {
    let Some(entry) = CATALOGUE.iter().find(|t| t.name == name) else {
        return Vec::new();
    };

    let points = entry.points.iter().enumerate().map(|(idx, s)| DataPoint {
        id: EntityId::Opaque(format!("fb-{name}-{}", idx + 1)),
        data_type_id: type_id(name),
        name: s.name.into(),
        description: Some(s.label.into()),
        sort_order: s.sort_order,
        is_active: s.active,
        extra_data: None,
        created_at: None,
        updated_at: None,
    });

    let mut points = active_only(points);
    sort_by_order(&mut points);
    points
}

/// Whether the snapshot knows `name`.
pub fn contains(name: &str) -> bool {
    CATALOGUE.iter().any(|t| t.name == name)
}

/// Known data-type names in declaration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOGUE.iter().map(|t| t.name)
}

/// Data-type records for the snapshot, ordered by display name like the
/// service's own listing.
pub fn data_types() -> Vec<DataType> {
    let mut types: Vec<DataType> = CATALOGUE
        .iter()
        .map(|t| DataType {
            id: type_id(t.name),
            name: t.name.into(),
            display_name: t.display_name.into(),
            description: None,
            is_active: true,
            created_at: None,
            updated_at: None,
            data_points_count: u32::try_from(t.points.len()).ok(),
        })
        .collect();
    types.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    types
}
