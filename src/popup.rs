//! Popup text for map features.
//!
//! Every dataset has its own rule; community reports share one formatter
//! that tries several attribute spellings per field and falls back to a dump
//! of all attributes when the schema is not recognized.

use crate::data::DatasetId;
use geojson::{Feature, JsonObject, JsonValue};

/// A popup line and the attribute names that may carry its value,
/// in priority order.
#[derive(Clone, Copy, Debug)]
pub struct DisplayField {
    pub label: &'static str,
    pub aliases: &'static [&'static str],
}

pub const REPORT_FIELDS: [DisplayField; 3] = [
    DisplayField {
        label: "Date",
        aliases: &["fecha", "date"],
    },
    DisplayField {
        label: "Description",
        aliases: &["descripcion", "descripcion_reporte", "description"],
    },
    DisplayField {
        label: "Reporter",
        aliases: &["reportante", "usuario", "user"],
    },
];

const ROAD_FIELDS: [DisplayField; 3] = [
    DisplayField {
        label: "Route",
        aliases: &["Rol_Mop"],
    },
    DisplayField {
        label: "Name",
        aliases: &["Nom_Ruta"],
    },
    DisplayField {
        label: "Surface type",
        aliases: &["Tipo_Carpe"],
    },
];

const HYDROGRAPHY_FIELDS: [DisplayField; 2] = [
    DisplayField {
        label: "Name",
        aliases: &["Nombre"],
    },
    DisplayField {
        label: "Type",
        aliases: &["Dren_Tipo"],
    },
];

const CENTER_FIELDS: [DisplayField; 3] = [
    DisplayField {
        label: "Commune",
        aliases: &["COMUNA"],
    },
    DisplayField {
        label: "Region",
        aliases: &["REGIÓN", "REGION"],
    },
    DisplayField {
        label: "Population 2002",
        aliases: &["POBL_2002"],
    },
];

/// Display text of an attribute, `None` when absent, null, empty, zero or false
pub fn attribute_text(props: &JsonObject, key: &str) -> Option<String> {
    match props.get(key)? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        JsonValue::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// First alias with a displayable value
fn field_text(props: &JsonObject, field: &DisplayField) -> Option<String> {
    field
        .aliases
        .iter()
        .find_map(|alias| attribute_text(props, alias))
}

/// `Label: value` lines for the fields that resolved
fn field_lines(props: &JsonObject, fields: &[DisplayField]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| field_text(props, field).map(|value| format!("{}: {}", field.label, value)))
        .collect()
}

/// Popup for a community report.
///
/// `kind` names the report type in the title. When none of the fields
/// resolve, the title is followed by every attribute, pretty-printed.
pub fn format_report(props: &JsonObject, fields: &[DisplayField], kind: &str) -> String {
    let mut text = format!("Community report ({kind})");
    let lines = field_lines(props, fields);
    if lines.is_empty() {
        let dump = serde_json::to_string_pretty(props).unwrap_or_else(|_| format!("{props:?}"));
        text.push('\n');
        text.push_str(&dump);
    } else {
        for line in lines {
            text.push('\n');
            text.push_str(&line);
        }
    }
    text
}

/// Popup text for a feature of the given dataset, `None` when the feature gets no popup
pub fn popup_for(id: DatasetId, feature: &Feature) -> Option<String> {
    let empty = JsonObject::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);

    match id {
        DatasetId::Boundaries => attribute_text(props, "nombre").map(|name| format!("Boundary: {name}")),
        DatasetId::Roads => joined(field_lines(props, &ROAD_FIELDS)),
        DatasetId::Hydrography => joined(field_lines(props, &HYDROGRAPHY_FIELDS)),
        DatasetId::Centers => {
            let title = attribute_text(props, "NOMBRE").unwrap_or_else(|| "Population center".to_string());
            let mut lines = vec![title];
            lines.extend(field_lines(props, &CENTER_FIELDS));
            Some(lines.join("\n"))
        }
        DatasetId::CommunityPoints => Some(format_report(props, &REPORT_FIELDS, "hotspot")),
        DatasetId::CommunityPolygons => Some(format_report(props, &REPORT_FIELDS, "extent")),
    }
}

fn joined(lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
