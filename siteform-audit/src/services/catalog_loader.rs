//! Catalog and project table loading
//!
//! The upload endpoint receives the question and project tables as raw JSON
//! row objects, one map per spreadsheet row. Real uploads come with messy
//! headers: case differences, accents, legacy synonyms, and the recurring
//! "Conditon" typo. All of that tolerance lives here; the engine only ever
//! sees canonical, typed rows.

use std::collections::BTreeMap;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use siteform_common::{Error, Result};
use tracing::warn;

use crate::models::{
    Condition, ProjectRecord, ProjectTable, QuestionCatalog, QuestionRow, QuestionType,
};

/// One uploaded row, column header -> cell value
pub type RawRow = Map<String, Value>;

const COL_ID: &str = "id";
const COL_SECTION: &str = "section";
const COL_TYPE: &str = "type";
const COL_OPTIONS: &str = "options";
const COL_MANDATORY: &str = "mandatory";
const COL_DESCRIPTION: &str = "description";
const COL_CONDITION_ENABLED: &str = "condition_enabled";
const COL_CONDITION_EXPR: &str = "condition_expr";

/// Normalized header -> canonical column.
///
/// Keys are already folded (lowercase, no diacritics, collapsed spaces);
/// incoming headers pass through [`normalize_label`] before lookup.
static HEADER_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("id", COL_ID),
        ("identifiant", COL_ID),
        ("numero", COL_ID),
        ("section", COL_SECTION),
        ("rubrique", COL_SECTION),
        ("phase", COL_SECTION),
        ("type", COL_TYPE),
        ("type de champ", COL_TYPE),
        ("options", COL_OPTIONS),
        ("choix", COL_OPTIONS),
        ("liste de choix", COL_OPTIONS),
        ("obligatoire", COL_MANDATORY),
        ("champ obligatoire", COL_MANDATORY),
        ("description", COL_DESCRIPTION),
        ("question", COL_DESCRIPTION),
        ("intitule", COL_DESCRIPTION),
        ("libelle", COL_DESCRIPTION),
        ("champ conditionnel", COL_CONDITION_ENABLED),
        ("conditionnel", COL_CONDITION_ENABLED),
        ("condition activee", COL_CONDITION_ENABLED),
        ("condition", COL_CONDITION_EXPR),
        ("conditon", COL_CONDITION_EXPR),
        ("condition value", COL_CONDITION_EXPR),
        ("conditon value", COL_CONDITION_EXPR),
        ("valeur condition", COL_CONDITION_EXPR),
        ("valeur de condition", COL_CONDITION_EXPR),
    ])
});

/// Accepted headers for the project-name column
const PROJECT_NAME_HEADERS: [&str; 5] = ["intitule", "nom", "nom du site", "site", "projet"];

/// Load the question table into a catalog.
///
/// Fails on structural problems only (missing id or section, duplicate ids,
/// use of the reserved comment id); per-cell oddities degrade: unknown
/// types default to text, malformed condition cells leave the row
/// unconditionally visible.
pub fn load_questions(rows: &[RawRow]) -> Result<QuestionCatalog> {
    let mut parsed = Vec::with_capacity(rows.len());

    for (index, raw) in rows.iter().enumerate() {
        let cells = canonicalize_row(raw);

        let id = cells
            .get(COL_ID)
            .copied()
            .and_then(cell_id)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "question row {}: missing or non-integer id",
                    index + 1
                ))
            })?;

        let section = cells
            .get(COL_SECTION)
            .copied()
            .and_then(cell_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "question row {} (id {}): missing section",
                    index + 1,
                    id
                ))
            })?;

        let question_type = parse_question_type(cells.get(COL_TYPE).copied(), id);
        let mandatory = cells
            .get(COL_MANDATORY)
            .copied()
            .and_then(cell_str)
            .map(|s| normalize_label(&s) == "oui")
            .unwrap_or(false);
        let description = cells
            .get(COL_DESCRIPTION)
            .copied()
            .and_then(cell_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let options = parse_options(cells.get(COL_OPTIONS).copied());

        let condition = if condition_flag_set(cells.get(COL_CONDITION_ENABLED).copied()) {
            cells
                .get(COL_CONDITION_EXPR)
                .copied()
                .and_then(cell_str)
                .and_then(|expr| Condition::parse(&expr))
        } else {
            None
        };

        parsed.push(QuestionRow {
            id,
            section,
            question_type,
            options,
            mandatory,
            description,
            condition,
        });
    }

    QuestionCatalog::from_rows(parsed)
}

/// Load the project table.
///
/// The name column ("Intitulé" or a synonym) becomes the selection key;
/// every other column lands in the metadata map with its header kept
/// verbatim, because the photo reconciliation references plan columns by
/// their exact names.
pub fn load_projects(rows: &[RawRow]) -> Result<ProjectTable> {
    let mut records = Vec::with_capacity(rows.len());

    for (index, raw) in rows.iter().enumerate() {
        let mut name: Option<String> = None;
        let mut metadata = BTreeMap::new();

        for (header, value) in raw {
            if PROJECT_NAME_HEADERS.contains(&normalize_label(header).as_str()) {
                if name.is_none() {
                    name = cell_str(value).map(|s| s.trim().to_string());
                }
            } else {
                metadata.insert(header.clone(), value.clone());
            }
        }

        let name = name.filter(|n| !n.is_empty()).ok_or_else(|| {
            Error::InvalidInput(format!("project row {}: missing site name", index + 1))
        })?;

        records.push(ProjectRecord { name, metadata });
    }

    ProjectTable::from_records(records)
}

/// Map a row's raw headers onto canonical columns
fn canonicalize_row(raw: &RawRow) -> HashMap<&'static str, &Value> {
    let mut cells: HashMap<&'static str, &Value> = HashMap::new();
    for (header, value) in raw {
        let Some(&canonical) = HEADER_SYNONYMS.get(normalize_label(header).as_str()) else {
            continue;
        };
        if cells.insert(canonical, value).is_some() {
            warn!(header = %header, column = canonical, "duplicate column after header normalization, keeping the later one");
        }
    }
    cells
}

/// Lowercase, fold French diacritics, trim, collapse inner whitespace
fn normalize_label(raw: &str) -> String {
    let folded: String = raw.chars().map(fold_char).collect();
    folded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' => 'a',
        'À' | 'Â' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'î' | 'ï' => 'i',
        'Î' | 'Ï' => 'I',
        'ô' | 'ö' => 'o',
        'Ô' | 'Ö' => 'O',
        'ù' | 'û' | 'ü' => 'u',
        'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        _ => c,
    }
}

/// Render a scalar cell as text
fn cell_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a cell as an integer question id
fn cell_id(value: &Value) -> Option<i64> {
    let integral = |f: f64| (f.is_finite() && f.fract() == 0.0).then_some(f as i64);
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// Whether the condition flag cell reads as the integer 1.
///
/// Anything else (0, other numbers, non-numeric text, absent) means "no
/// condition"; a flag that fails to parse must not block the question.
fn condition_flag_set(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(|v| v == 1).unwrap_or(false),
        _ => false,
    }
}

fn parse_question_type(value: Option<&Value>, id: i64) -> QuestionType {
    let Some(raw) = value.and_then(cell_str) else {
        warn!(question_id = id, "missing question type, defaulting to text");
        return QuestionType::Text;
    };

    match normalize_label(&raw).as_str() {
        "texte" | "text" => QuestionType::Text,
        "liste" | "select" | "choix" | "liste de choix" => QuestionType::Select,
        "nombre" | "number" | "numerique" => QuestionType::Number,
        "photo" | "photos" => QuestionType::Photo,
        _ => {
            warn!(question_id = id, cell = %raw, "unknown question type, defaulting to text");
            QuestionType::Text
        }
    }
}

/// Split an options cell into the ordered choice list
fn parse_options(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(cell_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(value) => cell_str(value)
            .map(|s| {
                s.split(';')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        None => Vec::new(),
    }
}
