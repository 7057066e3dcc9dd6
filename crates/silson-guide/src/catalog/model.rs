use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Calendar format shared by enrollment dates and catalog interval bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Key under which the reference dataset groups its headline exclusions.
pub const GROUPED_EXCLUSIONS_KEY: &str = "주요_비보장_항목";

/// Positive integer identifying a policy generation (1세대, 2세대, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(pub u32);

impl GenerationId {
    pub const fn ordinal_suffix(self) -> &'static str {
        match self.0 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    }

    /// English ordinal used in transition guide keys (`2nd`, `5th`).
    pub fn ordinal(self) -> String {
        format!("{}{}", self.0, self.ordinal_suffix())
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enrollment window of a generation. Bounds are inclusive on both ends.
///
/// Bounds stay as raw strings so that one malformed record does not poison the
/// whole catalog; [`JoinPeriod::bounds`] reports `None` for such records.
/// Non-string values are read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinPeriod {
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JoinPeriod {
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_bound(self.start_date.as_deref()?)?;
        let end = parse_bound(self.end_date.as_deref()?)?;
        Some((start, end))
    }

    /// `None` when the bounds cannot be read.
    pub fn contains(&self, date: NaiveDate) -> Option<bool> {
        self.bounds()
            .map(|(start, end)| start <= date && date <= end)
    }

    /// Human readable window, preferring the curated description.
    pub fn label(&self) -> String {
        if let Some(description) = self.description.as_deref() {
            return description.to_string();
        }

        format!(
            "{} ~ {}",
            self.start_date.as_deref().unwrap_or("?"),
            self.end_date.as_deref().unwrap_or("?")
        )
    }
}

fn parse_bound(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

/// `null` or a non-object join period yields an empty period that never matches.
fn lenient_join_period<'de, D>(deserializer: D) -> Result<JoinPeriod, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(JoinPeriod::default()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStructure {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One guaranteed coverage item (e.g. `급여_의료비`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageItem {
    #[serde(default)]
    pub coverage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Coverage items keyed by name, kept in authored order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Guarantees(Vec<(String, CoverageItem)>);

impl Guarantees {
    pub fn get(&self, name: &str) -> Option<&CoverageItem> {
        self.get_key_value(name).map(|(_, item)| item)
    }

    pub fn get_key_value(&self, name: &str) -> Option<(&str, &CoverageItem)> {
        self.iter().find(|(key, _)| *key == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CoverageItem)> {
        self.0.iter().map(|(name, item)| (name.as_str(), item))
    }

    pub fn remove(&mut self, name: &str) -> Option<CoverageItem> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for Guarantees {
    type Error = serde_json::Error;

    fn try_from(entries: Map<String, Value>) -> Result<Self, Self::Error> {
        entries
            .into_iter()
            .map(|(name, value)| serde_json::from_value(value).map(|item| (name, item)))
            .collect::<Result<Vec<(String, CoverageItem)>, _>>()
            .map(Self)
    }
}

impl Serialize for Guarantees {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, item) in &self.0 {
            map.serialize_entry(name, item)?;
        }
        map.end()
    }
}

/// Excluded items in catalog order.
///
/// Accepts either a bare list or the grouped object form keyed by
/// [`GROUPED_EXCLUSIONS_KEY`], and serializes back in the form it was read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExclusionsRepr", into = "ExclusionsRepr")]
pub struct Exclusions {
    items: Vec<String>,
    grouped: Option<Map<String, Value>>,
}

impl Exclusions {
    pub fn from_items(items: Vec<String>) -> Self {
        Self {
            items,
            grouped: None,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ExclusionsRepr {
    Listed(Vec<String>),
    Grouped(GroupedExclusions),
}

#[derive(Clone, Serialize, Deserialize)]
struct GroupedExclusions {
    #[serde(rename = "주요_비보장_항목", default)]
    items: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<ExclusionsRepr> for Exclusions {
    fn from(repr: ExclusionsRepr) -> Self {
        match repr {
            ExclusionsRepr::Listed(items) => Self::from_items(items),
            ExclusionsRepr::Grouped(grouped) => Self {
                items: grouped.items,
                grouped: Some(grouped.extra),
            },
        }
    }
}

impl From<Exclusions> for ExclusionsRepr {
    fn from(exclusions: Exclusions) -> Self {
        match exclusions.grouped {
            Some(extra) => ExclusionsRepr::Grouped(GroupedExclusions {
                items: exclusions.items,
                extra,
            }),
            None => ExclusionsRepr::Listed(exclusions.items),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Premium {
    #[serde(default)]
    pub level: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Immutable reference record for one policy generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: GenerationId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_join_period")]
    pub join_period: JoinPeriod,
    #[serde(default)]
    pub coverage_structure: CoverageStructure,
    #[serde(default)]
    pub guarantees: Guarantees,
    #[serde(default)]
    pub exclusions: Exclusions,
    #[serde(default)]
    pub special_features: Vec<String>,
    #[serde(default)]
    pub premium: Premium,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Comparison factors for moving between two generations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionGuide(pub Map<String, Value>);

impl TransitionGuide {
    pub fn factor(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// On-disk shape of the reference dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub generations: Vec<GenerationRecord>,
    #[serde(default)]
    pub switch_guide: BTreeMap<String, TransitionGuide>,
}

/// Key of the guide describing a move from `from` to `to` (`from_2nd_to_5th`).
pub fn transition_key(from: GenerationId, to: GenerationId) -> String {
    format!("from_{}_to_{}", from.ordinal(), to.ordinal())
}
