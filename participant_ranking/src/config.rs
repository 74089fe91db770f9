// ********* Input data structures ***********

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// A participant as it appears in the feed.
///
/// The vote fields are kept in their raw JSON form: they may be numbers,
/// numeric strings, `null` or simply missing. See [VoteCount::coerce] for
/// the rules that turn them into counts.
///
/// Fields that are not known to this crate are kept in `extra` and carried
/// through ranking unchanged.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantRecord {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub picture: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<JSValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<JSValue>,
    #[serde(flatten)]
    pub extra: JSMap<String, JSValue>,
}

/// The document published at the feed location.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    pub data: Vec<ParticipantRecord>,
}

// Display fields are rendered as text no matter how they were encoded.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JSValue>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(JSValue::Null) => String::new(),
        Some(JSValue::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

// ********* Normalized data structures ***********

/// A non-negative vote count.
#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct VoteCount(pub u64);

impl VoteCount {
    pub const EMPTY: VoteCount = VoteCount(0);

    /// Turns a raw feed value into a count.
    ///
    /// | raw value                          | count                       |
    /// |------------------------------------|-----------------------------|
    /// | missing, `null`, `false`           | 0                           |
    /// | `true`                             | 1                           |
    /// | zero or negative number            | 0                           |
    /// | positive number                    | rounded to nearest integer  |
    /// | empty or blank string              | 0                           |
    /// | numeric string                     | parsed, then as a number    |
    /// | any other string, array, object    | 0                           |
    ///
    /// A genuine count of zero and a missing count end up identical.
    pub fn coerce(raw: Option<&JSValue>) -> VoteCount {
        match raw {
            None | Some(JSValue::Null) => VoteCount::EMPTY,
            Some(JSValue::Bool(b)) => VoteCount(u64::from(*b)),
            Some(JSValue::Number(n)) => match n.as_u64() {
                Some(x) => VoteCount(x),
                None => VoteCount::from_float(n.as_f64().unwrap_or(0.0)),
            },
            Some(JSValue::String(s)) if s.trim().is_empty() => VoteCount::EMPTY,
            Some(JSValue::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => VoteCount::from_float(f),
                _ => {
                    warn!("coerce: malformed vote count {:?}, counting it as 0", s);
                    VoteCount::EMPTY
                }
            },
            Some(other) => {
                warn!("coerce: malformed vote count {}, counting it as 0", other);
                VoteCount::EMPTY
            }
        }
    }

    fn from_float(f: f64) -> VoteCount {
        if f.is_nan() || f <= 0.0 {
            if f < 0.0 {
                warn!("coerce: negative vote count {}, counting it as 0", f);
            }
            VoteCount::EMPTY
        } else {
            // Saturates on overflow.
            VoteCount(f.round() as u64)
        }
    }
}

impl Display for VoteCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participant after normalization of its vote counts.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct Participant {
    pub name: String,
    pub picture: String,
    pub description: String,
    pub positive: VoteCount,
    pub negative: VoteCount,
    #[serde(flatten)]
    pub extra: JSMap<String, JSValue>,
}

impl Participant {
    /// Builds a normalized copy of the record. The record is left untouched.
    pub fn from_record(record: &ParticipantRecord) -> Participant {
        Participant {
            name: record.name.clone(),
            picture: record.picture.clone(),
            description: record.description.clone(),
            positive: VoteCount::coerce(record.positive.as_ref()),
            negative: VoteCount::coerce(record.negative.as_ref()),
            extra: record.extra.clone(),
        }
    }

    pub fn votes(&self, criterion: SortCriterion) -> VoteCount {
        match criterion {
            SortCriterion::Positive => self.positive,
            SortCriterion::Negative => self.negative,
        }
    }
}

/// The share of positive and negative votes, in whole percents.
///
/// The negative share is the complement of the positive one, so that the
/// two always add up to 100 when there is at least one vote.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize)]
pub struct VoteShare {
    pub positive: u8,
    pub negative: u8,
}

impl VoteShare {
    pub fn of(positive: VoteCount, negative: VoteCount) -> VoteShare {
        let total = positive.0 as u128 + negative.0 as u128;
        if total == 0 {
            return VoteShare::default();
        }
        // round(positive / total * 100), halves rounding up.
        let pct = (positive.0 as u128 * 200 + total) / (total * 2);
        let pct = pct.min(100) as u8;
        VoteShare {
            positive: pct,
            negative: 100 - pct,
        }
    }
}

/// A participant with its place in the ranking (starting at 1).
#[derive(PartialEq, Debug, Clone)]
pub struct RankedParticipant {
    pub participant: Participant,
    pub position: u32,
}

impl RankedParticipant {
    pub fn share(&self) -> VoteShare {
        VoteShare::of(self.participant.positive, self.participant.negative)
    }

    pub fn positive_percentage(&self) -> u8 {
        self.share().positive
    }

    pub fn negative_percentage(&self) -> u8 {
        self.share().negative
    }
}

// ********* Configuration **********

/// The vote field used to order participants.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum SortCriterion {
    #[default]
    Positive,
    Negative,
}

impl SortCriterion {
    pub fn field_name(&self) -> &'static str {
        match self {
            SortCriterion::Positive => "positive",
            SortCriterion::Negative => "negative",
        }
    }
}

impl FromStr for SortCriterion {
    type Err = UnknownCriterion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SortCriterion::Positive),
            "negative" => Ok(SortCriterion::Negative),
            x => Err(UnknownCriterion {
                name: x.to_string(),
            }),
        }
    }
}

impl Display for SortCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// A sort field name that is neither `positive` nor `negative`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UnknownCriterion {
    pub name: String,
}

impl Error for UnknownCriterion {}

impl Display for UnknownCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown sort criterion {:?} (expected \"positive\" or \"negative\")",
            self.name
        )
    }
}

/// The human-readable texts of a card.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CardLabels {
    /// Put in front of the name in the image alternative text.
    #[serde(rename = "photoPrefix")]
    pub photo_prefix: String,
    pub positive: String,
    pub negative: String,
}

impl CardLabels {
    pub fn english() -> CardLabels {
        CardLabels {
            photo_prefix: "Photo of".to_string(),
            positive: "Positive".to_string(),
            negative: "Negative".to_string(),
        }
    }

    pub fn portuguese() -> CardLabels {
        CardLabels {
            photo_prefix: "Foto de".to_string(),
            positive: "Positivos".to_string(),
            negative: "Negativos".to_string(),
        }
    }

    /// The preset for a locale code (`en`, `pt`, `pt-BR`, ...).
    pub fn for_locale(locale: &str) -> Option<CardLabels> {
        let lang = locale.split(['-', '_']).next().unwrap_or_default();
        match lang.to_lowercase().as_str() {
            "en" => Some(CardLabels::english()),
            "pt" => Some(CardLabels::portuguese()),
            _ => None,
        }
    }
}

impl Default for CardLabels {
    fn default() -> Self {
        CardLabels::english()
    }
}
