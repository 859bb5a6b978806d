//! Effect entity - One gameplay rule attached to a record
//!
//! Effects carry their trigger, an optional activation chance, stat modifiers
//! and the outcomes they produce.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::JsonObject;
use crate::domain::value_objects::StatCode;

/// Event name used when the source gives no trigger
pub const UNSPECIFIED_EVENT: &str = "unspecified";

/// Stack rule attached to bonuses the source describes as non-permanent
pub const TEMPORARY_STACK_RULE: &str = "temporary";

/// A gameplay rule attached to a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    pub trigger: Trigger,
    /// Probability in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<JsonObject>,
    /// At most one modifier per stat
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting: Option<JsonObject>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Effect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger: Trigger::unspecified(),
            chance: None,
            area: None,
            save: None,
            modifiers: Vec::new(),
            targeting: None,
            outcomes: Vec::new(),
            notes: None,
        }
    }

    /// Standalone effect for a bonus that no other effect accounts for
    pub fn stat_bonus(modifier: Modifier) -> Self {
        let name = format!("{} {}", modifier.signed_value(), modifier.stat);
        Self::new(name).with_modifier(modifier)
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.push_modifier(modifier);
        self
    }

    /// Add a modifier unless the effect already has one for the same stat
    pub fn push_modifier(&mut self, modifier: Modifier) -> bool {
        if self.has_stat(modifier.stat) {
            return false;
        }
        self.modifiers.push(modifier);
        true
    }

    pub fn has_stat(&self, stat: StatCode) -> bool {
        self.modifiers.iter().any(|m| m.stat == stat)
    }
}

/// What sets an effect off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub event: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Trigger {
    pub fn unspecified() -> Self {
        Self {
            event: UNSPECIFIED_EVENT.to_string(),
            conditions: Vec::new(),
        }
    }
}

/// A `left op right` guard on a trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub left: String,
    pub op: String,
    pub right: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierOp {
    Add,
    Mul,
}

impl ModifierOp {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "add" | "+" | "plus" | "flat" => Some(Self::Add),
            "mul" | "*" | "x" | "multiply" | "percent" => Some(Self::Mul),
            _ => None,
        }
    }
}

/// A change to one stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub stat: StatCode,
    pub op: ModifierOp,
    pub value: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_rule: Option<String>,
}

impl Modifier {
    /// Flat bonus; integral values are stored as integers
    pub fn add(stat: StatCode, value: f64) -> Option<Self> {
        Some(Self {
            stat,
            op: ModifierOp::Add,
            value: collapse_number(value)?,
            stack_rule: None,
        })
    }

    /// Multiplicative bonus, e.g. `1.10` for +10%
    pub fn mul(stat: StatCode, factor: f64) -> Option<Self> {
        let rounded = (factor * 1_000_000.0).round() / 1_000_000.0;
        Some(Self {
            stat,
            op: ModifierOp::Mul,
            value: Number::from_f64(rounded)?,
            stack_rule: None,
        })
    }

    /// `+10%` style bonus expressed as a multiplier
    pub fn percent(stat: StatCode, percent: f64) -> Option<Self> {
        Self::mul(stat, 1.0 + percent / 100.0)
    }

    pub fn temporary(mut self) -> Self {
        self.stack_rule = Some(TEMPORARY_STACK_RULE.to_string());
        self
    }

    pub fn value_f64(&self) -> f64 {
        self.value.as_f64().unwrap_or_default()
    }

    /// Value with an explicit sign, e.g. `+5` or `-2`
    pub fn signed_value(&self) -> String {
        if self.value_f64() < 0.0 {
            self.value.to_string()
        } else {
            format!("+{}", self.value)
        }
    }
}

/// Store integral values as JSON integers, everything else as floats
pub fn collapse_number(value: f64) -> Option<Number> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

/// One possible result of an effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<OutcomeAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An atomic action nested in an outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeAction {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub params: JsonObject,
}
