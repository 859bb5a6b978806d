//! Draft normalizers - Field-by-field coercion of the model draft
//!
//! Each function takes a loosely typed piece of the draft and returns the
//! strict domain value, dropping whatever cannot be made to fit.

use serde_json::Value;

use crate::application::dto::{
    as_list, coerce_chance, coerce_number, coerce_u32, dedup_preserving_order, non_empty_str,
    scalar_object, whitelist, Draft,
};
use crate::domain::entities::{
    Condition, Dimensions, Durability, Effect, Enchantment, FocalPoint, JsonObject, Modifier,
    ModifierOp, Outcome, OutcomeAction, Physical, SrcsetEntry, Trigger,
};
use crate::domain::services::{
    normalize_key, parse_leading_modifier, strip_markup, EffectDetail, MinedSource,
};
use crate::domain::value_objects::field_sets::{
    AREA_FIELDS, ATTRIBUTION_FIELDS, CONDITION_FIELDS, DIMENSION_FIELDS, DURABILITY_FIELDS,
    EFFECT_FIELDS, ENCHANTMENT_FIELDS, FOCAL_POINT_FIELDS, FOUNDRY_FIELDS, MODIFIER_FIELDS,
    OUTCOME_ACTION_FIELDS, OUTCOME_FIELDS, PHYSICAL_FIELDS, SAVE_FIELDS, SRCSET_FIELDS,
    TARGETING_FIELDS, TRIGGER_FIELDS,
};
use crate::domain::value_objects::{ItemKind, StatCode, STAT_ALIASES};

fn split_tokens(text: &str) -> Vec<String> {
    strip_markup(text)
        .split([',', '/'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Mined type tokens when the page has any, else the cleaned draft tokens
pub fn resolve_kind_detail(draft: &Draft, mined: &MinedSource) -> Vec<String> {
    if !mined.type_tokens.is_empty() {
        return dedup_preserving_order(mined.type_tokens.iter().cloned());
    }
    let tokens: Vec<String> = match draft.get("kind_detail") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split_tokens)
            .collect(),
        Some(Value::String(text)) => split_tokens(text),
        _ => Vec::new(),
    };
    dedup_preserving_order(tokens)
}

/// Candidates in priority order: mined type tokens, draft kind, tags
pub fn resolve_kind(mined_tokens: &[String], draft_kind: Option<&str>, tags: &[String]) -> ItemKind {
    let candidates = mined_tokens
        .iter()
        .map(String::as_str)
        .chain(draft_kind)
        .chain(tags.iter().map(String::as_str));
    ItemKind::canonicalize(candidates)
}

pub fn parse_enchantments(items: &[Value]) -> Vec<Enchantment> {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|object| {
            let object = whitelist(object, ENCHANTMENT_FIELDS);
            Some(Enchantment {
                name: object.get("name").and_then(non_empty_str)?,
                description: object.get("description").and_then(non_empty_str),
                params: object
                    .get("params")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// Flat stat bonuses known for a record, at most one per stat
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatBonusLookup {
    bonuses: Vec<Modifier>,
}

impl StatBonusLookup {
    /// Enchantment parameters first, then bonuses mined from the page
    pub fn from_sources(enchantments: &[Value], mined: &[Modifier]) -> Self {
        let mut lookup = Self::default();

        for params in enchantments
            .iter()
            .filter_map(|e| e.get("params"))
            .filter_map(Value::as_object)
        {
            let named_stat = params
                .get("stat")
                .and_then(Value::as_str)
                .and_then(StatCode::canonicalize);
            if let Some(stat) = named_stat {
                let amount = params.get("value").or_else(|| params.get("amount"));
                if let Some(value) = amount.and_then(coerce_number) {
                    lookup.insert_add(stat, value);
                }
            }
            for (key, value) in params {
                if let (Some(stat), Some(value)) = (StatCode::canonicalize(key), coerce_number(value)) {
                    lookup.insert_add(stat, value);
                }
            }
        }

        for bonus in mined {
            lookup.insert(bonus.clone());
        }
        lookup
    }

    fn insert_add(&mut self, stat: StatCode, value: f64) {
        if let Some(modifier) = Modifier::add(stat, value) {
            self.insert(modifier);
        }
    }

    fn insert(&mut self, modifier: Modifier) {
        if self.get(modifier.stat).is_none() {
            self.bonuses.push(modifier);
        }
    }

    pub fn get(&self, stat: StatCode) -> Option<&Modifier> {
        self.bonuses.iter().find(|m| m.stat == stat)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.bonuses.iter()
    }

    /// Bonus for the first stat alias appearing as a whole word in `name`
    pub fn find_alias_in(&self, name: &str) -> Option<Modifier> {
        let key = normalize_key(name);
        let words: Vec<&str> = key.split_whitespace().collect();
        STAT_ALIASES
            .iter()
            .filter(|(alias, _)| words.contains(alias))
            .find_map(|(_, stat)| self.get(*stat).cloned())
    }
}

fn parse_trigger(value: Option<&Value>) -> Trigger {
    match value {
        Some(Value::Object(object)) => {
            let object = whitelist(object, TRIGGER_FIELDS);
            Trigger {
                event: object
                    .get("event")
                    .and_then(non_empty_str)
                    .unwrap_or_else(|| Trigger::unspecified().event),
                conditions: as_list(object.get("conditions"))
                    .iter()
                    .filter_map(parse_condition)
                    .collect(),
            }
        }
        Some(Value::String(event)) if !event.trim().is_empty() => Trigger {
            event: event.trim().to_string(),
            conditions: Vec::new(),
        },
        _ => Trigger::unspecified(),
    }
}

fn parse_condition(value: &Value) -> Option<Condition> {
    let object = whitelist(value.as_object()?, CONDITION_FIELDS);
    Some(Condition {
        left: object.get("left").and_then(non_empty_str)?,
        op: object.get("op").and_then(non_empty_str)?,
        right: object.get("right").cloned().unwrap_or(Value::Null),
    })
}

/// Canonical stat, numeric value; unknown stats and non-numbers are dropped
pub fn parse_modifier(value: &Value) -> Option<Modifier> {
    let object = whitelist(value.as_object()?, MODIFIER_FIELDS);
    let stat = object
        .get("stat")
        .and_then(Value::as_str)
        .and_then(StatCode::canonicalize)?;
    let raw = object.get("value")?;

    let modifier = if let Some(percent) = raw.as_str().and_then(|s| s.trim().strip_suffix('%')) {
        let percent: f64 = percent.trim().trim_start_matches('+').parse().ok()?;
        Modifier::percent(stat, percent)?
    } else {
        let op = match object.get("op").and_then(Value::as_str) {
            Some(op) => ModifierOp::parse(op)?,
            None => ModifierOp::Add,
        };
        let value = coerce_number(raw)?;
        match op {
            ModifierOp::Add => Modifier::add(stat, value)?,
            ModifierOp::Mul => Modifier::mul(stat, value)?,
        }
    };

    Some(Modifier {
        stack_rule: object.get("stack_rule").and_then(non_empty_str),
        ..modifier
    })
}

fn parse_outcome(value: &Value) -> Option<Outcome> {
    let object = whitelist(value.as_object()?, OUTCOME_FIELDS);
    Some(Outcome {
        result: object.get("result").and_then(non_empty_str)?,
        prob: object.get("prob").and_then(coerce_chance),
        effects: as_list(object.get("effects"))
            .iter()
            .filter_map(parse_outcome_action)
            .collect(),
        notes: object.get("notes").and_then(non_empty_str),
    })
}

fn parse_outcome_action(value: &Value) -> Option<OutcomeAction> {
    let object = whitelist(value.as_object()?, OUTCOME_ACTION_FIELDS);
    Some(OutcomeAction {
        action: object.get("action").and_then(non_empty_str)?,
        target: object.get("target").and_then(non_empty_str),
        params: object
            .get("params")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    })
}

/// Normalize one draft effect, synthesizing a modifier when it has none
pub fn parse_effect(value: &Value, bonuses: &StatBonusLookup) -> Option<Effect> {
    let object = whitelist(value.as_object()?, EFFECT_FIELDS);
    let mut effect = Effect::new(object.get("name").and_then(non_empty_str)?);

    effect.trigger = parse_trigger(object.get("trigger"));
    effect.chance = object.get("chance").and_then(coerce_chance);
    effect.area = scalar_object(object.get("area"), AREA_FIELDS);
    effect.save = scalar_object(object.get("save"), SAVE_FIELDS);
    effect.targeting = scalar_object(object.get("targeting"), TARGETING_FIELDS);
    for modifier in as_list(object.get("modifiers")).iter().filter_map(parse_modifier) {
        effect.push_modifier(modifier);
    }
    effect.outcomes = as_list(object.get("outcomes"))
        .iter()
        .filter_map(parse_outcome)
        .collect();
    effect.notes = object.get("notes").and_then(non_empty_str);

    if effect.modifiers.is_empty() {
        let synthesized =
            parse_leading_modifier(&effect.name).or_else(|| bonuses.find_alias_in(&effect.name));
        if let Some(modifier) = synthesized {
            effect.push_modifier(modifier);
        }
    }

    Some(effect)
}

fn mentions_stat(key: &str, stat: StatCode) -> bool {
    key.contains(&stat.code().to_ascii_lowercase())
        || key.contains(&stat.display_name().to_ascii_lowercase())
}

/// Adopt facts from the mined detail matching this effect.
///
/// Direct key match first; failing that, the first detail carrying a
/// modifier whose stat is named inside the effect name. Two effects on the
/// same stat can therefore pick up the same detail.
pub fn enrich_effect(effect: &mut Effect, details: &[EffectDetail]) {
    let key = normalize_key(&effect.name);
    let detail = details.iter().find(|d| d.key == key).or_else(|| {
        details
            .iter()
            .find(|d| d.modifiers.iter().any(|m| mentions_stat(&key, m.stat)))
    });
    let Some(detail) = detail else {
        return;
    };

    if !detail.modifiers.is_empty() {
        effect.modifiers = detail.modifiers.clone();
    }
    if effect.chance.is_none() {
        effect.chance = detail.chance;
    }
    if effect.notes.is_none() {
        effect.notes = detail.notes.clone();
    }
}

/// One `+<value> <STAT>` effect for each bonus no effect accounts for
pub fn append_missing_bonuses(effects: &mut Vec<Effect>, bonuses: &StatBonusLookup) {
    for bonus in bonuses.iter() {
        if !effects.iter().any(|e| e.has_stat(bonus.stat)) {
            effects.push(Effect::stat_bonus(bonus.clone()));
        }
    }
}

fn number_at(object: &JsonObject, key: &str) -> Option<f64> {
    object.get(key).and_then(coerce_number)
}

pub fn parse_physical(value: Option<&Value>) -> Option<Physical> {
    let object = whitelist(value?.as_object()?, PHYSICAL_FIELDS);
    Some(Physical {
        weight_kg: number_at(&object, "weight_kg"),
        dimensions_cm: object
            .get("dimensions_cm")
            .and_then(Value::as_object)
            .map(|d| whitelist(d, DIMENSION_FIELDS))
            .map(|d| Dimensions {
                length: number_at(&d, "length"),
                width: number_at(&d, "width"),
                height: number_at(&d, "height"),
            }),
        durability: object
            .get("durability")
            .and_then(Value::as_object)
            .map(|d| whitelist(d, DURABILITY_FIELDS))
            .map(|d| Durability {
                max: number_at(&d, "max"),
                current: number_at(&d, "current"),
            }),
    })
}

/// Srcset entry with its source still unresolved
pub fn parse_srcset_entry(value: &Value) -> Option<SrcsetEntry> {
    let object = whitelist(value.as_object()?, SRCSET_FIELDS);
    Some(SrcsetEntry {
        src: object.get("src").and_then(non_empty_str)?,
        width: object.get("width").and_then(coerce_u32),
        density: object
            .get("density")
            .and_then(coerce_number)
            .filter(|d| *d > 0.0),
    })
}

pub fn parse_focal_point(value: Option<&Value>) -> Option<FocalPoint> {
    let object = whitelist(value?.as_object()?, FOCAL_POINT_FIELDS);
    FocalPoint::new(number_at(&object, "x")?, number_at(&object, "y")?)
}

pub fn parse_attribution(value: Option<&Value>) -> Option<JsonObject> {
    let object = value?.as_object()?;
    let kept: JsonObject = ATTRIBUTION_FIELDS
        .iter()
        .filter_map(|key| {
            let text = object.get(*key).and_then(non_empty_str)?;
            Some((key.to_string(), Value::String(text)))
        })
        .collect();
    (!kept.is_empty()).then_some(kept)
}

pub fn parse_foundry(value: Option<&Value>) -> Option<JsonObject> {
    let object = value?.as_object()?;
    let kept: JsonObject = FOUNDRY_FIELDS
        .iter()
        .filter_map(|key| {
            let raw = object.get(*key)?;
            // scale is numeric, the rest are image paths
            let value = if *key == "scale" {
                coerce_number(raw)
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)?
            } else {
                Value::String(non_empty_str(raw)?)
            };
            Some((key.to_string(), value))
        })
        .collect();
    (!kept.is_empty()).then_some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UNSPECIFIED_EVENT;
    use serde_json::json;

    #[test]
    fn test_kind_detail_prefers_mined_tokens() {
        let draft = Draft::from_value(json!({"kind_detail": ["Sword"]}));
        let mined = MinedSource {
            type_tokens: vec!["Armor".into(), "Armor".into(), "Boots".into()],
            ..Default::default()
        };
        assert_eq!(resolve_kind_detail(&draft, &mined), vec!["Armor", "Boots"]);
    }

    #[test]
    fn test_kind_detail_dedups_draft_tokens() {
        let draft = Draft::from_value(json!({"kind_detail": ["Weapon", "Weapon", "Armor"]}));
        assert_eq!(
            resolve_kind_detail(&draft, &MinedSource::default()),
            vec!["Weapon", "Armor"]
        );

        let draft = Draft::from_value(json!({"kind_detail": "[[Potion]] / Drink"}));
        assert_eq!(resolve_kind_detail(&draft, &MinedSource::default()), vec!["Potion", "Drink"]);
    }

    #[test]
    fn test_kind_tie_break_order() {
        let tags = vec!["ring".to_string()];
        assert_eq!(resolve_kind(&["Potion".to_string()], Some("Weapon"), &tags), ItemKind::Consumable);
        assert_eq!(resolve_kind(&["Unknown Widget".to_string()], Some("Weapon"), &tags), ItemKind::Weapon);
        assert_eq!(resolve_kind(&[], Some("gizmo"), &tags), ItemKind::Jewelry);
        assert_eq!(resolve_kind(&["Unknown Widget".to_string()], None, &[]), ItemKind::Other);
    }

    #[test]
    fn test_bonus_lookup_priority() {
        let enchantments = vec![json!({"name": "Might", "params": {"STR": 2, "dexterity": "+1", "note": "x"}})];
        let mined = vec![
            Modifier::add(StatCode::Str, 5.0).unwrap(),
            Modifier::add(StatCode::Wis, 1.0).unwrap(),
        ];
        let lookup = StatBonusLookup::from_sources(&enchantments, &mined);
        assert_eq!(lookup.get(StatCode::Str).unwrap().value_f64(), 2.0);
        assert_eq!(lookup.get(StatCode::Dex).unwrap().value_f64(), 1.0);
        assert_eq!(lookup.get(StatCode::Wis).unwrap().value_f64(), 1.0);
        assert!(lookup.get(StatCode::Cha).is_none());
    }

    #[test]
    fn test_bonus_lookup_stat_value_form() {
        let enchantments = vec![json!({"name": "Grace", "params": {"stat": "Charisma", "amount": 3}})];
        let lookup = StatBonusLookup::from_sources(&enchantments, &[]);
        assert_eq!(lookup.get(StatCode::Cha).unwrap().value_f64(), 3.0);
    }

    #[test]
    fn test_parse_modifier_coercion() {
        let m = parse_modifier(&json!({"stat": "Strength", "value": "3"})).unwrap();
        assert_eq!((m.stat, m.op, m.value_f64()), (StatCode::Str, ModifierOp::Add, 3.0));

        let m = parse_modifier(&json!({"stat": "dex", "op": "add", "value": "+10%"})).unwrap();
        assert_eq!((m.op, m.value_f64()), (ModifierOp::Mul, 1.1));

        assert!(parse_modifier(&json!({"stat": "Luck", "value": 1})).is_none());
        assert!(parse_modifier(&json!({"stat": "STR", "value": "lots"})).is_none());
        assert!(parse_modifier(&json!({"stat": "STR", "op": "pow", "value": 2})).is_none());
    }

    #[test]
    fn test_parse_effect_normalizes_fields() {
        let value = json!({
            "name": "Static Shock",
            "trigger": {"conditions": [{"left": "target", "op": "is", "right": "hostile"}, {"op": "x"}]},
            "chance": "75%",
            "modifiers": [
                {"stat": "DEX", "value": 2},
                {"stat": "Dexterity", "value": 9},
                {"stat": "Luck", "value": 1}
            ],
            "outcomes": [{"result": "stunned", "prob": 150, "effects": [{"action": "stun"}, {"target": "x"}]}, {"notes": "no result"}],
            "save": {"ability": "CON", "dc": 12, "junk": 1},
            "bogus": true
        });
        let effect = parse_effect(&value, &StatBonusLookup::default()).unwrap();

        assert_eq!(effect.trigger.event, UNSPECIFIED_EVENT);
        assert_eq!(effect.trigger.conditions.len(), 1);
        assert_eq!(effect.chance, Some(0.75));
        assert_eq!(effect.modifiers.len(), 1);
        assert_eq!(effect.modifiers[0].value_f64(), 2.0);
        assert_eq!(effect.outcomes.len(), 1);
        assert_eq!(effect.outcomes[0].prob, Some(1.0));
        assert_eq!(effect.outcomes[0].effects.len(), 1);
        assert_eq!(effect.save.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_effect_requires_name() {
        assert!(parse_effect(&json!({"notes": "nameless"}), &StatBonusLookup::default()).is_none());
        assert!(parse_effect(&json!("Strength Boost"), &StatBonusLookup::default()).is_none());
    }

    #[test]
    fn test_synthesis_prefers_leading_pattern() {
        let lookup = StatBonusLookup::from_sources(&[], &[Modifier::add(StatCode::Str, 5.0).unwrap()]);

        let effect = parse_effect(&json!({"name": "+2 Strength"}), &lookup).unwrap();
        assert_eq!(effect.modifiers[0].value_f64(), 2.0);

        let effect = parse_effect(&json!({"name": "Strength Boost"}), &lookup).unwrap();
        assert_eq!(effect.modifiers[0].value_f64(), 5.0);

        // alias must be a whole word
        let effect = parse_effect(&json!({"name": "Strongest Stride"}), &lookup).unwrap();
        assert!(effect.modifiers.is_empty());
    }

    #[test]
    fn test_enrich_effect_direct_match() {
        let mut effect = Effect::new("Static Shock");
        let details = vec![EffectDetail {
            key: "static shock".into(),
            label: Some("Static Shock".into()),
            chance: Some(0.25),
            modifiers: vec![Modifier::add(StatCode::Dex, 3.0).unwrap().temporary()],
            notes: Some("Zap".into()),
        }];
        enrich_effect(&mut effect, &details);
        assert_eq!(effect.chance, Some(0.25));
        assert_eq!(effect.notes.as_deref(), Some("Zap"));
        assert_eq!(effect.modifiers[0].stack_rule.as_deref(), Some("temporary"));
    }

    #[test]
    fn test_enrich_effect_keeps_existing_chance_and_notes() {
        let mut effect = Effect::new("Dexterity Aura").with_modifier(Modifier::add(StatCode::Dex, 1.0).unwrap());
        effect.chance = Some(0.5);
        effect.notes = Some("Own".into());
        let details = vec![EffectDetail {
            key: "something else".into(),
            label: None,
            chance: Some(0.1),
            modifiers: vec![Modifier::add(StatCode::Dex, 4.0).unwrap()],
            notes: Some("Mined".into()),
        }];
        enrich_effect(&mut effect, &details);
        assert_eq!(effect.chance, Some(0.5));
        assert_eq!(effect.notes.as_deref(), Some("Own"));
        assert_eq!(effect.modifiers[0].value_f64(), 4.0);
    }

    #[test]
    fn test_shared_stat_detail_match_is_heuristic() {
        // Both effects name DEX, so the stat fallback may hand either of them
        // the same detail. Only the per-stat invariant is checked here.
        let details = vec![EffectDetail {
            key: "5 dex".into(),
            label: None,
            chance: None,
            modifiers: vec![Modifier::add(StatCode::Dex, 5.0).unwrap()],
            notes: None,
        }];
        let mut first = Effect::new("Dex Boost");
        let mut second = Effect::new("Dexterity Ward");
        enrich_effect(&mut first, &details);
        enrich_effect(&mut second, &details);
        for effect in [&first, &second] {
            assert!(effect.modifiers.iter().filter(|m| m.stat == StatCode::Dex).count() <= 1);
        }
    }

    #[test]
    fn test_append_missing_bonuses_once_per_stat() {
        let lookup = StatBonusLookup::from_sources(
            &[],
            &[
                Modifier::add(StatCode::Str, 5.0).unwrap(),
                Modifier::add(StatCode::Con, 2.0).unwrap(),
            ],
        );
        let mut effects = vec![Effect::new("Mighty").with_modifier(Modifier::add(StatCode::Str, 5.0).unwrap())];
        append_missing_bonuses(&mut effects, &lookup);
        append_missing_bonuses(&mut effects, &lookup);

        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1].name, "+2 CON");
        assert!(effects[1].chance.is_none());
    }

    #[test]
    fn test_parse_physical() {
        let value = json!({
            "weight_kg": "1.5",
            "dimensions_cm": {"length": 10, "width": "wide"},
            "durability": "sturdy"
        });
        let physical = parse_physical(Some(&value)).unwrap();
        assert_eq!(physical.weight_kg, Some(1.5));
        let dims = physical.dimensions_cm.unwrap();
        assert_eq!(dims.length, Some(10.0));
        assert_eq!(dims.width, None);
        assert!(physical.durability.is_none());
        assert!(parse_physical(Some(&json!("heavy"))).is_none());
    }

    #[test]
    fn test_image_sub_objects() {
        assert!(parse_focal_point(Some(&json!({"x": 0.5, "y": "0.25"}))).is_some());
        assert!(parse_focal_point(Some(&json!({"x": 2, "y": 0.5}))).is_none());

        let attribution = parse_attribution(Some(&json!({"author": "Matt", "license": 3, "extra": "x"}))).unwrap();
        assert_eq!(attribution.len(), 1);

        let foundry = parse_foundry(Some(&json!({"img": "a.png", "scale": "1.5"}))).unwrap();
        assert_eq!(foundry["scale"], json!(1.5));

        let foundry = parse_foundry(Some(&json!({"token_img": "t.png", "img": 4, "tint": "red"}))).unwrap();
        assert_eq!(foundry.len(), 1);
        assert_eq!(foundry["token_img"], "t.png");
        assert!(parse_foundry(Some(&json!({"tint": "red", "scale": "big"}))).is_none());

        let entry = parse_srcset_entry(&json!({"src": "a.png", "width": "200", "density": -1})).unwrap();
        assert_eq!(entry.width, Some(200));
        assert_eq!(entry.density, None);
        assert!(parse_srcset_entry(&json!({"width": 1})).is_none());
    }
}
