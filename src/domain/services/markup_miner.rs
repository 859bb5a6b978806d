//! Markup Miner - Facts read straight out of wiki markup
//!
//! Every function here is pure: same text in, same facts out. The
//! reconciliation service prefers these facts over the model draft wherever
//! the two disagree on something the page states verbatim.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::entities::Modifier;
use crate::domain::value_objects::{normalize_chance, StatCode};

/// Title of the section holding the in-world AI description
const AI_DESCRIPTION_HEADING: &str = "ai description";

/// Marks the start of upgraded-tier stats inside the effects field
const UPGRADED_MARKER: &str = "UPGRADED";

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

static_regex!(comment_re, r"(?s)<!--.*?-->");
static_regex!(ref_re, r"(?is)<ref[^>]*/>|<ref[^>]*>.*?</ref\s*>");
static_regex!(tag_re, r"</?[A-Za-z!][^<>]*>");
static_regex!(template_re, r"\{\{[^{}]*\}\}");
static_regex!(file_link_re, r"(?i)\[\[\s*(?:file|image|category)\s*:[^\[\]]*\]\]");
static_regex!(link_re, r"\[\[(?:[^\[\]|]*\|)*([^\[\]|]*)\]\]");
static_regex!(ext_link_text_re, r"\[(?:https?:)?//[^\s\[\]]+\s+([^\[\]]*)\]");
static_regex!(ext_link_bare_re, r"\[(?:https?:)?//[^\s\[\]]*\]");
static_regex!(heading_line_re, r"(?m)^[ \t]*=+[ \t]*(.*?)[ \t]*=+[ \t]*$");
static_regex!(list_marker_re, r"(?m)^[ \t]*[*#:;]+[ \t]*");
static_regex!(emphasis_re, r"'{2,}");
static_regex!(whitespace_re, r"\s+");

static_regex!(heading_re, r"^=+\s*(.*?)\s*=+$");
static_regex!(type_field_re, r"(?im)^[ \t]*\|[ \t]*type[ \t]*=([^\n]*)$");
static_regex!(effects_field_re, r"(?im)^[ \t]*\|[ \t]*effects[ \t]*=");
static_regex!(
    file_ref_re,
    r"(?im)\[\[[ \t]*(?:file|image)[ \t]*:([^|\]\n]+)|^[ \t]*\|[ \t]*image\d*[ \t]*=([^|\n]*)$"
);
static_regex!(
    leading_bonus_re,
    r"(?i)^([+-]\s*\d+(?:\.\d+)?)\s*(%)?\s*(?:(?:to|points?|pts?|of|in)\s+)*([A-Za-z]+)"
);
static_regex!(
    bonus_re,
    r"(?i)([+-]\s*\d+(?:\.\d+)?)\s*(%)?\s*(?:(?:to|points?|pts?|of|in)\s+)*([A-Za-z]+)"
);
static_regex!(percent_re, r"([+-]?)(\d+(?:\.\d+)?)\s*%");
static_regex!(sentence_break_re, r"[.!?](?:\s+|$)");
static_regex!(
    temporary_re,
    r"(?i)\b(?:temporar(?:y|ily)|for\s+\d+\s+(?:seconds?|minutes?|hours?|turns?|rounds?|days?)|until|while|lasts?|duration|expires?)\b"
);
static_regex!(labeled_line_re, r"^[*#:\s]*'''([^']+?)(?::'''|''':)\s*(.*)$");
static_regex!(bullet_line_re, r"^\*+\s*(.+)$");
static_regex!(non_alnum_re, r"[^a-z0-9]+");

/// Everything mined from one source document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinedSource {
    pub intro: Option<String>,
    pub ai_description: Option<String>,
    pub type_tokens: Vec<String>,
    pub file_references: Vec<String>,
    pub stat_bonuses: Vec<Modifier>,
    pub effect_details: Vec<EffectDetail>,
}

impl MinedSource {
    pub fn from_text(text: &str) -> Self {
        Self {
            intro: mine_intro(text),
            ai_description: mine_ai_description(text),
            type_tokens: mine_type_tokens(text),
            file_references: mine_file_references(text),
            stat_bonuses: mine_stat_bonuses(text),
            effect_details: mine_effect_details(text),
        }
    }
}

/// Per-effect facts from an annotated line or bullet
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDetail {
    /// Normalized lookup key
    pub key: String,
    pub label: Option<String>,
    pub chance: Option<f64>,
    pub modifiers: Vec<Modifier>,
    pub notes: Option<String>,
}

/// Reduce wiki markup to plain prose
pub fn strip_markup(text: &str) -> String {
    let mut current = strip_pass(text);
    // Removing one construct can expose another, so run to a fixpoint.
    // Every pass either shortens the text or only normalizes whitespace.
    loop {
        let next = strip_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_pass(text: &str) -> String {
    let mut out = comment_re().replace_all(text, "").into_owned();
    out = ref_re().replace_all(&out, "").into_owned();
    out = tag_re().replace_all(&out, "").into_owned();
    while template_re().is_match(&out) {
        out = template_re().replace_all(&out, "").into_owned();
    }
    out = file_link_re().replace_all(&out, "").into_owned();
    out = link_re().replace_all(&out, "$1").into_owned();
    out = ext_link_text_re().replace_all(&out, "$1").into_owned();
    out = ext_link_bare_re().replace_all(&out, "").into_owned();
    out = heading_line_re().replace_all(&out, "$1").into_owned();
    out = list_marker_re().replace_all(&out, "").into_owned();
    out = emphasis_re().replace_all(&out, "").into_owned();
    out = out.replace("&nbsp;", " ");
    whitespace_re().replace_all(&out, " ").trim().to_string()
}

/// Lowercase, alphanumeric words separated by single spaces
pub fn normalize_key(text: &str) -> String {
    let lowered = strip_markup(text).to_lowercase();
    non_alnum_re().replace_all(&lowered, " ").trim().to_string()
}

fn heading_title(line: &str) -> Option<&str> {
    heading_re()
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn is_category_line(line: &str) -> bool {
    line.to_ascii_lowercase().starts_with("[[category:")
}

/// Leading prose paragraph, skipping templates and category links
pub fn mine_intro(text: &str) -> Option<String> {
    let mut depth: usize = 0;
    let mut collected: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let opens = trimmed.matches("{{").count();
        let closes = trimmed.matches("}}").count();
        let in_template = depth > 0 || trimmed.starts_with("{{");
        depth = (depth + opens).saturating_sub(closes);

        if in_template || is_category_line(trimmed) {
            continue;
        }
        if trimmed.is_empty() {
            if collected.is_empty() {
                continue;
            }
            break;
        }
        if heading_title(trimmed).is_some() {
            break;
        }
        if strip_markup(trimmed).is_empty() {
            continue;
        }
        collected.push(trimmed);
    }

    let intro = strip_markup(&collected.join(" "));
    (!intro.is_empty()).then_some(intro)
}

/// Body of the "AI Description" section
pub fn mine_ai_description(text: &str) -> Option<String> {
    let mut body: Option<Vec<&str>> = None;

    for line in text.lines() {
        match (heading_title(line), body.as_mut()) {
            (Some(title), None) if title.trim().eq_ignore_ascii_case(AI_DESCRIPTION_HEADING) => {
                body = Some(Vec::new());
            }
            (Some(_), Some(_)) => break,
            (None, Some(lines)) => lines.push(line),
            _ => {}
        }
    }

    let stripped = strip_markup(&body?.join("\n"));
    (!stripped.is_empty()).then_some(stripped)
}

/// Tokens from the infobox `type` field, split on comma or slash
pub fn mine_type_tokens(text: &str) -> Vec<String> {
    let Some(caps) = type_field_re().captures(text) else {
        return Vec::new();
    };
    let value = strip_markup(&caps[1]);
    value
        .split([',', '/'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Media filenames from file links and `imageN` infobox fields, in document order
pub fn mine_file_references(text: &str) -> Vec<String> {
    file_ref_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| clean_file_value(m.as_str()))
        .filter(|name| !name.is_empty())
        .collect()
}

fn clean_file_value(value: &str) -> String {
    let value = value.trim().trim_start_matches("[[").trim_end_matches("]]").trim();
    let lowered = value.to_ascii_lowercase();
    let value = if lowered.starts_with("file:") {
        &value[5..]
    } else if lowered.starts_with("image:") {
        &value[6..]
    } else {
        value
    };
    value.trim().to_string()
}

/// Lines belonging to the infobox `effects` field, cut at the upgrade marker
fn effects_field(text: &str) -> Option<String> {
    let start = effects_field_re().find(text)?.end();
    let mut lines = Vec::new();

    for (idx, line) in text[start..].lines().enumerate() {
        let trimmed = line.trim_start();
        if idx > 0 && (trimmed.starts_with('|') || trimmed.starts_with("}}")) {
            break;
        }
        lines.push(line);
    }

    let mut field = lines.join("\n");
    if let Some(cut) = field.find(UPGRADED_MARKER) {
        field.truncate(cut);
    }
    Some(field)
}

fn parse_signed(number: &str) -> Option<f64> {
    let compact: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    compact.parse().ok()
}

/// Flat stat bonuses listed as bullets in the infobox `effects` field
pub fn mine_stat_bonuses(text: &str) -> Vec<Modifier> {
    let Some(field) = effects_field(text) else {
        return Vec::new();
    };
    let mut bonuses: Vec<Modifier> = Vec::new();

    for line in field.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('*') {
            continue;
        }
        let prose = strip_markup(trimmed);
        let Some(caps) = leading_bonus_re().captures(&prose) else {
            continue;
        };
        if caps.get(2).is_some() {
            continue;
        }
        let Some(stat) = StatCode::canonicalize(&caps[3]) else {
            continue;
        };
        if bonuses.iter().any(|b| b.stat == stat) {
            continue;
        }
        if let Some(modifier) = parse_signed(&caps[1]).and_then(|v| Modifier::add(stat, v)) {
            bonuses.push(modifier);
        }
    }

    bonuses
}

/// Parse a leading `+5 STR` / `+10% DEX` pattern
pub fn parse_leading_modifier(text: &str) -> Option<Modifier> {
    let prose = strip_markup(text);
    let caps = leading_bonus_re().captures(&prose)?;
    let stat = StatCode::canonicalize(&caps[3])?;
    let value = parse_signed(&caps[1])?;
    if caps.get(2).is_some() {
        Modifier::percent(stat, value)
    } else {
        Modifier::add(stat, value)
    }
}

/// Modifiers in free text, one per stat, marking temporary bonuses
pub fn parse_modifiers(text: &str) -> Vec<Modifier> {
    let mut modifiers: Vec<Modifier> = Vec::new();

    for sentence in sentence_break_re().split(text) {
        let temporary = temporary_re().is_match(sentence);
        for caps in bonus_re().captures_iter(sentence) {
            let Some(stat) = StatCode::canonicalize(&caps[3]) else {
                continue;
            };
            if modifiers.iter().any(|m| m.stat == stat) {
                continue;
            }
            let Some(value) = parse_signed(&caps[1]) else {
                continue;
            };
            let modifier = if caps.get(2).is_some() {
                Modifier::percent(stat, value)
            } else {
                Modifier::add(stat, value)
            };
            if let Some(modifier) = modifier {
                modifiers.push(if temporary { modifier.temporary() } else { modifier });
            }
        }
    }

    modifiers
}

fn first_unsigned_percentage(text: &str) -> Option<f64> {
    percent_re()
        .captures_iter(text)
        .find(|caps| caps[1].is_empty())
        .and_then(|caps| caps[2].parse::<f64>().ok())
        .and_then(normalize_chance)
}

/// Labeled (`'''Label:''' body`) and bulleted lines, keyed for effect lookup
pub fn mine_effect_details(text: &str) -> Vec<EffectDetail> {
    let mut details: Vec<EffectDetail> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let (label, body) = if let Some(caps) = labeled_line_re().captures(trimmed) {
            let label = strip_markup(caps[1].trim());
            (Some(label), caps[2].trim().to_string())
        } else if let Some(caps) = bullet_line_re().captures(trimmed) {
            (None, caps[1].to_string())
        } else {
            continue;
        };

        let key = normalize_key(label.as_deref().unwrap_or(&body));
        if key.is_empty() || details.iter().any(|d| d.key == key) {
            continue;
        }

        let prose = strip_markup(&body);
        details.push(EffectDetail {
            key,
            label: label.filter(|l| !l.is_empty()),
            chance: first_unsigned_percentage(&prose),
            modifiers: parse_modifiers(&prose),
            notes: (!prose.is_empty()).then_some(prose),
        });
    }

    details
}
