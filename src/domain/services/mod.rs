//! Domain services - Pure operations over source text

mod markup_miner;

pub use markup_miner::{
    mine_ai_description, mine_effect_details, mine_file_references, mine_intro,
    mine_stat_bonuses, mine_type_tokens, normalize_key, parse_leading_modifier, parse_modifiers,
    strip_markup, EffectDetail, MinedSource,
};
