//! Item taxonomy and kind canonicalization

use serde::{Deserialize, Serialize};

use super::stat_code::normalize_label;

/// Canonical item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Armor,
    Clothing,
    Jewelry,
    Consumable,
    Tool,
    Container,
    #[serde(rename = "Loot Box")]
    LootBox,
    Material,
    Key,
    Book,
    Trinket,
    Other,
}

/// Free-text labels (normalized) that map onto a canonical kind
const KIND_ALIASES: &[(&str, ItemKind)] = &[
    ("weapons", ItemKind::Weapon),
    ("sword", ItemKind::Weapon),
    ("dagger", ItemKind::Weapon),
    ("knife", ItemKind::Weapon),
    ("axe", ItemKind::Weapon),
    ("mace", ItemKind::Weapon),
    ("hammer", ItemKind::Weapon),
    ("club", ItemKind::Weapon),
    ("spear", ItemKind::Weapon),
    ("bow", ItemKind::Weapon),
    ("crossbow", ItemKind::Weapon),
    ("gun", ItemKind::Weapon),
    ("firearm", ItemKind::Weapon),
    ("staff", ItemKind::Weapon),
    ("wand", ItemKind::Weapon),
    ("gauntlet", ItemKind::Weapon),
    ("explosive", ItemKind::Weapon),
    ("armour", ItemKind::Armor),
    ("helmet", ItemKind::Armor),
    ("shield", ItemKind::Armor),
    ("chestplate", ItemKind::Armor),
    ("breastplate", ItemKind::Armor),
    ("greaves", ItemKind::Armor),
    ("clothes", ItemKind::Clothing),
    ("apparel", ItemKind::Clothing),
    ("wearable", ItemKind::Clothing),
    ("cloak", ItemKind::Clothing),
    ("robe", ItemKind::Clothing),
    ("hat", ItemKind::Clothing),
    ("boots", ItemKind::Clothing),
    ("gloves", ItemKind::Clothing),
    ("jacket", ItemKind::Clothing),
    ("ring", ItemKind::Jewelry),
    ("amulet", ItemKind::Jewelry),
    ("necklace", ItemKind::Jewelry),
    ("bracelet", ItemKind::Jewelry),
    ("earring", ItemKind::Jewelry),
    ("crown", ItemKind::Jewelry),
    ("tiara", ItemKind::Jewelry),
    ("consumables", ItemKind::Consumable),
    ("potion", ItemKind::Consumable),
    ("elixir", ItemKind::Consumable),
    ("tonic", ItemKind::Consumable),
    ("food", ItemKind::Consumable),
    ("drink", ItemKind::Consumable),
    ("scroll", ItemKind::Consumable),
    ("grenade", ItemKind::Consumable),
    ("bomb", ItemKind::Consumable),
    ("healingitem", ItemKind::Consumable),
    ("tools", ItemKind::Tool),
    ("kit", ItemKind::Tool),
    ("device", ItemKind::Tool),
    ("gadget", ItemKind::Tool),
    ("utility", ItemKind::Tool),
    ("bag", ItemKind::Container),
    ("backpack", ItemKind::Container),
    ("pouch", ItemKind::Container),
    ("chest", ItemKind::Container),
    ("box", ItemKind::LootBox),
    ("boxes", ItemKind::LootBox),
    ("lootboxes", ItemKind::LootBox),
    ("benefactorbox", ItemKind::LootBox),
    ("fanbox", ItemKind::LootBox),
    ("bronzebox", ItemKind::LootBox),
    ("silverbox", ItemKind::LootBox),
    ("goldbox", ItemKind::LootBox),
    ("platinumbox", ItemKind::LootBox),
    ("legendarybox", ItemKind::LootBox),
    ("celestialbox", ItemKind::LootBox),
    ("materials", ItemKind::Material),
    ("craftingmaterial", ItemKind::Material),
    ("ingredient", ItemKind::Material),
    ("reagent", ItemKind::Material),
    ("component", ItemKind::Material),
    ("keys", ItemKind::Key),
    ("keycard", ItemKind::Key),
    ("books", ItemKind::Book),
    ("tome", ItemKind::Book),
    ("manual", ItemKind::Book),
    ("guide", ItemKind::Book),
    ("skillbook", ItemKind::Book),
    ("spellbook", ItemKind::Book),
    ("trinkets", ItemKind::Trinket),
    ("figurine", ItemKind::Trinket),
    ("toy", ItemKind::Trinket),
    ("sticker", ItemKind::Trinket),
    ("collectible", ItemKind::Trinket),
    ("misc", ItemKind::Other),
    ("miscellaneous", ItemKind::Other),
];

impl ItemKind {
    pub const ALL: [ItemKind; 13] = [
        ItemKind::Weapon,
        ItemKind::Armor,
        ItemKind::Clothing,
        ItemKind::Jewelry,
        ItemKind::Consumable,
        ItemKind::Tool,
        ItemKind::Container,
        ItemKind::LootBox,
        ItemKind::Material,
        ItemKind::Key,
        ItemKind::Book,
        ItemKind::Trinket,
        ItemKind::Other,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Weapon => "Weapon",
            Self::Armor => "Armor",
            Self::Clothing => "Clothing",
            Self::Jewelry => "Jewelry",
            Self::Consumable => "Consumable",
            Self::Tool => "Tool",
            Self::Container => "Container",
            Self::LootBox => "Loot Box",
            Self::Material => "Material",
            Self::Key => "Key",
            Self::Book => "Book",
            Self::Trinket => "Trinket",
            Self::Other => "Other",
        }
    }

    /// Match a single label directly against the enum, then against the alias table
    pub fn from_label(label: &str) -> Option<Self> {
        let key = normalize_label(label);
        if key.is_empty() {
            return None;
        }
        if let Some(kind) = Self::ALL
            .iter()
            .find(|kind| normalize_label(kind.display_name()) == key)
        {
            return Some(*kind);
        }
        KIND_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, kind)| *kind)
    }

    /// First candidate that matches wins; nothing matching yields `Other`
    pub fn canonicalize<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .find_map(Self::from_label)
            .unwrap_or(Self::Other)
    }
}

impl Default for ItemKind {
    fn default() -> Self {
        Self::Other
    }
}
