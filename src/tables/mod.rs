//! Static lookup tables.
//!
//! Everything here is compiled-in literal data: ship name mappings,
//! commodity filters and corrections, bracket letters, rank names, and the
//! outfitting module catalog (in [`modules`]).

pub mod modules;

/// Letters for stock/demand brackets 0–3 in the local import format.
pub const BRACKET_LEVELS: [char; 4] = ['-', 'L', 'M', 'H'];

/// Categories that are never marketable (drones end up here).
pub const CATEGORY_IGNORE: &[&str] = &["NonMarketable"];

/// Rare or special goods the local trading tool cannot represent.
pub const COMMODITY_IGNORE: &[&str] = &[
    "Encrypted Data Storage",
    "Salvageable Wreckage",
    "Trinkets Of Hidden Fortune",
    "Unknown Artefact",
];

/// Category names as the local trading tool spells them.
pub const CATEGORY_CORRECTIONS: &[(&str, &str)] = &[("Narcotics", "Legal Drugs")];

/// Commodity names as the local trading tool spells them.
pub const COMMODITY_CORRECTIONS: &[(&str, &str)] = &[
    ("Agricultural Medicines", "Agri-Medicines"),
    ("Atmospheric Extractors", "Atmospheric Processors"),
    ("Auto Fabricators", "Auto-Fabricators"),
    ("Basic Narcotics", "Narcotics"),
    ("Bio Reducing Lichen", "Bioreducing Lichen"),
    ("Hazardous Environment Suits", "H.E. Suits"),
    ("Heliostatic Furnaces", "Microbial Furnaces"),
    ("Marine Supplies", "Marine Equipment"),
    ("Non Lethal Weapons", "Non-Lethal Weapons"),
    ("Terrain Enrichment Systems", "Land Enrichment Systems"),
];

/// Companion ship id → local trading tool ship name.
pub const LOCAL_SHIP_NAMES: &[(&str, &str)] = &[
    ("Adder", "Adder"),
    ("Anaconda", "Anaconda"),
    ("Asp", "Asp Explorer"),
    ("Asp_Scout", "Asp Scout"),
    ("BelugaLiner", "Beluga Liner"),
    ("CobraMkIII", "Cobra"),
    ("CobraMkIV", "Cobra MK IV"),
    ("Cutter", "Imperial Cutter"),
    ("DiamondBackXL", "Diamondback Explorer"),
    ("DiamondBack", "Diamondback Scout"),
    ("Dolphin", "Dolphin"),
    ("Eagle", "Eagle"),
    ("Empire_Courier", "Imperial Courier"),
    ("Empire_Eagle", "Imperial Eagle"),
    ("Empire_Fighter", "Empire_Fighter"),
    ("Empire_Trader", "Clipper"),
    ("Federation_Corvette", "Federal Corvette"),
    ("Federation_Dropship", "Dropship"),
    ("Federation_Dropship_MkII", "Federal Assault Ship"),
    ("Federation_Fighter", "Federation_Fighter"),
    ("Federation_Gunship", "Federal Gunship"),
    ("FerDeLance", "Fer-de-Lance"),
    ("Hauler", "Hauler"),
    ("Independant_Trader", "Keelback"),
    ("Orca", "Orca"),
    ("Python", "Python"),
    ("SideWinder", "Sidewinder"),
    ("Type6", "Type 6"),
    ("Type7", "Type 7"),
    ("Type9", "Type 9"),
    ("Viper", "Viper"),
    ("Viper_MkIV", "Viper MK IV"),
    ("Vulture", "Vulture"),
];

/// Companion ship id → event network ship name.
pub const NETWORK_SHIP_NAMES: &[(&str, &str)] = &[
    ("Adder", "Adder"),
    ("Anaconda", "Anaconda"),
    ("Asp", "Asp Explorer"),
    ("Asp_Scout", "Asp Scout"),
    ("BelugaLiner", "Beluga Liner"),
    ("CobraMkIII", "Cobra MkIII"),
    ("CobraMkIV", "Cobra MkIV"),
    ("Cutter", "Imperial Cutter"),
    ("DiamondBackXL", "Diamondback Explorer"),
    ("DiamondBack", "Diamondback Scout"),
    ("Dolphin", "Dolphin"),
    ("Eagle", "Eagle"),
    ("Empire_Courier", "Imperial Courier"),
    ("Empire_Eagle", "Imperial Eagle"),
    ("Empire_Fighter", "Imperial Fighter"),
    ("Empire_Trader", "Imperial Clipper"),
    ("Federation_Corvette", "Federal Corvette"),
    ("Federation_Dropship", "Federal Dropship"),
    ("Federation_Dropship_MkII", "Federal Assault Ship"),
    ("Federation_Fighter", "F63 Condor"),
    ("Federation_Gunship", "Federal Gunship"),
    ("FerDeLance", "Fer-de-Lance"),
    ("Hauler", "Hauler"),
    ("Independant_Trader", "Keelback"),
    ("Orca", "Orca"),
    ("Python", "Python"),
    ("SideWinder", "Sidewinder"),
    ("Type6", "Type-6 Transporter"),
    ("Type7", "Type-7 Transporter"),
    ("Type9", "Type-9 Heavy"),
    ("Viper", "Viper MkIII"),
    ("Viper_MkIV", "Viper MkIV"),
    ("Vulture", "Vulture"),
];

/// Rank names per rank type, indexed by rank number.
pub const RANK_NAMES: &[(&str, &[&str])] = &[
    (
        "combat",
        &[
            "Harmless", "Mostly Harmless", "Novice", "Competent", "Expert", "Master",
            "Dangerous", "Deadly", "Elite",
        ],
    ),
    (
        "trade",
        &[
            "Penniless", "Mostly Penniless", "Peddler", "Dealer", "Merchant", "Broker",
            "Entrepreneur", "Tycoon", "Elite",
        ],
    ),
    (
        "explore",
        &[
            "Aimless", "Mostly Aimless", "Scout", "Surveyor", "Trailblazer", "Pathfinder",
            "Ranger", "Pioneer", "Elite",
        ],
    ),
    (
        "cqc",
        &[
            "Helpless", "Mostly Helpless", "Amateur", "Semi Professional", "Professional",
            "Champion", "Hero", "Legend", "Elite",
        ],
    ),
    (
        "federation",
        &[
            "None", "Recruit", "Cadet", "Midshipman", "Petty Officer", "Chief Petty Officer",
            "Warrant Officer", "Ensign", "Lieutenant", "Lieutenant Commander",
            "Post Commander", "Post Captain", "Rear Admiral", "Vice Admiral", "Admiral",
        ],
    ),
    (
        "empire",
        &[
            "None", "Outsider", "Serf", "Master", "Squire", "Knight", "Lord", "Baron",
            "Viscount", "Count", "Earl", "Marquis", "Duke", "Prince", "King",
        ],
    ),
];

fn lookup<'a>(table: &'a [(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Ship tables are matched case-insensitively; the service is not
/// consistent about capitalisation between sections.
fn lookup_ship<'a>(table: &'a [(&'a str, &'a str)], id: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(id))
        .map(|(_, v)| *v)
}

pub fn corrected_category(category: &str) -> &str {
    lookup(CATEGORY_CORRECTIONS, category).unwrap_or(category)
}

pub fn corrected_commodity(name: &str) -> &str {
    lookup(COMMODITY_CORRECTIONS, name).unwrap_or(name)
}

pub fn is_ignored_category(category: &str) -> bool {
    CATEGORY_IGNORE.contains(&category)
}

pub fn is_ignored_commodity(name: &str) -> bool {
    COMMODITY_IGNORE.contains(&name)
}

pub fn local_ship_name(id: &str) -> Option<&'static str> {
    lookup_ship(LOCAL_SHIP_NAMES, id)
}

pub fn network_ship_name(id: &str) -> Option<&'static str> {
    lookup_ship(NETWORK_SHIP_NAMES, id)
}

pub fn bracket_letter(bracket: u8) -> char {
    BRACKET_LEVELS
        .get(bracket as usize)
        .copied()
        .unwrap_or(BRACKET_LEVELS[0])
}

/// Human name of a rank. `None` when the rank type has no table.
pub fn rank_name(rank_type: &str, rank: i64) -> Option<String> {
    let names = RANK_NAMES
        .iter()
        .find(|(t, _)| *t == rank_type)
        .map(|(_, names)| *names)?;
    let name = usize::try_from(rank)
        .ok()
        .and_then(|i| names.get(i))
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("Rank {rank}"));
    Some(name)
}
