//! Outfitting module catalog, keyed by the companion service's numeric id.
//!
//! The live profile only yields ids and internal names, so descriptors
//! (category, class, rating, qualifiers) come from here. Graded modules
//! occupy contiguous id blocks, one id per size and rating, and are
//! described as [`Family`] blocks; weapons and one-off modules are listed
//! individually; bulkheads come in sets of five per ship.

use self::Layout::{ByRating, BySize};
use crate::types::ModuleCategory::{Internal, Standard, Utility};
use crate::types::{ModuleCategory, ModuleRecord};

struct CatalogEntry {
    id: u64,
    category: ModuleCategory,
    name: &'static str,
    class: &'static str,
    rating: &'static str,
    mount: Option<&'static str>,
    guidance: Option<&'static str>,
}

impl CatalogEntry {
    fn record(&self) -> ModuleRecord {
        ModuleRecord {
            id: self.id,
            category: self.category,
            name: self.name.to_string(),
            class: self.class.to_string(),
            rating: self.rating.to_string(),
            mount: self.mount.map(str::to_string),
            guidance: self.guidance.map(str::to_string),
            ship: None,
        }
    }
}

const fn weapon(
    id: u64,
    name: &'static str,
    class: &'static str,
    rating: &'static str,
    mount: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        id,
        category: ModuleCategory::Hardpoint,
        name,
        class,
        rating,
        mount: Some(mount),
        guidance: None,
    }
}

const fn missile(
    id: u64,
    name: &'static str,
    class: &'static str,
    rating: &'static str,
    guidance: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        id,
        category: ModuleCategory::Hardpoint,
        name,
        class,
        rating,
        mount: Some("Fixed"),
        guidance: Some(guidance),
    }
}

const fn utility(id: u64, name: &'static str, rating: &'static str, mount: Option<&'static str>) -> CatalogEntry {
    CatalogEntry {
        id,
        category: ModuleCategory::Utility,
        name,
        class: "0",
        rating,
        mount,
        guidance: None,
    }
}

const fn internal(id: u64, name: &'static str, class: &'static str, rating: &'static str) -> CatalogEntry {
    CatalogEntry {
        id,
        category: ModuleCategory::Internal,
        name,
        class,
        rating,
        mount: None,
        guidance: None,
    }
}

const CATALOG: &[CatalogEntry] = &[
    // Pulse lasers
    weapon(128049381, "Pulse Laser", "1", "F", "Fixed"),
    weapon(128049382, "Pulse Laser", "2", "E", "Fixed"),
    weapon(128049383, "Pulse Laser", "3", "D", "Fixed"),
    weapon(128049384, "Pulse Laser", "4", "A", "Fixed"),
    weapon(128049385, "Pulse Laser", "1", "G", "Gimballed"),
    weapon(128049386, "Pulse Laser", "2", "F", "Gimballed"),
    weapon(128049387, "Pulse Laser", "3", "E", "Gimballed"),
    weapon(128681995, "Pulse Laser", "4", "A", "Gimballed"),
    weapon(128049388, "Pulse Laser", "1", "G", "Turreted"),
    weapon(128049389, "Pulse Laser", "2", "F", "Turreted"),
    weapon(128049390, "Pulse Laser", "3", "F", "Turreted"),
    // Burst lasers
    weapon(128049400, "Burst Laser", "1", "F", "Fixed"),
    weapon(128049401, "Burst Laser", "2", "E", "Fixed"),
    weapon(128049402, "Burst Laser", "3", "D", "Fixed"),
    weapon(128049403, "Burst Laser", "4", "E", "Fixed"),
    weapon(128049404, "Burst Laser", "1", "G", "Gimballed"),
    weapon(128049405, "Burst Laser", "2", "F", "Gimballed"),
    weapon(128049406, "Burst Laser", "3", "E", "Gimballed"),
    weapon(128727920, "Burst Laser", "4", "E", "Gimballed"),
    weapon(128049407, "Burst Laser", "1", "G", "Turreted"),
    weapon(128049408, "Burst Laser", "2", "F", "Turreted"),
    weapon(128049409, "Burst Laser", "3", "E", "Turreted"),
    // Beam lasers
    weapon(128049428, "Beam Laser", "1", "E", "Fixed"),
    weapon(128049429, "Beam Laser", "2", "D", "Fixed"),
    weapon(128049430, "Beam Laser", "3", "C", "Fixed"),
    weapon(128049431, "Beam Laser", "4", "A", "Fixed"),
    weapon(128049432, "Beam Laser", "1", "E", "Gimballed"),
    weapon(128049433, "Beam Laser", "2", "D", "Gimballed"),
    weapon(128049434, "Beam Laser", "3", "C", "Gimballed"),
    weapon(128681994, "Beam Laser", "4", "A", "Gimballed"),
    weapon(128049435, "Beam Laser", "1", "F", "Turreted"),
    weapon(128049436, "Beam Laser", "2", "E", "Turreted"),
    weapon(128049437, "Beam Laser", "3", "D", "Turreted"),
    // Cannons
    weapon(128049438, "Cannon", "1", "D", "Fixed"),
    weapon(128049439, "Cannon", "2", "D", "Fixed"),
    weapon(128049440, "Cannon", "3", "C", "Fixed"),
    weapon(128049441, "Cannon", "4", "B", "Fixed"),
    weapon(128049442, "Cannon", "1", "E", "Gimballed"),
    weapon(128049443, "Cannon", "2", "D", "Gimballed"),
    weapon(128671120, "Cannon", "3", "C", "Gimballed"),
    weapon(128049444, "Cannon", "4", "B", "Gimballed"),
    weapon(128049445, "Cannon", "1", "F", "Turreted"),
    weapon(128049446, "Cannon", "2", "E", "Turreted"),
    weapon(128049447, "Cannon", "3", "D", "Turreted"),
    // Fragment cannons
    weapon(128049448, "Fragment Cannon", "1", "E", "Fixed"),
    weapon(128049449, "Fragment Cannon", "2", "A", "Fixed"),
    weapon(128049450, "Fragment Cannon", "3", "C", "Fixed"),
    weapon(128049451, "Fragment Cannon", "1", "E", "Gimballed"),
    weapon(128049452, "Fragment Cannon", "2", "D", "Gimballed"),
    weapon(128671321, "Fragment Cannon", "3", "C", "Gimballed"),
    weapon(128049453, "Fragment Cannon", "1", "E", "Turreted"),
    weapon(128049454, "Fragment Cannon", "2", "D", "Turreted"),
    weapon(128671322, "Fragment Cannon", "3", "C", "Turreted"),
    // Multi-cannons
    weapon(128049455, "Multi-Cannon", "1", "F", "Fixed"),
    weapon(128049456, "Multi-Cannon", "2", "E", "Fixed"),
    weapon(128049457, "Multi-Cannon", "3", "C", "Fixed"),
    weapon(128049458, "Multi-Cannon", "4", "A", "Fixed"),
    weapon(128049459, "Multi-Cannon", "1", "G", "Gimballed"),
    weapon(128049460, "Multi-Cannon", "2", "F", "Gimballed"),
    weapon(128049461, "Multi-Cannon", "3", "C", "Gimballed"),
    weapon(128681996, "Multi-Cannon", "4", "A", "Gimballed"),
    weapon(128049462, "Multi-Cannon", "1", "G", "Turreted"),
    weapon(128049463, "Multi-Cannon", "2", "F", "Turreted"),
    weapon(128049464, "Multi-Cannon", "3", "E", "Turreted"),
    // Plasma, rail, mining
    weapon(128049465, "Plasma Accelerator", "2", "C", "Fixed"),
    weapon(128049466, "Plasma Accelerator", "3", "B", "Fixed"),
    weapon(128049467, "Plasma Accelerator", "4", "A", "Fixed"),
    weapon(128049488, "Rail Gun", "1", "D", "Fixed"),
    weapon(128049489, "Rail Gun", "2", "B", "Fixed"),
    weapon(128049525, "Mining Laser", "1", "D", "Fixed"),
    weapon(128049526, "Mining Laser", "2", "D", "Fixed"),
    // Launchers
    missile(128666724, "Missile Rack", "1", "B", "Dumbfire"),
    missile(128666725, "Missile Rack", "2", "B", "Dumbfire"),
    missile(128049492, "Missile Rack", "1", "B", "Seeker"),
    missile(128049493, "Missile Rack", "2", "B", "Seeker"),
    missile(128049509, "Torpedo Pylon", "1", "I", "Seeker"),
    missile(128049510, "Torpedo Pylon", "2", "I", "Seeker"),
    weapon(128049500, "Mine Launcher", "1", "I", "Fixed"),
    weapon(128049501, "Mine Launcher", "2", "I", "Fixed"),
    // Utility mounts without grades
    utility(128049513, "Chaff Launcher", "I", Some("Turreted")),
    utility(128049516, "Electronic Countermeasure", "F", None),
    utility(128049519, "Heat Sink Launcher", "I", Some("Turreted")),
    utility(128049522, "Point Defence", "I", Some("Turreted")),
    // One-off internals
    internal(128049549, "Docking Computer", "1", "E"),
    internal(128666634, "Detailed Surface Scanner", "1", "C"),
    internal(128662535, "Basic Discovery Scanner", "1", "E"),
    internal(128663560, "Intermediate Discovery Scanner", "1", "D"),
    internal(128663561, "Advanced Discovery Scanner", "1", "C"),
];

// ---------------------------------------------------------------------------
// Graded families
// ---------------------------------------------------------------------------

/// How a family's id block is ordered.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// All ratings of the smallest size first.
    BySize,
    /// One rating across every size, then the next rating.
    ByRating,
}

/// A contiguous id block covering every size × rating of one module.
struct Family {
    first_id: u64,
    category: ModuleCategory,
    name: &'static str,
    sizes: &'static [&'static str],
    ratings: &'static [&'static str],
    layout: Layout,
}

const GRADES: &[&str] = &["E", "D", "C", "B", "A"];
const SIZES_1_8: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8"];
const SIZES_2_8: &[&str] = &["2", "3", "4", "5", "6", "7", "8"];
const SIZES_2_7: &[&str] = &["2", "3", "4", "5", "6", "7"];
const SIZES_1_5: &[&str] = &["1", "2", "3", "4", "5"];
const SIZES_1_4: &[&str] = &["1", "2", "3", "4"];
const SIZES_ODD: &[&str] = &["1", "3", "5", "7"];
const SIZE_0: &[&str] = &["0"];

const fn family(
    first_id: u64,
    category: ModuleCategory,
    name: &'static str,
    sizes: &'static [&'static str],
    ratings: &'static [&'static str],
    layout: Layout,
) -> Family {
    Family {
        first_id,
        category,
        name,
        sizes,
        ratings,
        layout,
    }
}

const FAMILIES: &[Family] = &[
    // Core internals
    family(128064033, Standard, "Power Plant", SIZES_2_8, GRADES, BySize),
    family(128064068, Standard, "Thrusters", SIZES_2_8, GRADES, BySize),
    family(128064103, Standard, "Frame Shift Drive", SIZES_2_7, GRADES, BySize),
    family(128064138, Standard, "Life Support", SIZES_1_8, GRADES, BySize),
    family(128064178, Standard, "Power Distributor", SIZES_1_8, GRADES, BySize),
    family(128064218, Standard, "Sensors", SIZES_1_8, GRADES, BySize),
    family(128064346, Standard, "Fuel Tank", SIZES_1_8, &["C"], BySize),
    // Optional internals
    family(128064258, Internal, "Shield Generator", SIZES_1_8, GRADES, BySize),
    family(128064298, Internal, "Shield Cell Bank", SIZES_1_8, GRADES, BySize),
    family(128064338, Internal, "Cargo Rack", SIZES_1_8, &["E"], BySize),
    family(128666644, Internal, "Fuel Scoop", SIZES_1_8, GRADES, ByRating),
    family(128666684, Internal, "Refinery", SIZES_1_4, GRADES, ByRating),
    family(128666704, Internal, "Frame Shift Drive Interdictor", SIZES_1_4, GRADES, ByRating),
    family(128667598, Internal, "Auto Field-Maintenance Unit", SIZES_1_8, GRADES, ByRating),
    family(128668537, Internal, "Hull Reinforcement Package", SIZES_1_5, &["E", "D"], BySize),
    family(128671229, Internal, "Collector Limpet Controller", SIZES_ODD, GRADES, BySize),
    family(128671249, Internal, "Fuel Transfer Limpet Controller", SIZES_ODD, GRADES, BySize),
    family(128671269, Internal, "Prospector Limpet Controller", SIZES_ODD, GRADES, BySize),
    family(128672288, Internal, "Planetary Vehicle Hangar", &["2", "4", "6"], &["H", "G"], BySize),
    // Graded utility mounts
    family(128662520, Utility, "Cargo Scanner", SIZE_0, GRADES, BySize),
    family(128662525, Utility, "Frame Shift Wake Scanner", SIZE_0, GRADES, BySize),
    family(128662530, Utility, "Kill Warrant Scanner", SIZE_0, GRADES, BySize),
    family(128668532, Utility, "Shield Booster", SIZE_0, GRADES, BySize),
];

impl Family {
    fn len(&self) -> u64 {
        (self.sizes.len() * self.ratings.len()) as u64
    }

    fn record(&self, id: u64) -> Option<ModuleRecord> {
        let offset = id.checked_sub(self.first_id)?;
        if offset >= self.len() {
            return None;
        }
        let offset = usize::try_from(offset).ok()?;
        let (size, rating) = match self.layout {
            BySize => (offset / self.ratings.len(), offset % self.ratings.len()),
            ByRating => (offset % self.sizes.len(), offset / self.sizes.len()),
        };
        Some(ModuleRecord {
            id,
            category: self.category,
            name: self.name.to_string(),
            class: self.sizes[size].to_string(),
            rating: self.ratings[rating].to_string(),
            mount: None,
            guidance: None,
            ship: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Bulkheads
// ---------------------------------------------------------------------------

/// Bulkhead grades in id order within a ship's set.
const BULKHEADS: [&str; 5] = [
    "Lightweight Alloy",
    "Reinforced Alloy",
    "Military Grade Composite",
    "Mirrored Surface Composite",
    "Reactive Surface Composite",
];

/// First bulkhead id of each ship, with the ship's network name.
const ARMOUR_SETS: &[(u64, &str)] = &[
    (128049250, "Sidewinder"),
    (128049256, "Eagle"),
    (128049262, "Hauler"),
    (128049268, "Adder"),
    (128049274, "Viper MkIII"),
    (128049280, "Cobra MkIII"),
    (128049286, "Type-6 Transporter"),
    (128049298, "Type-7 Transporter"),
    (128049304, "Asp Explorer"),
    (128049310, "Vulture"),
    (128049316, "Imperial Clipper"),
    (128049322, "Federal Dropship"),
    (128049328, "Orca"),
    (128049334, "Type-9 Heavy"),
    (128049340, "Python"),
    (128049352, "Fer-de-Lance"),
    (128049364, "Anaconda"),
    (128049370, "Federal Corvette"),
    (128049376, "Imperial Cutter"),
    (128671218, "Diamondback Scout"),
    (128671224, "Imperial Courier"),
    (128671832, "Diamondback Explorer"),
    (128672140, "Imperial Eagle"),
    (128672147, "Federal Assault Ship"),
    (128672154, "Federal Gunship"),
    (128672257, "Viper MkIV"),
    (128672264, "Cobra MkIV"),
    (128672271, "Keelback"),
    (128672278, "Asp Scout"),
];

fn bulkhead(id: u64) -> Option<ModuleRecord> {
    ARMOUR_SETS.iter().find_map(|(first, ship)| {
        let grade = usize::try_from(id.checked_sub(*first)?).ok()?;
        let name = BULKHEADS.get(grade)?;
        Some(ModuleRecord {
            id,
            category: ModuleCategory::Standard,
            name: name.to_string(),
            class: "1".to_string(),
            rating: "I".to_string(),
            mount: None,
            guidance: None,
            ship: Some(ship.to_string()),
        })
    })
}

/// Look up a module descriptor by id.
pub fn module_by_id(id: u64) -> Option<ModuleRecord> {
    CATALOG
        .iter()
        .find(|e| e.id == id)
        .map(CatalogEntry::record)
        .or_else(|| FAMILIES.iter().find_map(|f| f.record(id)))
        .or_else(|| bulkhead(id))
}
