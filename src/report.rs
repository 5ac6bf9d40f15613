//! Console summaries: commander profile and price changes.

use std::fmt::Write as _;

use crate::profile::Profile;
use crate::tables::rank_name;
use crate::types::PriceDelta;

const RULE: &str = "+------------+----------------------+---+";

/// Group an integer with thousands separators.
fn grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

/// Commander name, balance, rank table, docked flag and location.
pub fn profile_summary(profile: &Profile) -> String {
    let mut out = String::new();
    let name = profile.commander_name().unwrap_or("<unknown>");

    let _ = writeln!(out, "Commander: {name}");
    let _ = writeln!(out, "Credits  : {:>12}", grouped(profile.credits()));
    let _ = writeln!(out, "Debt     : {:>12}", grouped(profile.debt()));
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "|  Rank Type |            Rank Name | # |");
    let _ = writeln!(out, "{RULE}");

    let mut ranks = profile.ranks();
    ranks.sort();
    for (rank_type, rank) in ranks {
        let label = rank_name(&rank_type, rank).unwrap_or_default();
        let _ = writeln!(out, "| {rank_type:>10} | {label:>20} | {rank:1} |");
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Docked: {}", profile.is_docked());
    if let (Ok(system), Ok(station)) = (profile.system_name(), profile.station_name()) {
        let _ = writeln!(out, "System: {system}");
        let _ = writeln!(out, "Station: {station}");
    }
    out
}

/// One line per item whose price moved.
pub fn delta_summary(deltas: &[PriceDelta]) -> String {
    let mut out = String::new();
    for delta in deltas.iter().filter(|d| !d.is_unchanged()) {
        let _ = writeln!(out, "{delta}");
    }
    out
}
