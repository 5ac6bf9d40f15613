//! Local import format: bracket rendering, `.prices` text, price deltas.
//!
//! Only the local trading tool sees these values. The published payload
//! is built from the [`CommodityRecord`]s directly and keeps the raw
//! coerced prices.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::tables::bracket_letter;
use crate::types::{CommodityRecord, PriceDelta, PriceLine, StoredPrice};

/// Rendered stock when nothing is on offer.
pub const STOCK_UNAVAILABLE: &str = "-";

/// Rendered demand when the station does not buy the item.
pub const DEMAND_UNKNOWN: &str = "?";

pub fn render_stock(stock: i64, bracket: u8) -> String {
    if stock == 0 || bracket == 0 {
        STOCK_UNAVAILABLE.to_string()
    } else {
        format!("{stock}{}", bracket_letter(bracket))
    }
}

/// Render demand and the sell price to display alongside it. Without
/// demand the station will not buy, so the displayed sell price is 0.
pub fn render_demand(demand: i64, bracket: u8, sell_price: i64) -> (String, i64) {
    if demand == 0 || bracket == 0 {
        (DEMAND_UNKNOWN.to_string(), 0)
    } else {
        (format!("{demand}{}", bracket_letter(bracket)), sell_price)
    }
}

pub fn price_line(record: &CommodityRecord) -> PriceLine {
    let (demand, sell_price) =
        render_demand(record.demand, record.demand_bracket, record.sell_price);
    PriceLine {
        name: record.name.clone(),
        category: record.category.clone(),
        sell_price,
        buy_price: record.buy_price,
        demand,
        stock: render_stock(record.stock, record.stock_bracket),
    }
}

pub fn price_lines(records: &[CommodityRecord]) -> Vec<PriceLine> {
    records.iter().map(price_line).collect()
}

/// Render a `.prices` file for one station.
///
/// A `+ Category` header is emitted whenever the category changes from
/// the previous line.
pub fn prices_file(system: &str, station: &str, lines: &[PriceLine]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "@ {system}/{station}");
    let mut category: Option<&str> = None;
    for line in lines {
        if category != Some(line.category.as_str()) {
            let _ = writeln!(out, "\t+ {}", line.category);
            category = Some(line.category.as_str());
        }
        let _ = writeln!(
            out,
            "\t\t{} {} {} {} {}",
            line.name, line.sell_price, line.buy_price, line.demand, line.stock
        );
    }
    out
}

/// Compare new lines against previously stored prices. Items with no
/// stored counterpart produce no delta.
pub fn price_deltas(
    previous: &HashMap<String, StoredPrice>,
    lines: &[PriceLine],
) -> Vec<PriceDelta> {
    lines
        .iter()
        .filter_map(|line| {
            let old = previous.get(&line.name)?;
            Some(PriceDelta {
                name: line.name.clone(),
                old_sell: old.sell_price,
                new_sell: line.sell_price,
                old_buy: old.buy_price,
                new_buy: line.buy_price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, category: &str) -> CommodityRecord {
        CommodityRecord {
            name: name.into(),
            service_name: name.into(),
            category: category.into(),
            mean_price: 5000,
            buy_price: 0,
            sell_price: 5101,
            stock: 120,
            stock_bracket: 2,
            demand: 0,
            demand_bracket: 0,
            status_flags: Vec::new(),
        }
    }

    #[test]
    fn test_render_stock() {
        assert_eq!(render_stock(0, 2), "-");
        assert_eq!(render_stock(120, 0), "-");
        assert_eq!(render_stock(120, 2), "120M");
        assert_eq!(render_stock(7, 3), "7H");
    }

    #[test]
    fn test_render_demand() {
        assert_eq!(render_demand(0, 0, 5101), ("?".to_string(), 0));
        assert_eq!(render_demand(0, 2, 5101), ("?".to_string(), 0));
        assert_eq!(render_demand(5, 1, 5101), ("5L".to_string(), 5101));
    }

    #[test]
    fn test_gold_line_zeroes_display_sell_only() {
        let rec = record("Gold", "Metals");
        let line = price_line(&rec);
        assert_eq!(line.stock, "120M");
        assert_eq!(line.demand, "?");
        assert_eq!(line.sell_price, 0);
        assert_eq!(line.buy_price, 0);
        // The record itself is untouched.
        assert_eq!(rec.sell_price, 5101);
    }

    #[test]
    fn test_prices_file_groups_categories() {
        let mut tea = record("Tea", "Foods");
        tea.demand = 300;
        tea.demand_bracket = 3;
        let lines = price_lines(&[record("Gold", "Metals"), record("Silver", "Metals"), tea]);
        let text = prices_file("Eranin", "Azeban City", &lines);
        assert_eq!(
            text,
            "@ Eranin/Azeban City\n\
             \t+ Metals\n\
             \t\tGold 0 0 ? 120M\n\
             \t\tSilver 0 0 ? 120M\n\
             \t+ Foods\n\
             \t\tTea 5101 0 300H 120M\n"
        );
    }

    #[test]
    fn test_price_deltas() {
        let mut previous = HashMap::new();
        previous.insert(
            "Gold".to_string(),
            StoredPrice {
                sell_price: 4900,
                buy_price: 0,
            },
        );
        let mut rec = record("Gold", "Metals");
        rec.demand = 10;
        rec.demand_bracket = 1;
        let lines = price_lines(&[rec, record("Tea", "Foods")]);
        let deltas = price_deltas(&previous, &lines);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].name, "Gold");
        assert_eq!(deltas[0].sell_change(), 201);
    }
}
