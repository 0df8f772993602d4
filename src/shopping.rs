// 🛒 Shopping List - Cart aggregation and report rendering
//
// Every recipe in a user's cart contributes one CartLine per ingredient.
// Lines are grouped by ingredient name and their amounts summed; the
// resulting list is rendered as a numbered plain-text report.

use serde::Serialize;
use std::collections::HashMap;

/// Item lines that fit on one report page
pub const DEFAULT_LINES_PER_PAGE: usize = 37;

/// File name offered to the browser for the downloaded report
pub const REPORT_FILENAME: &str = "shopping_cart.txt";

const REPORT_TITLE: &str = "Shopping cart";
const PAGE_BREAK: char = '\u{c}';

// ============================================================================
// CART LINES
// ============================================================================

/// One ingredient contribution from one recipe in the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

impl CartLine {
    pub fn new(name: &str, measurement_unit: &str, amount: u32) -> Self {
        CartLine {
            name: name.to_string(),
            measurement_unit: measurement_unit.to_string(),
            amount,
        }
    }
}

/// Summed, name-deduplicated entry of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: u64,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Group cart lines by ingredient name, summing amounts.
///
/// Output keeps the order in which each name was first seen. When one name
/// shows up with different units, the first unit seen is kept.
pub fn aggregate<I>(lines: I) -> Vec<AggregatedLine>
where
    I: IntoIterator<Item = CartLine>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut aggregated: Vec<AggregatedLine> = Vec::new();

    for line in lines {
        match positions.get(&line.name) {
            Some(&index) => {
                aggregated[index].total += u64::from(line.amount);
            }
            None => {
                positions.insert(line.name.clone(), aggregated.len());
                aggregated.push(AggregatedLine {
                    name: line.name,
                    measurement_unit: line.measurement_unit,
                    total: u64::from(line.amount),
                });
            }
        }
    }

    aggregated
}

// ============================================================================
// REPORT
// ============================================================================

/// Printable shopping list built from aggregated lines
#[derive(Debug, Clone)]
pub struct ShoppingReport {
    items: Vec<AggregatedLine>,
    lines_per_page: usize,
}

impl ShoppingReport {
    pub fn new(items: Vec<AggregatedLine>) -> Self {
        ShoppingReport {
            items,
            lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }

    /// Override how many item lines go on each page (minimum 1)
    pub fn with_lines_per_page(mut self, lines_per_page: usize) -> Self {
        self.lines_per_page = lines_per_page.max(1);
        self
    }

    pub fn items(&self) -> &[AggregatedLine] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Numbered item lines: `{index}. {name} - {total} {unit}`
    pub fn lines(&self) -> Vec<String> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!(
                    "{}. {} - {} {}",
                    i + 1,
                    item.name,
                    item.total,
                    item.measurement_unit
                )
            })
            .collect()
    }

    /// Item lines split into pages
    pub fn pages(&self) -> Vec<Vec<String>> {
        let lines = self.lines();
        if lines.is_empty() {
            return vec![Vec::new()];
        }
        lines
            .chunks(self.lines_per_page)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Full text document: title, item pages separated by form feeds, closing rule
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(REPORT_TITLE);
        out.push('\n');
        out.push('\n');

        let pages = self.pages();
        for (page_index, page) in pages.iter().enumerate() {
            if page_index > 0 {
                out.push(PAGE_BREAK);
                out.push('\n');
            }
            for line in page {
                out.push_str(line);
                out.push('\n');
            }
        }

        out.push_str(&"_".repeat(40));
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: u32) -> CartLine {
        CartLine::new(name, unit, amount)
    }

    fn agg(name: &str, unit: &str, total: u64) -> AggregatedLine {
        AggregatedLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total,
        }
    }

    #[test]
    fn test_aggregate_empty_cart() {
        assert!(aggregate(Vec::new()).is_empty());
    }

    #[test]
    fn test_aggregate_single_line() {
        let result = aggregate(vec![line("Salt", "g", 5)]);
        assert_eq!(result, vec![agg("Salt", "g", 5)]);
    }

    #[test]
    fn test_aggregate_sums_by_name_in_first_seen_order() {
        let result = aggregate(vec![
            line("Flour", "g", 200),
            line("Sugar", "g", 100),
            line("Flour", "g", 50),
        ]);

        assert_eq!(result, vec![agg("Flour", "g", 250), agg("Sugar", "g", 100)]);
    }

    #[test]
    fn test_aggregate_keeps_first_unit_on_conflict() {
        let result = aggregate(vec![
            line("Milk", "ml", 200),
            line("Milk", "cup", 1),
        ]);

        assert_eq!(result, vec![agg("Milk", "ml", 201)]);
    }

    #[test]
    fn test_aggregate_preserves_per_name_sums() {
        let input = vec![
            line("Egg", "pcs", 2),
            line("Butter", "g", 30),
            line("Egg", "pcs", 3),
            line("Butter", "g", 20),
            line("Egg", "pcs", 1),
            line("Oil", "ml", 15),
        ];

        let result = aggregate(input.clone());

        assert_eq!(result.len(), 3);
        for out in &result {
            let expected: u64 = input
                .iter()
                .filter(|l| l.name == out.name)
                .map(|l| u64::from(l.amount))
                .sum();
            assert_eq!(out.total, expected, "sum mismatch for {}", out.name);
        }
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let input = vec![
            line("Rice", "g", 100),
            line("Beans", "g", 80),
            line("Rice", "g", 40),
        ];

        assert_eq!(aggregate(input.clone()), aggregate(input));
    }

    #[test]
    fn test_aggregate_does_not_overflow_u32() {
        let result = aggregate(vec![
            line("Water", "ml", u32::MAX),
            line("Water", "ml", u32::MAX),
        ]);

        assert_eq!(result[0].total, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_report_lines_format() {
        let report = ShoppingReport::new(vec![agg("Flour", "g", 250), agg("Sugar", "g", 100)]);

        assert_eq!(report.lines(), vec!["1. Flour - 250 g", "2. Sugar - 100 g"]);
    }

    #[test]
    fn test_report_render_layout() {
        let report = ShoppingReport::new(vec![agg("Salt", "g", 5)]);
        let text = report.render();

        let rendered: Vec<&str> = text.lines().collect();
        assert_eq!(rendered[0], "Shopping cart");
        assert_eq!(rendered[1], "");
        assert_eq!(rendered[2], "1. Salt - 5 g");
        assert!(rendered[3].chars().all(|c| c == '_'));
    }

    #[test]
    fn test_report_empty_cart_renders_title_only() {
        let report = ShoppingReport::new(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.pages().len(), 1);

        let text = report.render();
        assert!(text.starts_with("Shopping cart\n\n_"));
    }

    #[test]
    fn test_report_paginates_long_lists() {
        let items: Vec<AggregatedLine> = (0..5).map(|i| agg(&format!("Item {}", i), "g", 1)).collect();
        let report = ShoppingReport::new(items).with_lines_per_page(2);

        let pages = report.pages();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2], vec!["5. Item 4 - 1 g"]);

        let text = report.render();
        assert_eq!(text.matches(PAGE_BREAK).count(), 2);
        // numbering continues across pages
        assert!(text.contains("3. Item 2 - 1 g"));
    }
}
