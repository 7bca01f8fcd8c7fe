use std::fmt;

use crate::billing::aggregate::Bill;

const RULE_WIDTH: usize = 48;

/// Plain-text rendering of the bill, ready to print.
///
/// Amounts are whole smallest-unit integers, so no rounding happens here.
impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "BILL {} to {}", self.from, self.to)?;
        writeln!(f, "{}", heavy)?;

        for seller in &self.sellers {
            writeln!(f, "Seller: {}", seller.seller_name)?;
            for item in &seller.items {
                writeln!(f, "  {} @ {}", item.name, item.price)?;
                writeln!(f, "    {}", item.date_wise_lines)?;
                writeln!(f, "    Amount: {}", item.amount)?;
            }
            writeln!(f, "  Seller total: {}", seller.total)?;
            writeln!(f, "{}", light)?;
        }

        writeln!(f, "Grand total: {}", self.grand_total)
    }
}

impl Bill {
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}
