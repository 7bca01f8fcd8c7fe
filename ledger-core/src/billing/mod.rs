pub mod aggregate;
pub mod commit;
pub mod print;

pub use aggregate::{aggregate, billable, format_date_lines, Bill, DateLine, ItemBill, SellerBill};
pub use commit::mark_as_billed;
