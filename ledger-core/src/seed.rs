use tracing::{info, warn};

use crate::models::{ItemDraft, SellerDraft};
use crate::session::Session;

fn item(name: &str, price: u64, code: &str) -> ItemDraft {
    ItemDraft {
        item_id: None,
        name: name.to_string(),
        price,
        code: code.to_string(),
        photo: String::new(),
    }
}

/// Sellers created on an empty store when demo data is enabled.
pub fn demo_sellers() -> Vec<SellerDraft> {
    vec![
        SellerDraft {
            name: "Fresh Dairy".to_string(),
            contact: "98450 11111".to_string(),
            items: vec![
                item("Milk 1L", 56, "MLK-1"),
                item("Curd 500g", 30, "CRD-5"),
                item("Paneer 200g", 90, "PNR-2"),
            ],
        },
        SellerDraft {
            name: "Corner Bakery".to_string(),
            contact: "98450 22222".to_string(),
            items: vec![item("Bread", 40, "BRD"), item("Bun", 10, "BUN")],
        },
    ]
}

/// Fills an empty store with demo sellers.
///
/// Failures are logged and otherwise ignored; seeding never stops startup.
/// Returns how many sellers were created.
pub async fn seed_demo_data(session: &Session) -> usize {
    match session.list_sellers().await {
        Ok(sellers) if !sellers.is_empty() => {
            info!("Store already has {} seller(s), skipping demo data", sellers.len());
            return 0;
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Could not inspect store before seeding: {}", e);
            return 0;
        }
    }

    let mut created = 0;
    for draft in demo_sellers() {
        match session.create_seller(&draft).await {
            Ok(id) => {
                created += 1;
                info!("Seeded demo seller {} ({})", draft.name, id);
            }
            Err(e) => warn!("Failed to seed demo seller {}: {}", draft.name, e),
        }
    }
    created
}
