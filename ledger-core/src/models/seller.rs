use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry sold by a seller.
///
/// Embedded in the seller document. `item_id` is generated once on the
/// client and kept across seller edits so purchase lines can refer to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Client-generated identifier, stable across edits
    pub item_id: String,

    /// Display name
    pub name: String,

    /// Unit price in the smallest currency unit
    #[serde(default)]
    pub price: u64,

    /// Optional SKU
    #[serde(default)]
    pub code: String,

    /// Opaque encoded image, empty when none was captured
    #[serde(default)]
    pub photo: String,
}

/// Seller model representing a supplier and its catalog.
///
/// Maps to documents of the `sellers` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: String,

    /// Seller name (never empty once written)
    #[serde(default)]
    pub name: String,

    /// Phone number, address or any free-form contact detail
    #[serde(default)]
    pub contact: String,

    /// Catalog items in display order
    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Seller {
    /// Looks up a catalog item by its identifier.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}

/// Catalog entry as submitted by the seller form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    /// Present when editing an existing item
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub photo: String,
}

/// Seller creation/update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub items: Vec<ItemDraft>,
}

impl SellerDraft {
    /// Turns the form rows into catalog items.
    ///
    /// Blank rows are dropped. Rows that already carry an `item_id` keep it;
    /// new rows get a fresh UUID.
    pub fn catalog(&self) -> Vec<Item> {
        self.items
            .iter()
            .filter(|draft| !draft.name.trim().is_empty())
            .map(|draft| Item {
                item_id: draft
                    .item_id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                name: draft.name.trim().to_string(),
                price: draft.price,
                code: draft.code.trim().to_string(),
                photo: draft.photo.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decode;
    use crate::store::{Collection, Record};
    use serde_json::json;

    #[test]
    fn missing_fields_get_defaults_on_read() {
        let record = Record {
            id: "s1".to_string(),
            fields: json!({"name": "Green Grocer"}),
        };

        let seller: Seller = decode(Collection::Sellers, record).unwrap();
        assert_eq!(seller.id, "s1");
        assert_eq!(seller.name, "Green Grocer");
        assert_eq!(seller.contact, "");
        assert!(seller.items.is_empty());
        assert!(seller.created_at.is_none());
    }

    #[test]
    fn item_defaults_apply_inside_catalog() {
        let record = Record {
            id: "s1".to_string(),
            fields: json!({
                "name": "Dairy",
                "items": [{"itemId": "milk", "name": "Milk", "price": 56}]
            }),
        };

        let seller: Seller = decode(Collection::Sellers, record).unwrap();
        let milk = seller.item("milk").unwrap();
        assert_eq!(milk.price, 56);
        assert_eq!(milk.code, "");
        assert_eq!(milk.photo, "");
        assert!(seller.item("bread").is_none());
    }

    #[test]
    fn negative_price_is_a_decode_error() {
        let record = Record {
            id: "s1".to_string(),
            fields: json!({"name": "Bad", "items": [{"itemId": "x", "name": "X", "price": -5}]}),
        };

        assert!(decode::<Seller>(Collection::Sellers, record).is_err());
    }

    #[test]
    fn catalog_keeps_existing_ids_and_drops_blank_rows() {
        let draft = SellerDraft {
            name: "Bakery".to_string(),
            contact: String::new(),
            items: vec![
                ItemDraft {
                    item_id: Some("bread-1".to_string()),
                    name: " Bread ".to_string(),
                    price: 40,
                    ..Default::default()
                },
                ItemDraft {
                    name: "   ".to_string(),
                    ..Default::default()
                },
                ItemDraft {
                    name: "Bun".to_string(),
                    price: 10,
                    ..Default::default()
                },
            ],
        };

        let items = draft.catalog();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_id, "bread-1");
        assert_eq!(items[0].name, "Bread");
        assert!(!items[1].item_id.is_empty());
        assert_ne!(items[1].item_id, "bread-1");
    }
}
