use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A catalog entry as persisted in the `products` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[validate(length(min = 1, message = "Path `name` is required."))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Field values for a product that has not been stored yet.
///
/// Every field may be absent; the store rejects a draft without a name.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct NewProduct {
    #[validate(
        required(message = "Path `name` is required."),
        length(min = 1, message = "Path `name` is required.")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub category: Option<String>,
}

/// Partial update applied by [`Product::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub category: Option<String>,
}

impl Product {
    /// Build the document for a validated draft. The identifier is assigned
    /// by the store.
    pub fn from_new(new: NewProduct) -> Self {
        Self {
            id: None,
            name: new.name.unwrap_or_default(),
            description: new.description,
            price: new.price,
            quantity: new.quantity,
            category: new.category,
        }
    }

    /// Overwrite each field whose incoming value is present and truthy.
    ///
    /// Empty strings and zero numbers count as "not provided", so an update
    /// can never set `price` or `quantity` to 0 or clear a text field.
    pub fn merge(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name.filter(Truthy::is_truthy) {
            self.name = name;
        }
        merge_field(&mut self.description, changes.description);
        merge_field(&mut self.price, changes.price);
        merge_field(&mut self.quantity, changes.quantity);
        merge_field(&mut self.category, changes.category);
    }
}

fn merge_field<T: Truthy>(current: &mut Option<T>, incoming: Option<T>) {
    if let Some(value) = incoming.filter(Truthy::is_truthy) {
        *current = Some(value);
    }
}

trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product {
            id: Some(ObjectId::new()),
            name: "Widget".to_string(),
            description: Some("A widget".to_string()),
            price: Some(10.0),
            quantity: Some(5.0),
            category: Some("tools".to_string()),
        }
    }

    #[test]
    fn merge_overwrites_only_provided_fields() {
        let mut product = widget();
        let before = product.clone();

        product.merge(ProductChanges {
            price: Some(50.0),
            ..Default::default()
        });

        assert_eq!(product.price, Some(50.0));
        assert_eq!(product.name, before.name);
        assert_eq!(product.description, before.description);
        assert_eq!(product.quantity, before.quantity);
        assert_eq!(product.category, before.category);
        assert_eq!(product.id, before.id);
    }

    #[test]
    fn merge_skips_zero_and_empty_values() {
        let mut product = widget();
        let before = product.clone();

        product.merge(ProductChanges {
            name: Some(String::new()),
            description: Some(String::new()),
            price: Some(0.0),
            quantity: Some(0.0),
            category: Some(String::new()),
        });

        assert_eq!(product, before);
    }

    #[test]
    fn merge_fills_previously_absent_fields() {
        let mut product = Product {
            description: None,
            category: None,
            ..widget()
        };

        product.merge(ProductChanges {
            description: Some("Now described".to_string()),
            category: Some("hardware".to_string()),
            ..Default::default()
        });

        assert_eq!(product.description.as_deref(), Some("Now described"));
        assert_eq!(product.category.as_deref(), Some("hardware"));
    }

    #[test]
    fn nan_price_is_not_truthy() {
        let mut product = widget();
        product.merge(ProductChanges {
            price: Some(f64::NAN),
            ..Default::default()
        });
        assert_eq!(product.price, Some(10.0));
    }

    #[test]
    fn new_product_requires_a_name() {
        assert!(NewProduct::default().validate().is_err());
        assert!(NewProduct {
            name: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(NewProduct {
            name: Some("Widget".to_string()),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn from_new_carries_every_field() {
        let product = Product::from_new(NewProduct {
            name: Some("Widget".to_string()),
            description: None,
            price: Some(10.0),
            quantity: Some(5.0),
            category: Some("tools".to_string()),
        });

        assert!(product.id.is_none());
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, Some(10.0));
        assert_eq!(product.quantity, Some(5.0));
        assert_eq!(product.category.as_deref(), Some("tools"));
        assert!(product.description.is_none());
    }

    #[test]
    fn stored_document_omits_absent_fields() {
        let product = Product {
            id: None,
            name: "Bare".to_string(),
            description: None,
            price: None,
            quantity: None,
            category: None,
        };

        let document = mongodb::bson::to_document(&product).unwrap();
        assert_eq!(document.len(), 1);
        assert_eq!(document.get_str("name").unwrap(), "Bare");
    }

    #[test]
    fn stored_document_with_fractional_numbers_decodes() {
        let id = ObjectId::new();
        let document = mongodb::bson::doc! {
            "_id": id,
            "name": "Rope",
            "price": 4,
            "quantity": 2.5,
            "__v": 0,
        };

        let product: Product = mongodb::bson::from_document(document).unwrap();
        assert_eq!(product.id, Some(id));
        assert_eq!(product.quantity, Some(2.5));
        assert_eq!(product.price, Some(4.0));
    }

    #[test]
    fn merge_accepts_fractional_quantity() {
        let mut product = widget();
        product.merge(ProductChanges {
            quantity: Some(1.5),
            ..Default::default()
        });
        assert_eq!(product.quantity, Some(1.5));
    }
}
