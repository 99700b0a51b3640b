use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(VariantId);
id_newtype!(ProductId);
id_newtype!(ShopId);
id_newtype!(MediaId);

/// Authorization capabilities checked before privileged catalog edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    CreateProduct,
}

/// A product variant as stored in the external catalog.
///
/// `ancestors` runs root to immediate parent and is empty for top-level
/// variants. `index` is the persisted sort key within a sibling group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub ancestors: Vec<VariantId>,
    pub index: i64,
    pub title: Option<String>,
    pub inventory_management: bool,
    pub inventory_available_to_sell: u32,
    pub is_visible: bool,
    pub shop_id: ShopId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub handle: String,
    /// Handle of the published revision, when one exists. Display layers
    /// prefer it over the working-copy handle.
    pub published_handle: Option<String>,
}

impl Product {
    pub fn display_handle(&self) -> &str {
        self.published_handle.as_deref().unwrap_or(&self.handle)
    }
}

/// Price span across a variant's own options, as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Formats the range the way the storefront shows it: a single price
    /// when the bounds coincide, `min - max` otherwise.
    pub fn display(&self) -> String {
        if self.min == self.max {
            format!("{:.2}", self.min)
        } else {
            format!("{:.2} - {:.2}", self.min, self.max)
        }
    }
}

/// A media record attached to a variant, ordered by `priority` ascending
/// when displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: MediaId,
    pub variant_id: VariantId,
    pub priority: i64,
}
