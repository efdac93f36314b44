//! Entity model
//!
//! An entity is a typed record with a fixed attribute table. Each attribute
//! pairs its name with a setter that coerces the raw column text, so a mapping's
//! attribute order can be checked once against the table and then applied to
//! every row without name lookups.
//!
//! Entities are usually declared with [`sr_entity!`](crate::sr_entity):
//!
//! ```
//! sr_import::sr_entity! {
//!     /// Custom serving sizes
//!     pub struct Serving {
//!         id = "Serving",
//!         table = "servings",
//!         fields {
//!             ndb_no: String,
//!             grams: Option<f64>,
//!         }
//!     }
//! }
//!
//! let mut registry = sr_import::entity::EntityRegistry::new();
//! registry.register::<Serving>();
//! assert!(registry.resolve("Serving").is_some());
//! ```

use sr_common::{Result, SrError};
use std::collections::HashSet;
use std::fmt;

/// Declare an entity struct and its [`Entity`] implementation
///
/// Field names double as attribute names (used by the mapping) and column
/// names (used by storage). Field types must implement [`FromField`] and
/// [`IntoValue`].
#[macro_export]
macro_rules! sr_entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            id = $id:literal,
            table = $table:literal,
            fields {
                $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),+ $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )+
        }

        impl $crate::entity::Entity for $name {
            fn schema() -> &'static $crate::entity::EntitySchema {
                static SCHEMA: $crate::entity::EntitySchema = $crate::entity::EntitySchema {
                    id: $id,
                    table: $table,
                    columns: &[$(stringify!($field)),+],
                };
                &SCHEMA
            }

            fn attributes() -> &'static [$crate::entity::Attribute<Self>] {
                const ATTRIBUTES: &[$crate::entity::Attribute<$name>] = &[
                    $(
                        $crate::entity::Attribute {
                            name: stringify!($field),
                            set: {
                                fn set(
                                    record: &mut $name,
                                    raw: &str,
                                ) -> ::std::result::Result<(), $crate::entity::FieldError> {
                                    record.$field = $crate::entity::FromField::from_field(raw)?;
                                    Ok(())
                                }
                                set
                            },
                        },
                    )+
                ];
                ATTRIBUTES
            }

            fn to_row(&self) -> Vec<$crate::entity::Value> {
                vec![$( $crate::entity::IntoValue::to_value(&self.$field) ),+]
            }
        }
    };
}

mod models;
mod registry;

pub use models::*;
pub use registry::{EntityHandle, EntityRegistry};

/// A column value on its way into storage
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Why a raw column value could not be assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError(String);

impl FieldError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FieldError {}

/// Coercion from raw flat-file text
pub trait FromField: Sized {
    fn from_field(raw: &str) -> std::result::Result<Self, FieldError>;
}

impl FromField for String {
    fn from_field(raw: &str) -> std::result::Result<Self, FieldError> {
        Ok(raw.to_string())
    }
}

impl FromField for Option<String> {
    fn from_field(raw: &str) -> std::result::Result<Self, FieldError> {
        Ok((!raw.is_empty()).then(|| raw.to_string()))
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, kind: &str) -> std::result::Result<T, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(format!("expected {}, got an empty value", kind)));
    }
    trimmed
        .parse()
        .map_err(|_| FieldError::new(format!("expected {}, got '{}'", kind, raw)))
}

impl FromField for f64 {
    fn from_field(raw: &str) -> std::result::Result<Self, FieldError> {
        parse_number(raw, "a number")
    }
}

impl FromField for i64 {
    fn from_field(raw: &str) -> std::result::Result<Self, FieldError> {
        parse_number(raw, "an integer")
    }
}

impl FromField for Option<f64> {
    fn from_field(raw: &str) -> std::result::Result<Self, FieldError> {
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            f64::from_field(raw).map(Some)
        }
    }
}

impl FromField for Option<i64> {
    fn from_field(raw: &str) -> std::result::Result<Self, FieldError> {
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            i64::from_field(raw).map(Some)
        }
    }
}

/// Conversion into a storage value
pub trait IntoValue {
    fn to_value(&self) -> Value;
}

impl IntoValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl IntoValue for i64 {
    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, IntoValue::to_value)
    }
}

/// Typed setter for one attribute
pub type Setter<E> = fn(&mut E, &str) -> std::result::Result<(), FieldError>;

/// An attribute name and its setter
pub struct Attribute<E> {
    pub name: &'static str,
    pub set: Setter<E>,
}

impl<E> Clone for Attribute<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Attribute<E> {}

impl<E> fmt::Debug for Attribute<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute").field("name", &self.name).finish()
    }
}

/// Storage-facing description of an entity
#[derive(Debug)]
pub struct EntitySchema {
    /// Identifier used in the mapping and the registry
    pub id: &'static str,
    pub table: &'static str,
    /// Column names, in the order of [`Entity::to_row`]
    pub columns: &'static [&'static str],
}

/// A record type the importer can build and load
pub trait Entity: Default + Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;

    /// Declared attributes with their setters
    fn attributes() -> &'static [Attribute<Self>];

    /// Column values in schema column order
    fn to_row(&self) -> Vec<Value>;
}

/// A mapping's attribute order resolved against an entity's attribute table
pub struct AttributeBinding<E: Entity> {
    setters: Vec<Attribute<E>>,
}

impl<E: Entity> fmt::Debug for AttributeBinding<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.setters.iter().map(|a| a.name))
            .finish()
    }
}

impl<E: Entity> AttributeBinding<E> {
    /// Resolve `attribute_order`; position in the list is the column index
    ///
    /// Unknown, duplicated or missing attribute names are rejected here so
    /// that a bad mapping fails before any row is read.
    pub fn new(attribute_order: &[String]) -> Result<Self> {
        let entity = E::schema().id;
        if attribute_order.is_empty() {
            return Err(SrError::mapping(entity, "attribute order is empty"));
        }

        let declared = E::attributes();
        let mut seen = HashSet::with_capacity(attribute_order.len());
        let mut setters = Vec::with_capacity(attribute_order.len());

        for name in attribute_order {
            let attribute = declared
                .iter()
                .find(|a| a.name == name.as_str())
                .ok_or_else(|| {
                    SrError::mapping(
                        entity,
                        format!(
                            "unknown attribute '{}' (declared: {})",
                            name,
                            declared.iter().map(|a| a.name).collect::<Vec<_>>().join(", ")
                        ),
                    )
                })?;

            if !seen.insert(attribute.name) {
                return Err(SrError::mapping(
                    entity,
                    format!("attribute '{}' appears more than once", name),
                ));
            }
            setters.push(*attribute);
        }

        Ok(Self { setters })
    }

    /// Number of columns a row must have at least
    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    /// Build a record from one row
    ///
    /// Columns beyond the attribute order are ignored. A row with fewer
    /// columns than attributes is a mapping error.
    pub fn build(&self, values: &[String], line: usize) -> Result<E> {
        let entity = E::schema().id;
        if values.len() < self.setters.len() {
            return Err(SrError::mapping_at(
                entity,
                line,
                format!(
                    "row has {} columns, attribute order needs {}",
                    values.len(),
                    self.setters.len()
                ),
            ));
        }

        let mut record = E::default();
        for (attribute, raw) in self.setters.iter().zip(values) {
            (attribute.set)(&mut record, raw).map_err(|e| {
                SrError::mapping_at(entity, line, format!("attribute '{}': {}", attribute.name, e))
            })?;
        }
        Ok(record)
    }
}
