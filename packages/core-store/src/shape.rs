//! Record shapes and their introspection.
//!
//! A shape is any serde-enabled struct. The struct name and field list come
//! from the `Deserialize` impl itself: [`describe`] drives it with a
//! deserializer that records what `deserialize_struct` is asked for and then
//! bails out, so nothing is ever actually deserialized.

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::Serialize;

/// A typed record that can be stored as a resource.
///
/// Implement it with an empty body for derived structs:
///
/// ```rust
/// use keyform_core_store::Shape;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// impl Shape for User {}
///
/// assert_eq!(User::shape_name(), "User");
/// assert_eq!(User::field_names(), Some(&["id", "name"][..]));
/// ```
pub trait Shape: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the shape. Resource prefixes default to its lower-cased form.
    fn shape_name() -> &'static str {
        match describe::<Self>() {
            Some(description) => description.name,
            None => short_type_name::<Self>(),
        }
    }

    /// Serialized field names, or `None` if the shape is not a plain struct.
    fn field_names() -> Option<&'static [&'static str]> {
        describe::<Self>().map(|description| description.fields)
    }

    /// Extra validation beyond what deserialization enforces.
    ///
    /// Runs on every record built from raw fields or read from the store.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Struct metadata recovered from a `Deserialize` impl.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeDescription {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Recover the struct name and field list of `T`.
///
/// Returns `None` for anything that does not deserialize as a struct
/// (maps, enums, `#[serde(flatten)]` structs, primitives).
pub fn describe<T: DeserializeOwned>() -> Option<ShapeDescription> {
    let mut found = None;
    // Always errors; only the side effect matters.
    let _ = T::deserialize(Introspector { found: &mut found });
    found
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

struct Introspector<'a> {
    found: &'a mut Option<ShapeDescription>,
}

impl<'de> Deserializer<'de> for Introspector<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.found = Some(ShapeDescription { name, fields });
        Err(de::Error::custom("introspection only"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}
