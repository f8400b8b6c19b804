//! Serde bridge: serialize Rust data to/from database rows.
//!
//! A custom serde `Serializer`/`Deserializer` pair converting directly
//! between Rust structs and `Vec<Value>` rows, with no intermediate
//! format. Callers load facts from plain structs and read extensions back
//! into them instead of hand-assembling `Value`s.
//!
//! Mapping: primitives map to their `Value` widths (`u8`–`u32` widen into
//! `I64`, 128-bit and `u64` go to the bigint variant), strings and chars
//! to `Str`, sequences and tuples to `Tuple`, and every named construct —
//! unit/newtype/tuple/struct structs and enum variants, plus `Option` —
//! to a `Ctor` value.

use std::fmt;

use latlog_ir::{Tuple, Value};
use num_bigint::BigInt;
use serde::de::{self, DeserializeOwned, IntoDeserializer, Visitor};
use serde::ser::{self, Impossible, Serialize};

/// Error type for bridge operations.
#[derive(Debug)]
pub struct BridgeError(pub String);

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "serde bridge error: {}", self.0)
    }
}

impl std::error::Error for BridgeError {}

impl ser::Error for BridgeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        BridgeError(msg.to_string())
    }
}

impl de::Error for BridgeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        BridgeError(msg.to_string())
    }
}

/// Serialize a Rust value into a database row. Structs, tuples, and
/// sequences become one column per field; primitives become a single
/// column.
pub fn to_row<T: Serialize>(value: &T) -> Result<Tuple, BridgeError> {
    value.serialize(RowSerializer)
}

/// Serialize a Rust value into a single `Value`.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, BridgeError> {
    value.serialize(FieldSerializer)
}

/// Deserialize a database row back into a Rust value.
pub fn from_row<T: DeserializeOwned>(row: &[Value]) -> Result<T, BridgeError> {
    T::deserialize(RowDeserializer { row })
}

/// Deserialize a single `Value` back into a Rust value.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, BridgeError> {
    T::deserialize(ValueDeserializer { value })
}

// ─── Serialization ──────────────────────────────────────────────────

/// Serializes one field into a `Value`.
struct FieldSerializer;

/// Collects elements for tuples, sequences, and constructor values.
struct Collector {
    /// Constructor name; `None` collects into a plain tuple.
    name: Option<&'static str>,
    items: Vec<Value>,
}

impl Collector {
    fn finish(self) -> Value {
        match self.name {
            Some(name) => Value::ctor(name, self.items),
            None => Value::tuple(self.items),
        }
    }
}

impl ser::Serializer for FieldSerializer {
    type Ok = Value;
    type Error = BridgeError;

    type SerializeSeq = Collector;
    type SerializeTuple = Collector;
    type SerializeTupleStruct = Collector;
    type SerializeTupleVariant = Collector;
    type SerializeMap = Impossible<Value, BridgeError>;
    type SerializeStruct = Collector;
    type SerializeStructVariant = Collector;

    fn serialize_bool(self, v: bool) -> Result<Value, BridgeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, BridgeError> {
        Ok(Value::I8(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, BridgeError> {
        Ok(Value::I16(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, BridgeError> {
        Ok(Value::I32(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, BridgeError> {
        Ok(Value::I64(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, BridgeError> {
        Ok(Value::int(BigInt::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, BridgeError> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, BridgeError> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, BridgeError> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, BridgeError> {
        Ok(Value::int(BigInt::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, BridgeError> {
        Ok(Value::int(BigInt::from(v)))
    }

    fn serialize_f32(self, _v: f32) -> Result<Value, BridgeError> {
        Err(BridgeError("floats are not database values".to_string()))
    }

    fn serialize_f64(self, _v: f64) -> Result<Value, BridgeError> {
        Err(BridgeError("floats are not database values".to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Value, BridgeError> {
        Ok(Value::string(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, BridgeError> {
        Ok(Value::string(v))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value, BridgeError> {
        Err(BridgeError("byte strings are not database values".to_string()))
    }

    fn serialize_none(self) -> Result<Value, BridgeError> {
        Ok(Value::atom("None"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, BridgeError> {
        Ok(Value::ctor("Some", vec![value.serialize(FieldSerializer)?]))
    }

    fn serialize_unit(self) -> Result<Value, BridgeError> {
        Ok(Value::Unit)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, BridgeError> {
        Ok(Value::atom(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, BridgeError> {
        Ok(Value::atom(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, BridgeError> {
        Ok(Value::ctor(name, vec![value.serialize(FieldSerializer)?]))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, BridgeError> {
        Ok(Value::ctor(variant, vec![value.serialize(FieldSerializer)?]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Collector, BridgeError> {
        Ok(Collector {
            name: None,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Collector, BridgeError> {
        Ok(Collector {
            name: None,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Collector, BridgeError> {
        Ok(Collector {
            name: Some(name),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Collector, BridgeError> {
        Ok(Collector {
            name: Some(variant),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, BridgeError> {
        Err(BridgeError("maps are not database values".to_string()))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Collector, BridgeError> {
        Ok(Collector {
            name: Some(name),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Collector, BridgeError> {
        Ok(Collector {
            name: Some(variant),
            items: Vec::with_capacity(len),
        })
    }
}

impl ser::SerializeSeq for Collector {
    type Ok = Value;
    type Error = BridgeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BridgeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for Collector {
    type Ok = Value;
    type Error = BridgeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BridgeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for Collector {
    type Ok = Value;
    type Error = BridgeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BridgeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for Collector {
    type Ok = Value;
    type Error = BridgeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BridgeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for Collector {
    type Ok = Value;
    type Error = BridgeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BridgeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for Collector {
    type Ok = Value;
    type Error = BridgeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BridgeError> {
        Ok(self.finish())
    }
}

/// Serializes the top level into a row: one column per field.
struct RowSerializer;

/// Collects top-level fields into a row.
struct RowCollector {
    items: Vec<Value>,
}

impl ser::Serializer for RowSerializer {
    type Ok = Tuple;
    type Error = BridgeError;

    type SerializeSeq = RowCollector;
    type SerializeTuple = RowCollector;
    type SerializeTupleStruct = RowCollector;
    type SerializeTupleVariant = Impossible<Tuple, BridgeError>;
    type SerializeMap = Impossible<Tuple, BridgeError>;
    type SerializeStruct = RowCollector;
    type SerializeStructVariant = Impossible<Tuple, BridgeError>;

    fn serialize_bool(self, v: bool) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::Bool(v)])
    }

    fn serialize_i8(self, v: i8) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::I8(v)])
    }

    fn serialize_i16(self, v: i16) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::I16(v)])
    }

    fn serialize_i32(self, v: i32) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::I32(v)])
    }

    fn serialize_i64(self, v: i64) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::I64(v)])
    }

    fn serialize_i128(self, v: i128) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::int(BigInt::from(v))])
    }

    fn serialize_u8(self, v: u8) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::I64(v as i64)])
    }

    fn serialize_u16(self, v: u16) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::I64(v as i64)])
    }

    fn serialize_u32(self, v: u32) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::I64(v as i64)])
    }

    fn serialize_u64(self, v: u64) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::int(BigInt::from(v))])
    }

    fn serialize_f32(self, _v: f32) -> Result<Tuple, BridgeError> {
        Err(BridgeError("floats are not database values".to_string()))
    }

    fn serialize_f64(self, _v: f64) -> Result<Tuple, BridgeError> {
        Err(BridgeError("floats are not database values".to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::string(v.to_string())])
    }

    fn serialize_str(self, v: &str) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::string(v)])
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Tuple, BridgeError> {
        Err(BridgeError("byte strings are not database values".to_string()))
    }

    fn serialize_none(self) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::atom("None")])
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Tuple, BridgeError> {
        Ok(vec![FieldSerializer.serialize_some(value)?])
    }

    fn serialize_unit(self) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::Unit])
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Tuple, BridgeError> {
        Ok(vec![Value::atom(name)])
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
    ) -> Result<Tuple, BridgeError> {
        Ok(vec![FieldSerializer.serialize_unit_variant(name, index, variant)?])
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Tuple, BridgeError> {
        // A newtype row is the row of its payload.
        value.serialize(RowSerializer)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Tuple, BridgeError> {
        Ok(vec![
            FieldSerializer.serialize_newtype_variant(name, index, variant, value)?,
        ])
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<RowCollector, BridgeError> {
        Ok(RowCollector {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<RowCollector, BridgeError> {
        Ok(RowCollector {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<RowCollector, BridgeError> {
        Ok(RowCollector {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, BridgeError> {
        Err(BridgeError("enum variants are single columns, not rows".to_string()))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, BridgeError> {
        Err(BridgeError("maps are not database rows".to_string()))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<RowCollector, BridgeError> {
        Ok(RowCollector {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, BridgeError> {
        Err(BridgeError("enum variants are single columns, not rows".to_string()))
    }
}

impl ser::SerializeSeq for RowCollector {
    type Ok = Tuple;
    type Error = BridgeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tuple, BridgeError> {
        Ok(self.items)
    }
}

impl ser::SerializeTuple for RowCollector {
    type Ok = Tuple;
    type Error = BridgeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tuple, BridgeError> {
        Ok(self.items)
    }
}

impl ser::SerializeTupleStruct for RowCollector {
    type Ok = Tuple;
    type Error = BridgeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tuple, BridgeError> {
        Ok(self.items)
    }
}

impl ser::SerializeStruct for RowCollector {
    type Ok = Tuple;
    type Error = BridgeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), BridgeError> {
        self.items.push(value.serialize(FieldSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tuple, BridgeError> {
        Ok(self.items)
    }
}

// ─── Deserialization ────────────────────────────────────────────────

/// Deserializes one `Value`.
struct ValueDeserializer<'a> {
    value: &'a Value,
}

/// Walks the columns of a row.
struct ColumnAccess<'a> {
    columns: std::slice::Iter<'a, Value>,
}

impl<'de> de::SeqAccess<'de> for ColumnAccess<'_> {
    type Error = BridgeError;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, BridgeError> {
        match self.columns.next() {
            Some(value) => seed.deserialize(ValueDeserializer { value }).map(Some),
            None => Ok(None),
        }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'_> {
    type Error = BridgeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        match self.value {
            Value::Unit => visitor.visit_unit(),
            Value::Bool(v) => visitor.visit_bool(*v),
            Value::I8(v) => visitor.visit_i8(*v),
            Value::I16(v) => visitor.visit_i16(*v),
            Value::I32(v) => visitor.visit_i32(*v),
            Value::I64(v) => visitor.visit_i64(*v),
            Value::Int(v) => match i64::try_from(v.as_ref()) {
                Ok(v) => visitor.visit_i64(v),
                Err(_) => Err(BridgeError(format!("bigint {v} exceeds i64"))),
            },
            Value::Str(v) => visitor.visit_str(v.as_str()),
            Value::Tuple(items) => visitor.visit_seq(ColumnAccess {
                columns: items.iter(),
            }),
            Value::Ctor(ctor) => visitor.visit_seq(ColumnAccess {
                columns: ctor.args.iter(),
            }),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        match self.value {
            Value::Ctor(ctor) if ctor.name == "None" && ctor.args.is_empty() => {
                visitor.visit_none()
            }
            Value::Ctor(ctor) if ctor.name == "Some" && ctor.args.len() == 1 => {
                visitor.visit_some(ValueDeserializer {
                    value: &ctor.args[0],
                })
            }
            other => Err(BridgeError(format!("expected Some/None, got {other:?}"))),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BridgeError> {
        match self.value {
            Value::Ctor(ctor) if ctor.name == name && ctor.args.len() == 1 => {
                visitor.visit_newtype_struct(ValueDeserializer {
                    value: &ctor.args[0],
                })
            }
            _ => visitor.visit_newtype_struct(self),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BridgeError> {
        match self.value {
            Value::Ctor(ctor) => visitor.visit_enum(CtorAccess { ctor }),
            other => Err(BridgeError(format!("expected constructor, got {other:?}"))),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

/// Drives enum deserialization from a constructor value.
struct CtorAccess<'a> {
    ctor: &'a latlog_ir::CtorValue,
}

impl<'de> de::EnumAccess<'de> for CtorAccess<'_> {
    type Error = BridgeError;
    type Variant = Self;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self), BridgeError> {
        let variant = seed.deserialize(self.ctor.name.as_str().into_deserializer())?;
        Ok((variant, self))
    }
}

impl<'de> de::VariantAccess<'de> for CtorAccess<'_> {
    type Error = BridgeError;

    fn unit_variant(self) -> Result<(), BridgeError> {
        if self.ctor.args.is_empty() {
            Ok(())
        } else {
            Err(BridgeError(format!(
                "variant {} carries {} arguments",
                self.ctor.name,
                self.ctor.args.len()
            )))
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, BridgeError> {
        match self.ctor.args.as_slice() {
            [value] => seed.deserialize(ValueDeserializer { value }),
            args => Err(BridgeError(format!(
                "variant {} has {} arguments, expected 1",
                self.ctor.name,
                args.len()
            ))),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, BridgeError> {
        visitor.visit_seq(ColumnAccess {
            columns: self.ctor.args.iter(),
        })
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BridgeError> {
        visitor.visit_seq(ColumnAccess {
            columns: self.ctor.args.iter(),
        })
    }
}

/// Deserializes a whole row.
struct RowDeserializer<'a> {
    row: &'a [Value],
}

impl<'a> RowDeserializer<'a> {
    fn single(&self) -> Result<ValueDeserializer<'a>, BridgeError> {
        match self.row {
            [value] => Ok(ValueDeserializer { value }),
            row => Err(BridgeError(format!(
                "expected a 1-column row, got {} columns",
                row.len()
            ))),
        }
    }
}

impl<'de> de::Deserializer<'de> for RowDeserializer<'_> {
    type Error = BridgeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        visitor.visit_seq(ColumnAccess {
            columns: self.row.iter(),
        })
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_option(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_enum(name, variants, visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BridgeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BridgeError> {
        self.single()?.deserialize_any(visitor)
    }

    serde::forward_to_deserialize_any! {
        i128 u8 u16 u32 u64 u128 f32 f64 bytes byte_buf unit unit_struct
        seq tuple tuple_struct map struct identifier ignored_any
    }
}
