//! Attribute value model: schemas ([`Key`]), typed values ([`Value`]),
//! name rules and inline attribute conversion.

pub mod inline;
pub mod key;
pub mod naming;
pub mod value;

pub use key::{auto_color, Key, KeyType, SelectOption, PALETTE_SIZE};
pub use value::{
    format_number, Value, ValueAsset, ValueBlock, ValueCheckbox, ValueContent, ValueDate,
    ValueNumber, ValueRelation, ValueRollup, ValueSelect, ValueText,
};
