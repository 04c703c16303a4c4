#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod typeid;
pub use typeid::ConstTypeId;

mod def;
pub use def::*;

mod shape;
pub use shape::{BoxError, DecodeHook, Shape};

mod value;
pub use value::{Object, Value};

mod raw_json;
pub use raw_json::RawJson;

pub mod path;
pub use path::{Path, PathStep};

mod error;
pub use error::{ValueError, ValueErrorKind};

mod reflect;
pub use reflect::{Reflect, interface_name, type_name};

mod macros;

#[doc(hidden)]
pub mod __private {
    pub use crate::reflect::{
        StructFields, decode_with_serde, interface_from_value, object_from_value,
        serde_from_value,
    };
}
