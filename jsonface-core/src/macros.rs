/// Declare a struct and implement [`Reflect`](crate::Reflect) for it.
///
/// Field names double as JSON keys. A field declared `pub` is public, anything
/// else (including `pub(crate)`) counts as private.
///
/// ```
/// jsonface_core::reflect_struct! {
///     #[derive(Debug)]
///     pub struct Point {
///         pub x: i32,
///         pub y: i32,
///     }
/// }
///
/// use jsonface_core::Reflect;
/// assert_eq!(Point::SHAPE.to_string(), "Point");
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Reflect for $name {
            const SHAPE: &'static $crate::Shape = &const {
                const FIELDS: &[$crate::Field] = &[
                    $(
                        $crate::Field {
                            name: stringify!($field),
                            shape: || <$fty as $crate::Reflect>::SHAPE,
                            visibility: $crate::Visibility::from_keyword(stringify!($fvis)),
                        },
                    )*
                ];
                $crate::Shape::new::<$name>(
                    stringify!($name),
                    $crate::Def::Struct($crate::StructDef { fields: FIELDS }),
                )
            };

            #[allow(unused_mut, unused_variables)]
            fn from_value(value: $crate::Value) -> ::core::result::Result<Self, $crate::ValueError> {
                let mut fields = $crate::__private::StructFields::new(value, stringify!($name))?;
                ::core::result::Result::Ok($name {
                    $(
                        $field: fields.take::<$fty>(stringify!($field))?,
                    )*
                })
            }
        }
    };
}

/// Implement [`Reflect`](crate::Reflect) for `Box<dyn Trait>`, making it a
/// polymorphic slot.
///
/// The slot's qualified name is `module_path!()::Trait` unless one is given
/// with `as "name"`. Resolvers for the slot must produce a `Box<dyn Trait>`.
///
/// ```
/// pub trait Instrument {
///     fn play(&self) -> String;
/// }
///
/// jsonface_core::interface!(dyn Instrument as "band::Instrument");
///
/// assert_eq!(
///     jsonface_core::interface_name::<Box<dyn Instrument>>(),
///     Some("band::Instrument"),
/// );
/// ```
#[macro_export]
macro_rules! interface {
    (dyn $($tr:ident)::+ as $name:expr) => {
        $crate::interface!(@impl [$($tr)::+] $name);
    };
    (dyn $tr:ident) => {
        $crate::interface!(@impl [$tr] concat!(module_path!(), "::", stringify!($tr)));
    };
    (@impl [$($tr:tt)+] $name:expr) => {
        impl $crate::Reflect for ::std::boxed::Box<dyn $($tr)+> {
            const SHAPE: &'static $crate::Shape = &const {
                $crate::Shape::new::<::std::boxed::Box<dyn $($tr)+>>(
                    $name,
                    $crate::Def::Interface($crate::InterfaceDef {
                        name: $name,
                        accepts: |object: &$crate::Object| {
                            object.is::<::std::boxed::Box<dyn $($tr)+>>()
                        },
                    }),
                )
            };

            fn from_value(value: $crate::Value) -> ::core::result::Result<Self, $crate::ValueError> {
                $crate::__private::interface_from_value::<Self>(value, $name)
            }
        }
    };
}

/// Implement [`Reflect`](crate::Reflect) for a `serde::Deserialize` type by
/// giving it a decode hook that hands the slot's raw JSON to serde.
#[macro_export]
macro_rules! reflect_via_serde {
    ($ty:ty) => {
        impl $crate::Reflect for $ty {
            const SHAPE: &'static $crate::Shape = &const {
                $crate::Shape::new::<$ty>(stringify!($ty), $crate::Def::Opaque)
                    .with_decode_hook($crate::__private::decode_with_serde::<$ty>)
            };

            fn from_value(value: $crate::Value) -> ::core::result::Result<Self, $crate::ValueError> {
                $crate::__private::serde_from_value::<$ty>(value, stringify!($ty))
            }
        }
    };
}
