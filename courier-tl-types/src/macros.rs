//! Declarative helpers that expand schema definitions into the same shape a
//! TL code generator would emit: a struct, its constructor id, and the
//! (de)serialization impls.
//!
//! Only flag-free constructors go through these macros. Constructors with a
//! `flags:#` word are written out by hand next to their siblings.

/// A bare constructor. Serializing writes the constructor id first;
/// deserializing reads the fields only (the boxed enum consumed the id).
macro_rules! tl_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $id:literal {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $crate::Identifiable for $name {
            const CONSTRUCTOR_ID: u32 = $id;
        }

        impl $crate::Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                $crate::Serializable::serialize(&<Self as $crate::Identifiable>::CONSTRUCTOR_ID, buf);
                $( $crate::Serializable::serialize(&self.$field, buf); )*
            }
        }

        impl $crate::Deserializable for $name {
            #[allow(unused_variables)]
            fn deserialize(buf: $crate::deserialize::Buffer) -> $crate::deserialize::Result<Self> {
                $( let $field = <$ty as $crate::Deserializable>::deserialize(buf)?; )*
                Ok(Self { $( $field, )* })
            }
        }
    };
}

/// An RPC function: a bare constructor that also names its response type.
macro_rules! tl_function {
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $id:literal -> $ret:ty {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        tl_struct! {
            $(#[$meta])*
            pub struct $name = $id {
                $( $(#[$fmeta])* pub $field : $ty, )*
            }
        }

        impl $crate::RemoteCall for $name {
            type Return = $ret;
        }
    };
}

/// A boxed type: one variant per constructor, dispatched on the leading id.
macro_rules! tl_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident($ty:ty) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub enum $name {
            $( $variant($ty), )+
        }

        impl $name {
            /// Constructor id of the active variant.
            pub fn constructor_id(&self) -> u32 {
                match self {
                    $( Self::$variant(_) => <$ty as $crate::Identifiable>::CONSTRUCTOR_ID, )+
                }
            }
        }

        impl $crate::Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                match self {
                    $( Self::$variant(x) => $crate::Serializable::serialize(x, buf), )+
                }
            }
        }

        impl $crate::Deserializable for $name {
            fn deserialize(buf: $crate::deserialize::Buffer) -> $crate::deserialize::Result<Self> {
                let id = <u32 as $crate::Deserializable>::deserialize(buf)?;
                $(
                    if id == <$ty as $crate::Identifiable>::CONSTRUCTOR_ID {
                        return Ok(Self::$variant(<$ty as $crate::Deserializable>::deserialize(buf)?));
                    }
                )+
                Err($crate::deserialize::Error::UnexpectedConstructor { id })
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(x: $ty) -> Self { Self::$variant(x) }
            }
        )+
    };
}
