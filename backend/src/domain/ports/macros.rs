//! `define_port_error!`: error enums for driven ports.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! parameters take `impl Into<FieldType>`, so adapters can write
//! `AccountRepositoryError::query("boom")`.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Unreachable { message: String } => "unreachable: {message}",
            Conflict { expected: u8, actual: u8 } => "expected {expected}, found {actual}",
        }
    }

    #[test]
    fn constructor_converts_str_into_string() {
        let err = SamplePortError::unreachable("pool closed");
        assert_eq!(err.to_string(), "unreachable: pool closed");
    }

    #[test]
    fn multi_field_constructor_keeps_order() {
        let err = SamplePortError::conflict(1_u8, 2_u8);
        assert_eq!(
            err,
            SamplePortError::Conflict {
                expected: 1,
                actual: 2
            }
        );
    }
}
