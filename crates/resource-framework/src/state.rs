//! # Resource State
//!
//! A resource's externally visible state is a plain struct. Bulk assignment
//! goes through a generated patch type instead of assigning fields by name:
//! [`resource_state!`](crate::resource_state) declares the struct, a
//! `<Name>Patch` with one optional slot per field, and the [`SetFields`] impl
//! that copies every filled slot over. Fields the patch leaves empty are not
//! touched.
//!
//! ```
//! resource_framework::resource_state! {
//!     #[derive(Debug, Default, Clone, PartialEq)]
//!     pub struct Profile {
//!         pub name: String,
//!         pub age: u32,
//!         pub city: String,
//!     }
//! }
//!
//! use resource_framework::SetFields;
//!
//! let mut profile = Profile { city: "Bern".into(), ..Default::default() };
//! profile.set(ProfilePatch::default().name("Ada").age(36u32));
//!
//! assert_eq!(profile.name, "Ada");
//! assert_eq!(profile.age, 36);
//! assert_eq!(profile.city, "Bern");
//! ```

/// Fan-out assignment from a typed patch.
pub trait SetFields {
    type Patch;

    fn set(&mut self, patch: Self::Patch);
}

/// Declares a state struct together with its patch type and [`SetFields`] impl.
#[macro_export]
macro_rules! resource_state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        $crate::__paste! {
            #[derive(Debug, Default, Clone)]
            $vis struct [<$name Patch>] {
                $( $field: ::core::option::Option<$ty>, )*
            }

            impl [<$name Patch>] {
                $(
                    pub fn $field(mut self, value: impl ::core::convert::Into<$ty>) -> Self {
                        self.$field = ::core::option::Option::Some(value.into());
                        self
                    }
                )*

                pub fn is_empty(&self) -> bool {
                    true $( && self.$field.is_none() )*
                }
            }

            impl $crate::SetFields for $name {
                type Patch = [<$name Patch>];

                fn set(&mut self, patch: Self::Patch) {
                    $(
                        if let ::core::option::Option::Some(value) = patch.$field {
                            self.$field = value;
                        }
                    )*
                }
            }
        }
    };
}
