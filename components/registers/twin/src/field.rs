//! Bit-field descriptors and the register definition macro.

/// Position of one field inside a 64-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: u32,
    pub width: u32,
}

impl Field {
    #[must_use]
    pub const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    /// Right-aligned mask covering `width` bits.
    #[must_use]
    pub const fn mask(self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    #[must_use]
    pub const fn extract(self, raw: u64) -> u64 {
        (raw >> self.offset) & self.mask()
    }

    /// `raw` with this field replaced by `val` (excess bits dropped).
    #[must_use]
    pub const fn insert(self, raw: u64, val: u64) -> u64 {
        (raw & !(self.mask() << self.offset)) | ((val & self.mask()) << self.offset)
    }
}

/// Plain integer/bool field payloads.
pub trait FieldValue: Copy {
    fn from_field(raw: u64) -> Self;
    fn to_field(self) -> u64;
}

impl FieldValue for bool {
    fn from_field(raw: u64) -> Self {
        raw != 0
    }
    fn to_field(self) -> u64 {
        u64::from(self)
    }
}

macro_rules! field_value_int {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                #[allow(clippy::cast_possible_truncation)]
                fn from_field(raw: u64) -> Self {
                    raw as $ty
                }
                fn to_field(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

field_value_int!(u8, u16, u32, u64);

/// Defines a register wrapper.
///
/// ```text
/// register! {
///     /// docs
///     pub struct FooReg = 0x0 {
///         /// field docs
///         BAR [4, 2] => bar, set_bar: value u8;
///         MODE [6, 3] => mode, set_mode: variant SomeEnum;
///     }
/// }
/// ```
///
/// `value` fields read back as the given integer/bool type; `variant`
/// fields decode through the enum's `from_bits`.
macro_rules! register {
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $default:literal {
            $(
                $(#[$fmeta:meta])*
                $konst:ident [$offset:literal, $width:literal] => $get:ident, $set:ident : $kind:ident $ty:ty;
            )*
        }
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name(u64);

        impl Default for $name {
            fn default() -> Self {
                Self($default)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(reg: $name) -> u64 {
                reg.0
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({:#018x})", stringify!($name), self.0)
            }
        }

        impl $name {
            /// Reset value.
            pub const RESET: u64 = $default;

            $(
                pub const $konst: $crate::field::Field = $crate::field::Field::new($offset, $width);
            )*

            #[must_use]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn to_raw(self) -> u64 {
                self.0
            }

            $(
                register!(@accessor $kind $konst $get $set [$ty] $(#[$fmeta])*);
            )*
        }
    };

    (@accessor value $konst:ident $get:ident $set:ident [$ty:ty] $(#[$fmeta:meta])*) => {
        $(#[$fmeta])*
        #[inline]
        #[must_use]
        pub fn $get(&self) -> $ty {
            <$ty as $crate::field::FieldValue>::from_field(Self::$konst.extract(self.0))
        }

        $(#[$fmeta])*
        #[inline]
        pub fn $set(&mut self, val: $ty) {
            self.0 = Self::$konst.insert(self.0, $crate::field::FieldValue::to_field(val));
        }
    };

    (@accessor variant $konst:ident $get:ident $set:ident [$ty:ty] $(#[$fmeta:meta])*) => {
        $(#[$fmeta])*
        ///
        /// # Errors
        /// Returns the raw bits if they name no variant.
        #[inline]
        #[allow(clippy::cast_possible_truncation)]
        pub fn $get(&self) -> Result<$ty, $crate::encode::UnknownVariant<u8>> {
            <$ty>::from_bits(Self::$konst.extract(self.0) as u8)
        }

        $(#[$fmeta])*
        #[inline]
        pub fn $set(&mut self, val: $ty) {
            self.0 = Self::$konst.insert(self.0, u64::from(val.bits()));
        }
    };
}
