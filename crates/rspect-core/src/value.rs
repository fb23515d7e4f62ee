//! Compile-time value representation for the comparison engine.
//!
//! Every type an assertion can observe implements [`Expectable`], which maps a value onto one
//! variant of the closed [`Shape`] set. The mapping is fixed per type, so each
//! `Expectation<T>` instantiation resolves its dispatch at the call site.
//!
//! Supported representations:
//! - scalars: integers, `bool`, `char`, `f32`, `f64`
//! - strings: `&str`, `String`
//! - contiguous buffers: `&[E]`, `&Vec<E>` for any [`Element`] width
//! - objects: `Rc<T>`, `Arc<T>`, `Box<T>` where `T: ByteView`
//! - nullable references: `Option<R>` for any [`Reference`] `R`

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

use crate::protocol::ReportedValue;

/// Representation of a value as seen by the comparison engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    /// Integer scalar, widened losslessly.
    Integer(i128),
    /// Floating-point scalar.
    Float(f64),
    /// A null reference.
    Null,
    /// A non-null string.
    Str(&'a str),
    /// A contiguous buffer: declared element count plus its byte view.
    Buffer { len: usize, bytes: Cow<'a, [u8]> },
    /// A composite value: its byte view plus an optional declared length.
    Object {
        bytes: Cow<'a, [u8]>,
        length: Option<usize>,
    },
}

impl Shape<'_> {
    /// Returns true for the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness: null, empty strings, zero and NaN are falsy; everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Str(s) => !s.is_empty(),
            Self::Buffer { .. } | Self::Object { .. } => true,
            Self::Float(v) => !(v.is_nan() || *v == 0.0),
            Self::Integer(v) => *v != 0,
        }
    }

    /// Marshal this value into a runner-facing payload.
    #[must_use]
    pub fn report(&self) -> ReportedValue {
        match self {
            Self::Integer(v) => integer_report(*v),
            Self::Float(v) => ReportedValue::Float(*v),
            Self::Null => ReportedValue::Null,
            Self::Str(s) => ReportedValue::String((*s).to_string()),
            Self::Buffer { bytes, .. } | Self::Object { bytes, .. } => ReportedValue::Reference {
                bytes: bytes.to_vec(),
            },
        }
    }
}

fn integer_report(value: i128) -> ReportedValue {
    if let Ok(v) = i64::try_from(value) {
        ReportedValue::Integer(v)
    } else if let Ok(v) = u64::try_from(value) {
        ReportedValue::Unsigned(v)
    } else {
        ReportedValue::Float(value as f64)
    }
}

/// A value the comparison engine can assert on.
pub trait Expectable {
    /// `true` for nullable, heap-backed values; `false` for scalars.
    const IS_REFERENCE: bool;

    /// The representation of this value.
    fn shape(&self) -> Shape<'_>;

    /// Native equality used by `to_be`: numeric equality for scalars, content equality for
    /// strings, pointer identity (or both null) for every other reference.
    fn same(&self, other: &Self) -> bool;
}

/// Marker for reference representations. Only references become nullable through `Option`.
pub trait Reference: Expectable {}

/// Byte view capability of composite values.
///
/// `bytes` is the value's full in-memory representation for structural equality. Types that
/// carry a length-like field declare it through `length`, which enables `to_have_length`.
pub trait ByteView {
    fn bytes(&self) -> Cow<'_, [u8]>;

    fn length(&self) -> Option<usize> {
        None
    }
}

/// Buffer element of any width.
pub trait Element: Sized {
    /// Little-endian byte view of a run of elements.
    fn byte_view(items: &[Self]) -> Cow<'_, [u8]>;
}

impl Element for u8 {
    fn byte_view(items: &[Self]) -> Cow<'_, [u8]> {
        Cow::Borrowed(items)
    }
}

macro_rules! wide_element {
    ($($t:ty),* $(,)?) => {$(
        impl Element for $t {
            fn byte_view(items: &[Self]) -> Cow<'_, [u8]> {
                Cow::Owned(items.iter().flat_map(|v| v.to_le_bytes()).collect())
            }
        }
    )*};
}

wide_element!(i8, i16, u16, i32, u32, i64, u64, f32, f64);

macro_rules! integer_scalar {
    ($($t:ty),* $(,)?) => {$(
        impl Expectable for $t {
            const IS_REFERENCE: bool = false;

            fn shape(&self) -> Shape<'_> {
                Shape::Integer(*self as i128)
            }

            fn same(&self, other: &Self) -> bool {
                self == other
            }
        }
    )*};
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Expectable for bool {
    const IS_REFERENCE: bool = false;

    fn shape(&self) -> Shape<'_> {
        Shape::Integer(i128::from(*self))
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Expectable for char {
    const IS_REFERENCE: bool = false;

    fn shape(&self) -> Shape<'_> {
        Shape::Integer(i128::from(u32::from(*self)))
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Expectable for f64 {
    const IS_REFERENCE: bool = false;

    fn shape(&self) -> Shape<'_> {
        Shape::Float(*self)
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Expectable for f32 {
    const IS_REFERENCE: bool = false;

    fn shape(&self) -> Shape<'_> {
        Shape::Float(f64::from(*self))
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Expectable for &str {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        Shape::Str(self)
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Reference for &str {}

impl Expectable for String {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        Shape::Str(self.as_str())
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Reference for String {}

impl<E: Element> Expectable for &[E] {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        Shape::Buffer {
            len: self.len(),
            bytes: E::byte_view(self),
        }
    }

    fn same(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

impl<E: Element> Reference for &[E] {}

impl<E: Element> Expectable for &Vec<E> {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        Shape::Buffer {
            len: self.len(),
            bytes: E::byte_view(self.as_slice()),
        }
    }

    fn same(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

impl<E: Element> Reference for &Vec<E> {}

fn object_shape<T: ByteView + ?Sized>(value: &T) -> Shape<'_> {
    Shape::Object {
        bytes: value.bytes(),
        length: value.length(),
    }
}

impl<T: ByteView + ?Sized> Expectable for Rc<T> {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        object_shape(&**self)
    }

    fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ByteView + ?Sized> Reference for Rc<T> {}

impl<T: ByteView + ?Sized> Expectable for Arc<T> {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        object_shape(&**self)
    }

    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ByteView + ?Sized> Reference for Arc<T> {}

impl<T: ByteView + ?Sized> Expectable for Box<T> {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        object_shape(&**self)
    }

    fn same(&self, other: &Self) -> bool {
        std::ptr::eq(&**self, &**other)
    }
}

impl<T: ByteView + ?Sized> Reference for Box<T> {}

impl<T: Reference> Expectable for Option<T> {
    const IS_REFERENCE: bool = true;

    fn shape(&self) -> Shape<'_> {
        match self {
            None => Shape::Null,
            Some(value) => value.shape(),
        }
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same(b),
            _ => false,
        }
    }
}
