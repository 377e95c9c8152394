//! Parameterized minifloat codec.
//!
//! Converts between raw bit patterns and IEEE‑754‑style values for narrow
//! floating‑point layouts (FP8, FP6, FP4 and friends) whose exponent width,
//! mantissa width, bias and treatment of the maximum exponent are all
//! configurable.
//!
//! A layout is a [`FloatFormat`]; its [`SpecialValueMode`] decides what the
//! all-ones exponent means:
//!
//! | mode      | max exponent band                               |
//! |-----------|-------------------------------------------------|
//! | `ieee`    | mantissa 0 is ±Infinity, anything else NaN      |
//! | `all-nan` | always NaN                                      |
//! | `fn`      | only the all-ones mantissa is NaN               |
//! | `none`    | ordinary finite values                          |
//!
//! [`decode`] and [`encode`] are pure and total over their domains, so they
//! may be called from any number of threads at once.
//!
//! ```
//! use minifloat_codec::{DecodedValue, FloatFormat, decode, encode};
//!
//! let f8 = FloatFormat::F8E5M2;
//! assert_eq!(decode(0b0_01111_00, &f8).unwrap(), DecodedValue::Finite(1.0));
//! assert_eq!(encode(1.0, &f8), 0b0_01111_00);
//! ```

mod error;
pub use error::*;
mod format;
pub use format::*;
mod fields;
pub use fields::*;
mod decode;
pub use decode::{DecodedValue, decode};
mod encode;
pub use encode::*;
mod render;
pub use render::*;
mod validate;
pub use validate::*;
mod cli;
pub use cli::*;
