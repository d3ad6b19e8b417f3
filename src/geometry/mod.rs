//! Geometric value types shared by the guide and scoring pipelines.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: detector boxes carry a coordinate-space marker
//!    ([`Pixel`] or [`Normalized`]) so that fractions are never measured
//!    against pixel-space guide points.
//!
//! 2. **Value Objects**: everything here is constructed fresh per image and
//!    never mutated after construction.
//!
//! # Example
//!
//! ```
//! use composure::geometry::{BBoxXYXY, Detection, Pixel, Point};
//!
//! let det = Detection::new("dog", 0.97, BBoxXYXY::<Pixel>::from_xyxy(100.0, 50.0, 300.0, 250.0));
//! assert_eq!(det.bbox.center(), Point::new(200.0, 150.0));
//! ```

mod bbox;
mod detection;
pub mod io_json;
mod point;

pub use bbox::{BBoxXYXY, Normalized, Pixel};
pub use detection::{BoxUnits, Detection, RawBox, RawDetection};
pub use point::Point;
