// File: crates/overlay-core/src/lib.rs
// Summary: Core library entry point; exports the annotation engine's public API.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod history;
pub mod label;
pub mod lod;
pub mod mapper;
pub mod scale;
pub mod shape;
pub mod storage;
pub mod store;
pub mod svg;
pub mod time;
pub mod types;

pub use config::OverlayConfig;
pub use error::{OverlayError, Result};
pub use geometry::{Axis, Bounds, Edge};
pub use label::{describe_drawing, Label, LabelConfig};
pub use lod::{CandleLike, LinePoint, Timed};
pub use mapper::{CoordinateMapper, MapperUpdate};
pub use scale::{TimeScale, ValueScale};
pub use shape::{DomainShape, Geometry, PixelShape, Shape, ShapeId, ShapeKind, ShapeStyle};
pub use storage::{FileStorage, MemoryStorage, ShapeStorage};
pub use store::{DrawPhase, DrawingState, DrawingStore, Scope, SubscriptionId, Tool};
pub use svg::{SvgDocument, SvgNode};
pub use time::{time_to_sec, CalendarDate, TimeInput};
pub use types::{DomainPoint, PxPoint};
