pub mod adapter;
pub mod controller;
pub mod overlay;

pub use adapter::{area, bounds_to_path, perimeter};
pub use controller::{Completion, DrawingController, DrawingState, EditOutcome, SharedDisplay};
pub use overlay::{
    EditSignal, Overlay, OverlayEdit, OverlayGeometry, OverlayId, OverlayOptions, OverlayType,
    Shape,
};
