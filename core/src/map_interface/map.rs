use crate::drawing::overlay::{Overlay, OverlayId, OverlayType};
use crate::geometry::LatLng;

/// Map widget hosting the drawn overlays.
pub trait MapHost {
    fn center(&self) -> LatLng;
    fn set_center(&mut self, center: LatLng);
    fn zoom(&self) -> u8;
    fn attach_overlay(&mut self, overlay: &Overlay);
    fn detach_overlay(&mut self, id: OverlayId);
    /// Called whenever the geometry of an attached overlay changes.
    fn refresh_overlay(&mut self, overlay: &Overlay);
    fn set_drawing_mode(&mut self, mode: Option<OverlayType>);
}

/// In-memory map that mirrors what a rendering front end would display.
#[derive(Debug, Clone)]
pub struct MapView {
    center: LatLng,
    zoom: u8,
    overlays: Vec<Overlay>,
    drawing_mode: Option<OverlayType>,
}

impl MapView {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            overlays: Vec::new(),
            drawing_mode: None,
        }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|overlay| overlay.id() == id)
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn drawing_mode(&self) -> Option<OverlayType> {
        self.drawing_mode
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }
}

impl MapHost for MapView {
    fn center(&self) -> LatLng {
        self.center
    }

    fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn attach_overlay(&mut self, overlay: &Overlay) {
        self.detach_overlay(overlay.id());
        self.overlays.push(overlay.clone());
    }

    fn detach_overlay(&mut self, id: OverlayId) {
        self.overlays.retain(|overlay| overlay.id() != id);
    }

    fn refresh_overlay(&mut self, overlay: &Overlay) {
        if let Some(slot) = self
            .overlays
            .iter_mut()
            .find(|existing| existing.id() == overlay.id())
        {
            *slot = overlay.clone();
        }
    }

    fn set_drawing_mode(&mut self, mode: Option<OverlayType>) {
        self.drawing_mode = mode;
    }
}
