use crate::Message;
use dronecore::drawing::{Overlay, OverlayEdit, OverlayGeometry, OverlayId, OverlayType};
use dronecore::geometry::{compute_distance_between, compute_offset, LatLng, LatLngBounds, EARTH_RADIUS_M};
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Event, Point, Rectangle, Renderer, Size, Theme,
};
use std::f64::consts::PI;

/// Pick distance for handles, in pixels.
const HANDLE_RADIUS: f32 = 8.0;
const GRID_SPACING_M: f64 = 50.0;

/// Web-Mercator projection centred on the map center.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    world: f64,
    origin_x: f64,
    origin_y: f64,
}

fn world_xy(position: &LatLng, world: f64) -> (f64, f64) {
    let x = (position.lng + 180.0) / 360.0 * world;
    let sin = position.lat.to_radians().sin().clamp(-0.9999, 0.9999);
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * world;
    (x, y)
}

impl Projection {
    pub fn new(center: LatLng, zoom: u8, size: Size) -> Self {
        let world = 256.0 * 2f64.powi(zoom as i32);
        let (x, y) = world_xy(&center, world);
        Self {
            world,
            origin_x: x - size.width as f64 / 2.0,
            origin_y: y - size.height as f64 / 2.0,
        }
    }

    pub fn project(&self, position: &LatLng) -> Point {
        let (x, y) = world_xy(position, self.world);
        Point::new((x - self.origin_x) as f32, (y - self.origin_y) as f32)
    }

    pub fn unproject(&self, point: Point) -> LatLng {
        let x = point.x as f64 + self.origin_x;
        let y = point.y as f64 + self.origin_y;
        let n = PI - 2.0 * PI * y / self.world;
        LatLng::new(n.sinh().atan().to_degrees(), x / self.world * 360.0 - 180.0)
    }

    pub fn meters_per_pixel(&self, lat: f64) -> f64 {
        lat.to_radians().cos() * 2.0 * PI * EARTH_RADIUS_M / self.world
    }
}

fn pixel_distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn near(a: Point, b: Point) -> bool {
    pixel_distance(a, b) <= HANDLE_RADIUS
}

/// Ray-casting containment test in screen space.
fn contains(polygon: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn corners(bounds: &LatLngBounds) -> [LatLng; 4] {
    [
        bounds.south_west,
        bounds.north_west(),
        bounds.north_east,
        bounds.south_east(),
    ]
}

/// What the pointer picked up on press.
#[derive(Debug, Clone, Copy)]
pub enum Grab {
    Anchor(LatLng),
    Vertex(OverlayId, usize),
    /// Rectangle corner; carries the opposite, fixed corner.
    Corner(OverlayId, LatLng),
    RadiusHandle(OverlayId, LatLng),
    Marker(OverlayId),
    Body(OverlayId, LatLng),
}

#[derive(Debug, Default)]
pub struct Interaction {
    grab: Option<Grab>,
    cursor: Option<Point>,
}

/// Map surface: renders overlays and turns pointer gestures into messages.
pub struct MapCanvas {
    pub center: LatLng,
    pub zoom: u8,
    pub tool: Option<OverlayType>,
    pub overlays: Vec<Overlay>,
    pub pending: Vec<LatLng>,
    /// Blocks input while an alert is shown.
    pub locked: bool,
}

impl MapCanvas {
    fn hit_test(&self, projection: &Projection, point: Point) -> Option<Grab> {
        let at = projection.unproject(point);

        for overlay in &self.overlays {
            if let OverlayGeometry::Marker { position } = overlay.geometry() {
                if near(projection.project(position), point) {
                    return Some(Grab::Marker(overlay.id()));
                }
            }
        }

        for overlay in &self.overlays {
            let id = overlay.id();
            match overlay.geometry() {
                OverlayGeometry::Polygon { path } => {
                    if let Some(index) = path
                        .iter()
                        .position(|vertex| near(projection.project(vertex), point))
                    {
                        return Some(Grab::Vertex(id, index));
                    }
                    let screen: Vec<Point> = path.iter().map(|v| projection.project(v)).collect();
                    if contains(&screen, point) {
                        return Some(Grab::Body(id, at));
                    }
                }
                OverlayGeometry::Rectangle { bounds } => {
                    let ring = corners(bounds);
                    if let Some(index) = ring
                        .iter()
                        .position(|corner| near(projection.project(corner), point))
                    {
                        return Some(Grab::Corner(id, ring[(index + 2) % 4]));
                    }
                    let screen: Vec<Point> = ring.iter().map(|c| projection.project(c)).collect();
                    if contains(&screen, point) {
                        return Some(Grab::Body(id, at));
                    }
                }
                OverlayGeometry::Circle { center, radius } => {
                    let handle = compute_offset(center, *radius, 90.0);
                    if near(projection.project(&handle), point) {
                        return Some(Grab::RadiusHandle(id, *center));
                    }
                    if compute_distance_between(center, &at) <= *radius {
                        return Some(Grab::Body(id, at));
                    }
                }
                OverlayGeometry::Marker { .. } => {}
            }
        }
        None
    }

    fn release(&self, grab: Grab, at: LatLng) -> Option<Message> {
        match grab {
            Grab::Anchor(anchor) => match self.tool {
                Some(OverlayType::Circle) => Some(Message::CircleDrawn {
                    center: anchor,
                    radius: compute_distance_between(&anchor, &at),
                }),
                Some(OverlayType::Rectangle) => Some(Message::RectangleDrawn(anchor, at)),
                _ => None,
            },
            Grab::Vertex(id, index) => Some(Message::Edit(
                id,
                OverlayEdit::SetVertex {
                    index,
                    position: at,
                },
            )),
            Grab::Corner(id, fixed) => Some(Message::Edit(
                id,
                OverlayEdit::SetBounds {
                    bounds: LatLngBounds::from_corners(fixed, at),
                },
            )),
            Grab::RadiusHandle(id, center) => Some(Message::Edit(
                id,
                OverlayEdit::SetRadius {
                    radius: compute_distance_between(&center, &at),
                },
            )),
            Grab::Marker(id) => Some(Message::Edit(id, OverlayEdit::SetPosition { position: at })),
            Grab::Body(id, start) => Some(Message::Dragged(id, at.lat - start.lat, at.lng - start.lng)),
        }
    }

    fn draw_grid(&self, frame: &mut Frame, projection: &Projection, bounds: Rectangle) {
        let spacing = (GRID_SPACING_M / projection.meters_per_pixel(self.center.lat)) as f32;
        if !spacing.is_finite() || spacing < 8.0 {
            return;
        }
        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let grid = Path::new(|builder| {
            let mut offset = center.x % spacing;
            while offset < bounds.width {
                builder.move_to(Point::new(offset, 0.0));
                builder.line_to(Point::new(offset, bounds.height));
                offset += spacing;
            }
            let mut offset = center.y % spacing;
            while offset < bounds.height {
                builder.move_to(Point::new(0.0, offset));
                builder.line_to(Point::new(bounds.width, offset));
                offset += spacing;
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.16, 0.18, 0.2)),
        );

        let crosshair = Path::new(|builder| {
            builder.move_to(Point::new(center.x - 6.0, center.y));
            builder.line_to(Point::new(center.x + 6.0, center.y));
            builder.move_to(Point::new(center.x, center.y - 6.0));
            builder.line_to(Point::new(center.x, center.y + 6.0));
        });
        frame.stroke(
            &crosshair,
            Stroke::default().with_color(Color::from_rgb(0.5, 0.5, 0.55)),
        );
    }

    fn draw_overlay(&self, frame: &mut Frame, projection: &Projection, overlay: &Overlay) {
        let stroke = Stroke::default()
            .with_width(2.5)
            .with_color(Color::from_rgb(0.2, 0.75, 0.3));
        let fill = Color::from_rgba(0.2, 0.75, 0.3, 0.15);
        let handle = Color::from_rgb(0.95, 0.95, 0.95);

        match overlay.geometry() {
            OverlayGeometry::Circle { center, radius } => {
                let pixels = (*radius / projection.meters_per_pixel(center.lat)) as f32;
                if !pixels.is_finite() {
                    return;
                }
                let path = Path::circle(projection.project(center), pixels.max(0.0));
                frame.fill(&path, fill);
                frame.stroke(&path, stroke);
                let edge = projection.project(&compute_offset(center, *radius, 90.0));
                frame.fill(&Path::circle(edge, 4.0), handle);
            }
            OverlayGeometry::Rectangle { bounds } => {
                let ring: Vec<Point> = corners(bounds).iter().map(|c| projection.project(c)).collect();
                draw_ring(frame, &ring, stroke, fill, handle);
            }
            OverlayGeometry::Polygon { path } => {
                let ring: Vec<Point> = path.iter().map(|v| projection.project(v)).collect();
                draw_ring(frame, &ring, stroke, fill, handle);
            }
            OverlayGeometry::Marker { position } => {
                let point = projection.project(position);
                frame.fill(&Path::circle(point, 6.0), Color::from_rgb(0.95, 0.35, 0.25));
                frame.stroke(
                    &Path::circle(point, 6.0),
                    Stroke::default().with_color(Color::WHITE),
                );
            }
        }
    }

    fn draw_preview(&self, frame: &mut Frame, projection: &Projection, interaction: &Interaction) {
        let preview = Stroke::default()
            .with_width(1.5)
            .with_color(Color::from_rgb(0.95, 0.8, 0.3));

        if !self.pending.is_empty() {
            let points: Vec<Point> = self.pending.iter().map(|v| projection.project(v)).collect();
            let path = Path::new(|builder| {
                builder.move_to(points[0]);
                for point in &points[1..] {
                    builder.line_to(*point);
                }
                if let Some(cursor) = interaction.cursor {
                    builder.line_to(cursor);
                }
            });
            frame.stroke(&path, preview);
            for point in points {
                frame.fill(&Path::circle(point, 3.0), Color::WHITE);
            }
        }

        let (Some(grab), Some(cursor)) = (interaction.grab, interaction.cursor) else {
            return;
        };
        let at = projection.unproject(cursor);
        match (grab, self.tool) {
            (Grab::Anchor(anchor), Some(OverlayType::Circle)) => {
                let center = projection.project(&anchor);
                frame.stroke(&Path::circle(center, pixel_distance(center, cursor)), preview);
            }
            (Grab::Anchor(anchor), Some(OverlayType::Rectangle)) => {
                let bounds = LatLngBounds::from_corners(anchor, at);
                let ring: Vec<Point> = corners(&bounds).iter().map(|c| projection.project(c)).collect();
                frame.stroke(&closed_path(&ring), preview);
            }
            (Grab::Body(_, start), _) => {
                let line = Path::line(projection.project(&start), cursor);
                frame.stroke(&line, preview);
            }
            _ => {
                frame.fill(&Path::circle(cursor, 4.0), Color::from_rgb(0.95, 0.8, 0.3));
            }
        }
    }
}

fn closed_path(points: &[Point]) -> Path {
    Path::new(|builder| {
        if let Some(first) = points.first() {
            builder.move_to(*first);
            for point in &points[1..] {
                builder.line_to(*point);
            }
            builder.close();
        }
    })
}

fn draw_ring(frame: &mut Frame, ring: &[Point], stroke: Stroke<'_>, fill: Color, handle: Color) {
    let path = closed_path(ring);
    frame.fill(&path, fill);
    frame.stroke(&path, stroke);
    for point in ring {
        frame.fill(&Path::rectangle(Point::new(point.x - 3.0, point.y - 3.0), Size::new(6.0, 6.0)), handle);
    }
}

impl canvas::Program<Message> for MapCanvas {
    type State = Interaction;

    fn update(
        &self,
        interaction: &mut Interaction,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if self.locked {
            return None;
        }
        let projection = Projection::new(self.center, self.zoom, bounds.size());

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let point = cursor.position_in(bounds)?;
                let at = projection.unproject(point);
                match self.tool {
                    Some(OverlayType::Polygon) => {
                        let closes = self.pending.len() >= 3
                            && self
                                .pending
                                .first()
                                .map(|first| near(projection.project(first), point))
                                .unwrap_or(false);
                        let message = if closes {
                            Message::FinishPolygon
                        } else {
                            Message::VertexAdded(at)
                        };
                        Some(canvas::Action::publish(message).and_capture())
                    }
                    Some(OverlayType::Marker) => {
                        Some(canvas::Action::publish(Message::MarkerPlaced(at)).and_capture())
                    }
                    Some(_) => {
                        interaction.grab = Some(Grab::Anchor(at));
                        interaction.cursor = Some(point);
                        Some(canvas::Action::request_redraw().and_capture())
                    }
                    None => {
                        interaction.grab = Some(self.hit_test(&projection, point)?);
                        interaction.cursor = Some(point);
                        Some(canvas::Action::request_redraw().and_capture())
                    }
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if interaction.grab.is_some() || !self.pending.is_empty() {
                    interaction.cursor = cursor.position_in(bounds);
                    Some(canvas::Action::request_redraw())
                } else {
                    None
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let grab = interaction.grab.take()?;
                interaction.cursor = None;
                let point = cursor.position_in(bounds)?;
                let message = self.release(grab, projection.unproject(point))?;
                Some(canvas::Action::publish(message).and_capture())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        interaction: &Interaction,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::from_rgb(0.07, 0.08, 0.09));

        let projection = Projection::new(self.center, self.zoom, bounds.size());
        self.draw_grid(&mut frame, &projection, bounds);
        for overlay in &self.overlays {
            self.draw_overlay(&mut frame, &projection, overlay);
        }
        self.draw_preview(&mut frame, &projection, interaction);

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        interaction: &Interaction,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if interaction.grab.is_some() {
            mouse::Interaction::Grabbing
        } else if self.tool.is_some() && cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_round_trips_through_pixels() {
        let center = LatLng::new(37.792, -122.403);
        let projection = Projection::new(center, 17, Size::new(800.0, 600.0));

        let middle = projection.project(&center);
        assert!((middle.x - 400.0).abs() < 1e-3);
        assert!((middle.y - 300.0).abs() < 1e-3);

        let back = projection.unproject(Point::new(120.0, 80.0));
        let again = projection.project(&back);
        assert!((again.x - 120.0).abs() < 1e-2);
        assert!((again.y - 80.0).abs() < 1e-2);
    }

    #[test]
    fn contains_detects_inside_points() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(contains(&square, Point::new(5.0, 5.0)));
        assert!(!contains(&square, Point::new(15.0, 5.0)));
        assert!(!contains(&[], Point::new(0.0, 0.0)));
    }
}
