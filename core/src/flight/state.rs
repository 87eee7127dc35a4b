use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable fields of the flight record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightField {
    Perimeter,
    Area,
    Height,
    Radius,
}

impl FlightField {
    pub const ALL: [FlightField; 4] = [
        FlightField::Perimeter,
        FlightField::Area,
        FlightField::Height,
        FlightField::Radius,
    ];

    /// Name of the change event fired for this field.
    pub fn event_name(&self) -> &'static str {
        match self {
            FlightField::Perimeter => "perimeter_changed",
            FlightField::Area => "area_changed",
            FlightField::Height => "height_changed",
            FlightField::Radius => "radius_changed",
        }
    }
}

impl fmt::Display for FlightField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightField::Perimeter => "perimeter",
            FlightField::Area => "area",
            FlightField::Height => "height",
            FlightField::Radius => "radius",
        };
        f.write_str(name)
    }
}

/// Snapshot of the flight record. Meters and square meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Flight {
    pub perimeter: f64,
    pub area: f64,
    pub height: f64,
    pub radius: f64,
}

impl Flight {
    pub fn get(&self, field: FlightField) -> f64 {
        match field {
            FlightField::Perimeter => self.perimeter,
            FlightField::Area => self.area,
            FlightField::Height => self.height,
            FlightField::Radius => self.radius,
        }
    }

    fn slot(&mut self, field: FlightField) -> &mut f64 {
        match field {
            FlightField::Perimeter => &mut self.perimeter,
            FlightField::Area => &mut self.area,
            FlightField::Height => &mut self.height,
            FlightField::Radius => &mut self.radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type FlightListener = Box<dyn FnMut(FlightField, &Flight) + Send>;

struct Subscription {
    id: ListenerId,
    field: FlightField,
    listener: FlightListener,
}

/// Flight record with per-field change notification.
///
/// Every `set` notifies the listeners of that field, in subscription order,
/// even when the value is unchanged.
pub struct FlightState {
    flight: Flight,
    subscriptions: Vec<Subscription>,
    next_listener: u64,
}

impl FlightState {
    pub fn new() -> Self {
        Self {
            flight: Flight::default(),
            subscriptions: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn get(&self, field: FlightField) -> f64 {
        self.flight.get(field)
    }

    pub fn snapshot(&self) -> Flight {
        self.flight
    }

    pub fn set(&mut self, field: FlightField, value: f64) {
        *self.flight.slot(field) = value;
        let flight = self.flight;
        for subscription in self
            .subscriptions
            .iter_mut()
            .filter(|subscription| subscription.field == field)
        {
            (subscription.listener)(field, &flight);
        }
    }

    pub fn subscribe<F>(&mut self, field: FlightField, listener: F) -> ListenerId
    where
        F: FnMut(FlightField, &Flight) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.subscriptions.push(Subscription {
            id,
            field,
            listener: Box::new(listener),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    pub fn listener_count(&self, field: FlightField) -> usize {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.field == field)
            .count()
    }
}

impl Default for FlightState {
    fn default() -> Self {
        Self::new()
    }
}
