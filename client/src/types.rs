//! Domain types shared by the API client and the views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque event identifier assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new event id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An event as served by `GET /event` and `GET /event/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Backend identifier
    pub id: EventId,
    /// Display title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue
    pub location: String,
    /// Tickets available when the event was fetched
    pub total_tickets: u32,
    /// Ticket price
    #[serde(deserialize_with = "non_negative_price")]
    pub price: f64,
    /// Optional image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Event {
    /// Case-insensitive substring match against title, description and location
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.location]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = f64::deserialize(deserializer)?;
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(serde::de::Error::custom(format!(
            "price must be a non-negative number, got {price}"
        )))
    }
}

/// Number of tickets to book, always at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// The smallest bookable quantity
    pub const MIN: Self = Self(1);

    /// Create a quantity, raising zero to one
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self::MIN } else { Self(value) }
    }

    /// Interpret free-form input the way a number field does
    ///
    /// The leading integer of `text` is used (`"3 tickets"` is 3). Input
    /// without one, and zero or negative values, yield 1. Values beyond
    /// `u32::MAX` saturate.
    #[must_use]
    pub fn from_input(text: &str) -> Self {
        let trimmed = text.trim_start();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        let digits = &unsigned[..end];

        if negative || digits.is_empty() {
            return Self::MIN;
        }

        Self::new(digits.parse().unwrap_or(u32::MAX))
    }

    /// The quantity as a plain number
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            Err("quantity must be at least 1".to_string())
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

/// Body of `POST /ticket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Event to book
    pub event_id: EventId,
    /// Number of tickets
    pub quantity: Quantity,
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier
    pub id: String,
    /// Login email
    pub email: String,
    /// Grants access to the admin page
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

impl User {
    /// Create a user, deriving the id from the email
    #[must_use]
    pub fn new(email: impl Into<String>, is_admin: bool) -> Self {
        let email = email.into();
        Self {
            id: email.clone(),
            email,
            is_admin,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quantity_from_input() {
        assert_eq!(Quantity::from_input("3").get(), 3);
        assert_eq!(Quantity::from_input("abc").get(), 1);
        assert_eq!(Quantity::from_input("-5").get(), 1);
        assert_eq!(Quantity::from_input("0").get(), 1);
        assert_eq!(Quantity::from_input("").get(), 1);
        assert_eq!(Quantity::from_input("  12").get(), 12);
        assert_eq!(Quantity::from_input("3 tickets").get(), 3);
        assert_eq!(Quantity::from_input("2.9").get(), 2);
        assert_eq!(Quantity::from_input("+4").get(), 4);
        assert_eq!(Quantity::from_input("99999999999").get(), u32::MAX);
    }

    #[test]
    fn test_quantity_rejects_zero_on_the_wire() {
        assert!(serde_json::from_value::<Quantity>(json!(0)).is_err());
        assert_eq!(
            serde_json::from_value::<Quantity>(json!(2)).ok(),
            Some(Quantity::new(2))
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event: Event = serde_json::from_value(json!({
            "id": "1",
            "title": "Jazz Night",
            "description": "Smooth tunes",
            "date": "2025-06-01T20:00:00Z",
            "location": "Blue Hall",
            "totalTickets": 120,
            "price": 35.5
        }))
        .unwrap();

        assert_eq!(event.id, EventId::new("1"));
        assert_eq!(event.total_tickets, 120);
        assert_eq!(event.image_url, None);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["totalTickets"], 120);
        assert!(value.get("imageUrl").is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = serde_json::from_value::<Event>(json!({
            "id": "1",
            "title": "t",
            "description": "d",
            "date": "2025-06-01T20:00:00Z",
            "location": "l",
            "totalTickets": 1,
            "price": -1.0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_booking_request_body() {
        let request = BookingRequest {
            event_id: EventId::new("42"),
            quantity: Quantity::new(3),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "event_id": "42", "quantity": 3 })
        );
    }

    #[test]
    fn test_user_admin_flag() {
        let user: User =
            serde_json::from_value(json!({ "id": "u1", "email": "a@b.c", "isAdmin": true }))
                .unwrap();
        assert!(user.is_admin);
    }

    #[test]
    fn test_event_matches_any_field() {
        let event = Event {
            id: EventId::new("1"),
            title: "Jazz Night".into(),
            description: "Smooth tunes".into(),
            date: DateTime::<Utc>::UNIX_EPOCH,
            location: "Blue Hall".into(),
            total_tickets: 10,
            price: 0.0,
            image_url: None,
        };
        assert!(event.matches("jazz"));
        assert!(event.matches("tunes"));
        assert!(event.matches("blue"));
        assert!(!event.matches("rock"));
    }
}
