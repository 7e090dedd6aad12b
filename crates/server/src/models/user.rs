//! User, address and shipping profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kisan_suraksha_core::{AddressId, Email, ShippingMode, UserId};

/// An account as stored (password hash excluded).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user shape embedded in auth responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

/// A saved address.
///
/// At most one address per user has `is_default = true`; the repository
/// maintains this inside a transaction and a partial unique index backs it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub label: String,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Address fields as submitted by the client.
///
/// Used both for saved addresses and for the shipping address attached to
/// an order; [`AddressInput::normalized`] is the single validation point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A validated, trimmed shipping address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub label: String,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

impl AddressInput {
    /// Validate and normalize the input.
    ///
    /// Required fields: full name, phone, line1, city, state, pincode.
    /// Country defaults to India when blank.
    ///
    /// # Errors
    ///
    /// Returns the camelCase name of the first missing field, suitable for
    /// a client-facing `Missing <field>` message.
    pub fn normalized(&self) -> Result<ShippingAddress, &'static str> {
        let required: [(&'static str, &str); 6] = [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(field);
            }
        }

        let country = self.country.trim();
        Ok(ShippingAddress {
            label: self.label.trim().to_owned(),
            full_name: self.full_name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            line1: self.line1.trim().to_owned(),
            line2: self.line2.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            pincode: self.pincode.trim().to_owned(),
            country: if country.is_empty() {
                "India".to_owned()
            } else {
                country.to_owned()
            },
        })
    }
}

/// Last-used shipping details, cached per user at checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingProfile {
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub shipping_mode: ShippingMode,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_input() -> AddressInput {
        AddressInput {
            full_name: " Asha Patil ".to_owned(),
            phone: "9876543210".to_owned(),
            line1: "14 Main Road".to_owned(),
            city: "Nashik".to_owned(),
            state: "Maharashtra".to_owned(),
            pincode: "422001".to_owned(),
            ..AddressInput::default()
        }
    }

    #[test]
    fn test_normalized_trims_and_defaults_country() {
        let addr = full_input().normalized().unwrap();
        assert_eq!(addr.full_name, "Asha Patil");
        assert_eq!(addr.country, "India");
        assert_eq!(addr.line2, "");
    }

    #[test]
    fn test_missing_required_field_names_the_field() {
        let mut input = full_input();
        input.pincode = "  ".to_owned();
        assert_eq!(input.normalized().unwrap_err(), "pincode");

        let mut input = full_input();
        input.full_name = String::new();
        assert_eq!(input.normalized().unwrap_err(), "fullName");
    }

    #[test]
    fn test_explicit_country_kept() {
        let mut input = full_input();
        input.country = "Nepal".to_owned();
        assert_eq!(input.normalized().unwrap().country, "Nepal");
    }
}
