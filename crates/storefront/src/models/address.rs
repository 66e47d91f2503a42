//! Shipping address types.

use serde::{Deserialize, Serialize};

use afrovibz_core::AddressId;

/// A saved or order-attached shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Address lines for printing, skipping empty optional parts.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.full_name.clone(), self.line1.clone()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.trim().is_empty()) {
            lines.push(line2.to_string());
        }
        let locality = match self.postal_code.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(postal) => format!("{}, {} {}", self.city, self.region, postal),
            None => format!("{}, {}", self.city, self.region),
        };
        lines.push(locality);
        lines.push(self.country.clone());
        if !self.phone.is_empty() {
            lines.push(format!("Tel: {}", self.phone));
        }
        lines
    }
}

/// Address as submitted by a customer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AddressInput {
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: String,
    /// Make this the default address when saving.
    #[serde(default)]
    pub make_default: bool,
}

impl AddressInput {
    /// Check required fields.
    ///
    /// Contact fields are always required; street fields only when the
    /// address is used for delivery.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first missing field.
    pub fn validate(&self, require_street: bool) -> Result<(), String> {
        let mut required = vec![("full_name", &self.full_name), ("phone", &self.phone)];
        if require_street {
            required.extend([
                ("line1", &self.line1),
                ("city", &self.city),
                ("region", &self.region),
                ("country", &self.country),
            ]);
        }

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(format!("{field} is required")),
            None => Ok(()),
        }
    }

    /// Turn the input into an address with the given ID.
    #[must_use]
    pub fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            line1: self.line1.trim().to_string(),
            line2: self.line2.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            city: self.city.trim().to_string(),
            region: self.region.trim().to_string(),
            postal_code: self
                .postal_code
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            country: self.country.trim().to_string(),
            is_default: self.make_default,
        }
    }
}
