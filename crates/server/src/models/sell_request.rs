//! Sell request domain types.
//!
//! A seller (no account needed) proposes an item for the platform to buy.
//! Staff then review it, moving it through [`SellRequestStatus`].
//!
//! Two payload types arrive over HTTP:
//!
//! - [`CreateSellRequest`] - flat public form, validated into [`NewSellRequest`]
//! - [`UpdateSellRequest`] - admin patch, validated into [`SellRequestPatch`]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use bazaar_core::{SellRequestId, SellRequestStatus};

/// Default page size for admin listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page an admin listing will return.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Decimal places an asking price may carry (the column is `NUMERIC(12, 2)`).
pub const ASKING_PRICE_SCALE: u32 = 2;

/// Asking prices must be strictly below this many major units.
pub const ASKING_PRICE_LIMIT: i64 = 10_000_000_000;

/// Who submitted the request. All contact fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// What is being offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    /// Short item name, e.g. "bottle".
    pub name: String,
    pub quantity: i32,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    /// Seller's asking price per unit, in major currency units.
    pub asking_price: Option<Decimal>,
}

/// A stored sell request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellRequest {
    pub id: SellRequestId,
    pub submitter: Submitter,
    pub item: ItemDetails,
    pub status: SellRequestStatus,
    /// Internal notes; only admins ever see sell requests.
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated submission, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSellRequest {
    pub submitter: Submitter,
    pub item: ItemDetails,
}

/// Admin listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellRequestFilter {
    pub status: Option<SellRequestStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SellRequestFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl SellRequestFilter {
    /// Whether a record passes the status filter.
    #[must_use]
    pub fn matches(&self, request: &SellRequest) -> bool {
        self.status.is_none_or(|status| request.status == status)
    }
}

/// Admin listing query string: `?status=approved&limit=20&offset=40`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellRequestQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SellRequestQuery {
    /// Parse into a filter. `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns field errors for an unknown status or a negative offset.
    pub fn into_filter(self) -> Result<SellRequestFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => raw.parse::<SellRequestStatus>().map_or_else(
                |_| {
                    errors.add("status", status_error());
                    None
                },
                Some,
            ),
        };

        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            let mut err = ValidationError::new("range");
            err.message = Some("offset cannot be negative".into());
            errors.add("offset", err);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SellRequestFilter {
            status,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset,
        })
    }
}

// =============================================================================
// Inbound Payloads
// =============================================================================

/// Public sell form.
///
/// Every field is optional at the serde level so that a missing `item` or
/// `qty` is reported as a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateSellRequest {
    #[validate(
        required(message = "item is required"),
        length(min = 1, max = 200, message = "item must be 1-200 characters")
    )]
    pub item: Option<String>,

    #[serde(alias = "quantity")]
    #[validate(
        required(message = "qty is required"),
        range(min = 1, max = 100_000, message = "qty must be between 1 and 100000")
    )]
    pub qty: Option<i64>,

    #[validate(length(max = 120, message = "name must be at most 120 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(length(max = 80, message = "category must be at most 80 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 80, message = "condition must be at most 80 characters"))]
    pub condition: Option<String>,

    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_asking_price"))]
    pub asking_price: Option<Decimal>,
}

impl CreateSellRequest {
    /// Trim text fields and validate.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors if any rule fails.
    pub fn into_new(self) -> Result<NewSellRequest, ValidationErrors> {
        let normalized = Self {
            item: clean(self.item),
            qty: self.qty,
            name: clean(self.name),
            email: clean(self.email),
            phone: clean(self.phone),
            category: clean(self.category),
            condition: clean(self.condition),
            description: clean(self.description),
            asking_price: self.asking_price,
        };
        normalized.validate()?;

        let (Some(name), Some(qty)) = (normalized.item, normalized.qty) else {
            // `required` above guarantees both are present
            return Err(ValidationErrors::new());
        };
        let quantity = to_quantity(qty)?;

        Ok(NewSellRequest {
            submitter: Submitter {
                name: normalized.name,
                email: normalized.email,
                phone: normalized.phone,
            },
            item: ItemDetails {
                name,
                quantity,
                category: normalized.category,
                condition: normalized.condition,
                description: normalized.description,
                asking_price: normalized.asking_price,
            },
        })
    }
}

/// Admin patch. Absent fields are left untouched; a blank string clears an
/// optional text field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSellRequest {
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    #[validate(length(min = 1, max = 200, message = "item must be 1-200 characters"))]
    pub item: Option<String>,

    #[serde(alias = "quantity")]
    #[validate(range(min = 1, max = 100_000, message = "qty must be between 1 and 100000"))]
    pub qty: Option<i64>,

    #[validate(length(max = 80, message = "category must be at most 80 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 80, message = "condition must be at most 80 characters"))]
    pub condition: Option<String>,

    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_asking_price"))]
    pub asking_price: Option<Decimal>,

    #[validate(length(max = 4000, message = "admin_notes must be at most 4000 characters"))]
    pub admin_notes: Option<String>,
}

impl UpdateSellRequest {
    /// Validate into a typed patch.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors if any rule fails.
    pub fn into_patch(self) -> Result<SellRequestPatch, ValidationErrors> {
        let item = self.item.map(|s| s.trim().to_string());
        let normalized = Self {
            item: item.clone(),
            ..self
        };
        normalized.validate()?;

        let status = match normalized.status.as_deref() {
            Some(raw) => Some(raw.parse::<SellRequestStatus>().map_err(|_| {
                // validate_status already ran; keep the error shape regardless
                let mut errors = ValidationErrors::new();
                errors.add("status", status_error());
                errors
            })?),
            None => None,
        };

        Ok(SellRequestPatch {
            status,
            item,
            quantity: normalized.qty.map(to_quantity).transpose()?,
            category: normalized.category.map(clean_or_clear),
            condition: normalized.condition.map(clean_or_clear),
            description: normalized.description.map(clean_or_clear),
            asking_price: normalized.asking_price,
            admin_notes: normalized.admin_notes.map(clean_or_clear),
        })
    }
}

/// A validated set of changes.
///
/// For the optional text fields, the outer `Option` says whether the field
/// is being changed and the inner one is the new value (`None` clears it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellRequestPatch {
    pub status: Option<SellRequestStatus>,
    pub item: Option<String>,
    pub quantity: Option<i32>,
    pub category: Option<Option<String>>,
    pub condition: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub asking_price: Option<Decimal>,
    pub admin_notes: Option<Option<String>>,
}

impl SellRequestPatch {
    /// Apply the patch in place.
    ///
    /// The status transition is checked before anything is written, so on
    /// error `request` is unchanged.
    ///
    /// # Errors
    ///
    /// Returns a message if the status transition is not allowed.
    pub fn apply(&self, request: &mut SellRequest, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(next) = self.status
            && !request.status.can_transition_to(next)
        {
            return Err(format!(
                "cannot move sell request from {} to {next}",
                request.status
            ));
        }

        if let Some(status) = self.status {
            request.status = status;
        }
        if let Some(name) = &self.item {
            request.item.name.clone_from(name);
        }
        if let Some(quantity) = self.quantity {
            request.item.quantity = quantity;
        }
        if let Some(category) = &self.category {
            request.item.category.clone_from(category);
        }
        if let Some(condition) = &self.condition {
            request.item.condition.clone_from(condition);
        }
        if let Some(description) = &self.description {
            request.item.description.clone_from(description);
        }
        if let Some(price) = self.asking_price {
            request.item.asking_price = Some(price);
        }
        if let Some(notes) = &self.admin_notes {
            request.admin_notes.clone_from(notes);
        }
        request.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

/// Trim; blank becomes `None`.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trim a present value; blank means "clear".
fn clean_or_clear(value: String) -> Option<String> {
    clean(Some(value))
}

/// `qty` is range-checked by `validator` first; this only narrows the type.
fn to_quantity(qty: i64) -> Result<i32, ValidationErrors> {
    i32::try_from(qty).map_err(|_| {
        let mut err = ValidationError::new("range");
        err.message = Some("qty must be between 1 and 100000".into());
        let mut errors = ValidationErrors::new();
        errors.add("qty", err);
        errors
    })
}

fn validate_asking_price(value: &Decimal) -> Result<(), ValidationError> {
    let message = if value.is_sign_negative() && !value.is_zero() {
        "asking_price cannot be negative"
    } else if value.normalize().scale() > ASKING_PRICE_SCALE {
        "asking_price has more than 2 decimal places"
    } else if *value >= Decimal::from(ASKING_PRICE_LIMIT) {
        "asking_price must be less than 10000000000"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("asking_price");
    err.message = Some(message.into());
    Err(err)
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    if !allowed || !(7..=15).contains(&digits) {
        let mut err = ValidationError::new("phone");
        err.message = Some("phone must contain 7-15 digits".into());
        return Err(err);
    }
    Ok(())
}

fn status_error() -> ValidationError {
    let mut err = ValidationError::new("status");
    err.message = Some(
        "status must be one of submitted, reviewed, approved, rejected, completed".into(),
    );
    err
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<SellRequestStatus>()
        .map(|_| ())
        .map_err(|_| status_error())
}
