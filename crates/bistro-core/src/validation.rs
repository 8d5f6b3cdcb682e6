//! # Validation Module
//!
//! Input shape checks run before any repository is consulted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport adapter (out of this workspace)                    │
//! │  └── Deserialization of primitive shapes                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── ids are UUIDs, quantities in range, notes bounded                 │
//! │  └── Failures are ValidationError → InvalidArgument                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Domain rules (order, selection, payment modules)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Storage                                                      │
//! │  └── Partial UNIQUE indexes (single draft, idempotency key)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::validation::{validate_quantity, validate_uuid};
//!
//! assert!(validate_uuid("order_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::{MAX_IDEMPOTENCY_KEY_LENGTH, MAX_ITEM_QUANTITY, MAX_NOTE_LENGTH, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates that `id` is a UUID, naming `field` in the error.
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_uuid;
///
/// assert!(validate_uuid("item_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("item_id", "not-a-uuid").is_err());
/// assert!(validate_uuid("item_id", "  ").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item / Change Quantity                                       │
/// │                                                                         │
/// │  validate_quantity(qty) ← THIS FUNCTION                                │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → "quantity must be positive"                     │
/// │       ├── qty > 999? → "quantity must be between 1 and 999"            │
/// │       └── OK → resolve catalog, merge, reprice                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_quantity_field("quantity", qty)
}

/// Same rules as [`validate_quantity`] with a custom field name.
pub fn validate_quantity_field(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a catalog price in cents. Zero is allowed (free sauce).
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("base_price", 3990).is_ok());
/// assert!(validate_price_cents("base_price", 0).is_ok());
/// assert!(validate_price_cents("base_price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a group's min/max pair. `max == 0` means unbounded.
pub fn validate_select_bounds(min_select: i64, max_select: i64) -> ValidationResult<()> {
    if min_select < 0 {
        return Err(ValidationError::OutOfRange {
            field: "min_select".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    if max_select < 0 || (max_select > 0 && max_select < min_select) {
        return Err(ValidationError::OutOfRange {
            field: "max_select".to_string(),
            min: min_select,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in an order holding `current_lines`.
pub fn validate_order_lines(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "order lines".to_string(),
            min: 0,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Text Validators
// =============================================================================

/// Trims a line note and bounds its length.
///
/// ## Returns
/// The trimmed note; an empty note is valid.
pub fn validate_note(note: &str) -> ValidationResult<String> {
    let note = note.trim();

    if note.chars().count() > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LENGTH,
        });
    }

    Ok(note.to_string())
}

/// Normalises an optional idempotency key.
///
/// Blank keys are treated as absent.
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_idempotency_key;
///
/// assert_eq!(validate_idempotency_key(Some("  k-1 ")).unwrap(), Some("k-1".to_string()));
/// assert_eq!(validate_idempotency_key(Some("   ")).unwrap(), None);
/// assert_eq!(validate_idempotency_key(None).unwrap(), None);
/// ```
pub fn validate_idempotency_key(key: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(None);
    };

    if key.len() > MAX_IDEMPOTENCY_KEY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "idempotency_key".to_string(),
            max: MAX_IDEMPOTENCY_KEY_LENGTH,
        });
    }

    Ok(Some(key.to_string()))
}

/// Validates an ISO 4217 style currency code (three ASCII uppercase letters).
pub fn validate_currency(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be three uppercase letters".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
