//! Payment methods and contact-field validation.
//!
//! Three wallet rails (JazzCash, EasyPaisa, NayaPay) require a phone
//! number; Stripe requires the four card fields. Validation is presence
//! only - no format, Luhn, or expiry checks - matching the marketplace's
//! current behavior.

use serde::{Deserialize, Serialize};

use super::CheckoutError;

/// A supported payment rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    JazzCash,
    EasyPaisa,
    NayaPay,
    Stripe,
}

/// What a method needs before authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRequirement {
    /// Wallet rails: a phone number to push the payment prompt to.
    Phone,
    /// Card rails: holder name, number, expiry, and CVC.
    Card,
}

impl PaymentMethod {
    /// All methods, in the order the checkout page lists them.
    pub const ALL: [Self; 4] = [Self::JazzCash, Self::EasyPaisa, Self::NayaPay, Self::Stripe];

    /// The preselected method: the first one flagged popular.
    #[must_use]
    pub fn default_method() -> Self {
        Self::ALL
            .into_iter()
            .find(|method| method.popular())
            .unwrap_or(Self::JazzCash)
    }

    /// Stable identifier used in URLs and the API.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::JazzCash => "jazzcash",
            Self::EasyPaisa => "easypaisa",
            Self::NayaPay => "nayapay",
            Self::Stripe => "stripe",
        }
    }

    /// Display name for the selection card.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::JazzCash => "JazzCash",
            Self::EasyPaisa => "EasyPaisa",
            Self::NayaPay => "NayaPay",
            Self::Stripe => "Credit / Debit Card",
        }
    }

    /// One-line description under the name.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::JazzCash => "Instant mobile wallet payment",
            Self::EasyPaisa => "Secure mobile account transfer",
            Self::NayaPay => "Fast digital wallet payment",
            Self::Stripe => "Secure payment via Stripe",
        }
    }

    /// Whether the method carries the "Popular" badge.
    #[must_use]
    pub const fn popular(self) -> bool {
        matches!(self, Self::JazzCash)
    }

    /// The fields this method requires.
    #[must_use]
    pub const fn requirement(self) -> FieldRequirement {
        match self {
            Self::Stripe => FieldRequirement::Card,
            _ => FieldRequirement::Phone,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jazzcash" => Ok(Self::JazzCash),
            "easypaisa" => Ok(Self::EasyPaisa),
            "nayapay" => Ok(Self::NayaPay),
            "stripe" => Ok(Self::Stripe),
            _ => Err(format!("unknown payment method: {s}")),
        }
    }
}

/// Everything the user has typed into the payment form.
///
/// Both field groups are retained regardless of the selected method, so
/// switching methods or failing validation never loses input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub phone_number: String,
    pub card_holder: String,
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvc: String,
}

/// A validated set of payment details, ready for authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInstrument {
    /// A wallet push to the given phone number.
    Wallet {
        method: PaymentMethod,
        phone_number: String,
    },
    /// A card charge.
    Card {
        holder: String,
        number: String,
        expiry: String,
        cvc: String,
    },
}

impl ContactFields {
    /// Validate the fields the given method requires.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] naming the missing
    /// requirement. The fields themselves are untouched.
    pub fn instrument_for(
        &self,
        method: PaymentMethod,
    ) -> Result<PaymentInstrument, CheckoutError> {
        match method.requirement() {
            FieldRequirement::Phone => {
                if self.phone_number.trim().is_empty() {
                    return Err(CheckoutError::Validation(
                        "Please enter your phone number".to_string(),
                    ));
                }
                Ok(PaymentInstrument::Wallet {
                    method,
                    phone_number: self.phone_number.trim().to_string(),
                })
            }
            FieldRequirement::Card => {
                let all_present = [
                    &self.card_holder,
                    &self.card_number,
                    &self.card_expiry,
                    &self.card_cvc,
                ]
                .iter()
                .all(|field| !field.trim().is_empty());

                if !all_present {
                    return Err(CheckoutError::Validation(
                        "Please fill in all card details".to_string(),
                    ));
                }
                Ok(PaymentInstrument::Card {
                    holder: self.card_holder.trim().to_string(),
                    number: self.card_number.trim().to_string(),
                    expiry: self.card_expiry.trim().to_string(),
                    cvc: self.card_cvc.trim().to_string(),
                })
            }
        }
    }
}
