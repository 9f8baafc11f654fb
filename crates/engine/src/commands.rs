//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::Currency;

/// Record a debit or credit.
#[derive(Clone, Debug)]
pub struct DebitsCreditsCmd {
    pub account_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub amount_minor: i64,
    /// Defaults to the account currency.
    pub currency: Option<Currency>,
    pub date: NaiveDate,
    pub active: bool,
    pub category_id: Option<Uuid>,
}

impl DebitsCreditsCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        user_id: impl Into<String>,
        name: impl Into<String>,
        amount_minor: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            user_id: user_id.into(),
            name: name.into(),
            amount_minor,
            currency: None,
            date,
            active: true,
            category_id: None,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Record a currency change: `amount_minor` of `currency` turned into
/// `new_amount_minor` of `new_currency`.
#[derive(Clone, Debug)]
pub struct ChangeCmd {
    pub account_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub amount_minor: i64,
    /// Defaults to the account currency.
    pub currency: Option<Currency>,
    pub new_amount_minor: i64,
    pub new_currency: Currency,
    pub date: NaiveDate,
    pub active: bool,
    pub category_id: Option<Uuid>,
}

impl ChangeCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        user_id: impl Into<String>,
        name: impl Into<String>,
        amount_minor: i64,
        new_amount_minor: i64,
        new_currency: Currency,
        date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            user_id: user_id.into(),
            name: name.into(),
            amount_minor,
            currency: None,
            new_amount_minor,
            new_currency,
            date,
            active: true,
            category_id: None,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Patch an existing transaction. `None` fields are left untouched.
///
/// `new_amount_minor`/`new_currency` only apply to changes.
#[derive(Clone, Debug, Default)]
pub struct UpdateTransactionCmd {
    pub name: Option<String>,
    pub amount_minor: Option<i64>,
    pub currency: Option<Currency>,
    pub date: Option<NaiveDate>,
    pub active: Option<bool>,
    /// `Some(None)` clears the category.
    pub category_id: Option<Option<Uuid>>,
    pub new_amount_minor: Option<i64>,
    pub new_currency: Option<Currency>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn new_amount_minor(mut self, new_amount_minor: i64) -> Self {
        self.new_amount_minor = Some(new_amount_minor);
        self
    }

    #[must_use]
    pub fn new_currency(mut self, new_currency: Currency) -> Self {
        self.new_currency = Some(new_currency);
        self
    }

    pub(crate) fn touches_change_fields(&self) -> bool {
        self.new_amount_minor.is_some() || self.new_currency.is_some()
    }
}

/// Create a category.
#[derive(Clone, Debug)]
pub struct CategoryCmd {
    pub user_id: String,
    pub name: String,
    pub color: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl CategoryCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            color: None,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}
