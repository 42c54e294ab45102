//! # Tender
//!
//! Payment collection at the till, before anything is sent to the server.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────┐  select_single()  ┌──────────────┐  pay_single()  ┌──────┐  │
//! │   │ Idle │──────────────────►│ SingleSelect │───────────────►│ Done │  │
//! │   └──┬───┘                   └──────────────┘                └──▲───┘  │
//! │      │ enter_split()                                            │      │
//! │      ▼                                                          │      │
//! │   ┌───────────┐ add_split() with remaining ≈ 0 ┌─────────────────┐│      │
//! │   │ SplitMode │───────────────────────────────►│ ReadyToComplete ├┘      │
//! │   └─────┬─────┘                                └─────────────────┘      │
//! │         │ ▲                                      complete()             │
//! │         └─┘ add_split() with remaining > 0                              │
//! │                                                                         │
//! │   add_split() rejects amounts outside (0, remaining] and leaves the    │
//! │   state untouched; the till re-prompts.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There are no network calls here. The payment list is handed to
//! checkout in one piece once the machine reaches `Done`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::settlement::{transaction_id, PaymentInput};
use crate::types::PaymentMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TenderState {
    #[default]
    Idle,
    SingleSelect,
    SplitMode,
    ReadyToComplete,
    Done,
}

/// Payment collection for one order total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    #[ts(type = "string")]
    total: Money,
    state: TenderState,
    payments: Vec<PaymentInput>,
}

impl Tender {
    pub fn new(total: Money) -> Self {
        Tender {
            total,
            state: TenderState::Idle,
            payments: Vec::new(),
        }
    }

    pub fn state(&self) -> TenderState {
        self.state
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Payments added so far.
    pub fn payments(&self) -> &[PaymentInput] {
        &self.payments
    }

    /// `total - Σ payments`.
    pub fn remaining(&self) -> Money {
        self.total - self.payments.iter().map(|p| p.amount).sum::<Money>()
    }

    pub fn select_single(&mut self) -> CoreResult<()> {
        self.transition(TenderState::Idle, TenderState::SingleSelect)
    }

    pub fn enter_split(&mut self) -> CoreResult<()> {
        self.transition(TenderState::Idle, TenderState::SplitMode)
    }

    /// Pays the full total with one method.
    pub fn pay_single<F>(
        &mut self,
        method: PaymentMethod,
        now: DateTime<Utc>,
        mut next_suffix: F,
    ) -> CoreResult<Vec<PaymentInput>>
    where
        F: FnMut() -> u16,
    {
        if !matches!(self.state, TenderState::Idle | TenderState::SingleSelect) {
            return Err(self.wrong_state());
        }
        Self::check_tender_method(method)?;
        if !self.total.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!("order total {} must be positive", self.total),
            });
        }

        let mut payment = PaymentInput::new(method, self.total);
        payment.transaction_id = Some(transaction_id(now, next_suffix()));
        self.payments = vec![payment];
        self.state = TenderState::Done;
        Ok(self.payments.clone())
    }

    /// Adds one split payment. Returns `false`, leaving everything as it
    /// was, unless `0 < amount <= remaining`.
    pub fn add_split(&mut self, method: PaymentMethod, amount: Money) -> bool {
        if self.state != TenderState::SplitMode
            || method == PaymentMethod::Split
            || !amount.is_positive()
            || amount > self.remaining()
        {
            return false;
        }

        self.payments.push(PaymentInput::new(method, amount));
        if self.remaining().approx_eq(Money::zero()) {
            self.state = TenderState::ReadyToComplete;
        }
        true
    }

    /// Finishes a split tender, stamping each payment with a transaction id.
    pub fn complete<F>(&mut self, now: DateTime<Utc>, mut next_suffix: F) -> CoreResult<Vec<PaymentInput>>
    where
        F: FnMut() -> u16,
    {
        if self.state != TenderState::ReadyToComplete {
            return Err(CoreError::TenderIncomplete {
                reason: format!("remaining {} must be 0.00", self.remaining()),
            });
        }

        for payment in &mut self.payments {
            payment.transaction_id = Some(transaction_id(now, next_suffix()));
        }
        self.state = TenderState::Done;
        Ok(self.payments.clone())
    }

    /// Drops collected payments and returns to `Idle`.
    pub fn reset(&mut self) {
        self.payments.clear();
        self.state = TenderState::Idle;
    }

    fn transition(&mut self, from: TenderState, to: TenderState) -> CoreResult<()> {
        if self.state != from {
            return Err(self.wrong_state());
        }
        self.state = to;
        Ok(())
    }

    fn wrong_state(&self) -> CoreError {
        CoreError::TenderIncomplete {
            reason: format!("tender is in state {:?}", self.state),
        }
    }

    fn check_tender_method(method: PaymentMethod) -> CoreResult<()> {
        if method == PaymentMethod::Split {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "split is not a payment method".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn rupees(minor: i64) -> Money {
        Money::from_minor(minor)
    }

    #[test]
    fn test_single_payment_covers_total() {
        let mut tender = Tender::new(rupees(11800));
        tender.select_single().unwrap();

        let payments = tender.pay_single(PaymentMethod::Card, now(), || 5).unwrap();

        assert_eq!(tender.state(), TenderState::Done);
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, rupees(11800));
        assert_eq!(payments[0].transaction_id.as_deref(), Some("TXN17000000000005"));
    }

    #[test]
    fn test_split_flow() {
        let mut tender = Tender::new(rupees(11800));
        tender.enter_split().unwrap();

        assert!(tender.add_split(PaymentMethod::Cash, rupees(6000)));
        assert_eq!(tender.state(), TenderState::SplitMode);
        assert_eq!(tender.remaining(), rupees(5800));

        assert!(tender.add_split(PaymentMethod::Card, rupees(5800)));
        assert_eq!(tender.state(), TenderState::ReadyToComplete);

        let mut suffix = 0;
        let payments = tender
            .complete(now(), || {
                suffix += 1;
                suffix
            })
            .unwrap();
        assert_eq!(tender.state(), TenderState::Done);
        assert_eq!(payments.len(), 2);
        assert_ne!(payments[0].transaction_id, payments[1].transaction_id);
    }

    #[test]
    fn test_invalid_split_amounts_silently_rejected() {
        let mut tender = Tender::new(rupees(11800));
        tender.enter_split().unwrap();
        assert!(tender.add_split(PaymentMethod::Cash, rupees(6000)));
        let before = tender.clone();

        assert!(!tender.add_split(PaymentMethod::Card, rupees(0)));
        assert!(!tender.add_split(PaymentMethod::Card, rupees(-100)));
        assert!(!tender.add_split(PaymentMethod::Card, rupees(5801)));
        assert!(!tender.add_split(PaymentMethod::Split, rupees(100)));

        assert_eq!(tender, before);
    }

    #[test]
    fn test_split_only_in_split_mode() {
        let mut tender = Tender::new(rupees(1000));
        assert!(!tender.add_split(PaymentMethod::Cash, rupees(1000)));
        assert_eq!(tender.state(), TenderState::Idle);
    }

    #[test]
    fn test_complete_requires_zero_remaining() {
        let mut tender = Tender::new(rupees(11800));
        tender.enter_split().unwrap();
        tender.add_split(PaymentMethod::Cash, rupees(5000));

        let err = tender.complete(now(), || 0).unwrap_err();
        assert!(matches!(err, CoreError::TenderIncomplete { .. }));
        assert_eq!(tender.state(), TenderState::SplitMode);
    }

    #[test]
    fn test_cannot_pay_single_from_split_mode() {
        let mut tender = Tender::new(rupees(1000));
        tender.enter_split().unwrap();
        assert!(tender.pay_single(PaymentMethod::Cash, now(), || 0).is_err());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut tender = Tender::new(rupees(1000));
        tender.enter_split().unwrap();
        tender.add_split(PaymentMethod::Cash, rupees(400));

        tender.reset();
        assert_eq!(tender.state(), TenderState::Idle);
        assert_eq!(tender.remaining(), rupees(1000));
    }
}
