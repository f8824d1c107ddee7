//! Contributor payment tracking.
//!
//! A contribution ties a contributor to a piece of content in a given role;
//! the role's payment type decides where the applicable rate comes from.
//! These are pure business rules over in-memory data — invoicing and payout
//! are external concerns.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a contribution's rate is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
  /// A fixed rate attached to the role.
  FlatRate,
  /// Rate depends on the feature type of the content contributed to.
  FeatureType,
  /// An hourly rate attached to the role.
  Hourly,
  /// A rate entered per contribution.
  Manual,
}

/// A role a contributor can hold on a piece of content ("Writer",
/// "Illustrator", …). Carries the current flat and hourly rates; historical
/// rates live with the payment system, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRole {
  pub id:           Uuid,
  pub name:         String,
  pub description:  Option<String>,
  pub payment_type: PaymentType,
  pub flat_rate:    Option<i64>,
  pub hourly_rate:  Option<i64>,
}

/// Current per-feature-type rates, keyed by feature type id.
#[derive(Debug, Clone, Default)]
pub struct RateBook {
  pub feature_type_rates: HashMap<Uuid, i64>,
}

/// A single credited piece of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
  pub id:             Uuid,
  pub contributor:    Uuid,
  pub content:        Uuid,
  pub role:           ContributorRole,
  /// Feature type of the content at the time of contribution, for
  /// [`PaymentType::FeatureType`] roles.
  pub feature_type:   Option<Uuid>,
  pub minutes_worked: Option<u32>,
  pub manual_rate:    Option<i64>,
  pub payment_date:   Option<DateTime<Utc>>,
  pub notes:          Option<String>,
}

impl Contribution {
  /// Resolve the applicable rate per the role's payment type. `None` means
  /// no rate is configured and the contribution earns nothing.
  pub fn rate(&self, book: &RateBook) -> Option<i64> {
    match self.role.payment_type {
      PaymentType::Manual => self.manual_rate,
      PaymentType::FlatRate => self.role.flat_rate,
      PaymentType::Hourly => self.role.hourly_rate,
      PaymentType::FeatureType => self
        .feature_type
        .and_then(|ft| book.feature_type_rates.get(&ft).copied()),
    }
  }
}

/// Total pay for a set of contributions whose `payment_date` falls strictly
/// inside the open window `(start, end)`. Undated contributions are never
/// paid out through a window query.
pub fn pay_between(
  contributions: &[Contribution],
  book: &RateBook,
  start: Option<DateTime<Utc>>,
  end: Option<DateTime<Utc>>,
) -> i64 {
  contributions
    .iter()
    .filter(|c| match c.payment_date {
      Some(date) => {
        start.is_none_or(|s| date > s) && end.is_none_or(|e| date < e)
      }
      None => false,
    })
    .filter_map(|c| c.rate(book))
    .sum()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn role(payment_type: PaymentType) -> ContributorRole {
    ContributorRole {
      id: Uuid::new_v4(),
      name: "Writer".into(),
      description: None,
      payment_type,
      flat_rate: Some(120),
      hourly_rate: Some(40),
    }
  }

  fn contribution(payment_type: PaymentType) -> Contribution {
    Contribution {
      id:             Uuid::new_v4(),
      contributor:    Uuid::new_v4(),
      content:        Uuid::new_v4(),
      role:           role(payment_type),
      feature_type:   None,
      minutes_worked: None,
      manual_rate:    None,
      payment_date:   None,
      notes:          None,
    }
  }

  #[test]
  fn flat_rate_comes_from_role() {
    let c = contribution(PaymentType::FlatRate);
    assert_eq!(c.rate(&RateBook::default()), Some(120));
  }

  #[test]
  fn hourly_rate_comes_from_role() {
    let c = contribution(PaymentType::Hourly);
    assert_eq!(c.rate(&RateBook::default()), Some(40));
  }

  #[test]
  fn manual_rate_comes_from_contribution() {
    let mut c = contribution(PaymentType::Manual);
    assert_eq!(c.rate(&RateBook::default()), None);
    c.manual_rate = Some(75);
    assert_eq!(c.rate(&RateBook::default()), Some(75));
  }

  #[test]
  fn feature_type_rate_requires_feature_type() {
    let ft = Uuid::new_v4();
    let mut book = RateBook::default();
    book.feature_type_rates.insert(ft, 200);

    let mut c = contribution(PaymentType::FeatureType);
    assert_eq!(c.rate(&book), None);

    c.feature_type = Some(ft);
    assert_eq!(c.rate(&book), Some(200));
  }

  #[test]
  fn pay_between_filters_on_payment_date() {
    let t = |d| Utc.with_ymd_and_hms(2016, 6, d, 12, 0, 0).unwrap();

    let mut paid_early = contribution(PaymentType::FlatRate);
    paid_early.payment_date = Some(t(1));
    let mut paid_late = contribution(PaymentType::FlatRate);
    paid_late.payment_date = Some(t(20));
    let undated = contribution(PaymentType::FlatRate);

    let all = vec![paid_early, paid_late, undated];
    let book = RateBook::default();

    assert_eq!(pay_between(&all, &book, None, None), 240);
    assert_eq!(pay_between(&all, &book, Some(t(5)), None), 120);
    assert_eq!(pay_between(&all, &book, Some(t(5)), Some(t(10))), 0);
  }
}
