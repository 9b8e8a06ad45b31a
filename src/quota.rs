//! Quota evaluation for document creation.
//!
//! Free users get [`FREE_MONTHLY_LIMIT`] documents per UTC calendar month;
//! premium-eligible users are unbounded. `can_create` is a read-then-decide
//! check only — the ledger re-validates the same guard inside the recording
//! transaction so two concurrent requests cannot double-spend the last slot.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc};

use crate::error::CoreError;
use crate::ledger::Ledger;
use crate::users::model::User;

pub const FREE_MONTHLY_LIMIT: i64 = 5;

/// Limit the ledger must re-validate when recording an artifact.
/// `monthly_limit: None` means unbounded (premium).
#[derive(Debug, Clone, Copy)]
pub struct QuotaGuard {
    pub monthly_limit: Option<i64>,
    pub month_start: DateTime<Utc>,
}

/// First instant of the current UTC calendar month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = now
        .date_naive()
        .with_day(1)
        .unwrap_or_else(|| now.date_naive());
    Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN))
}

/// Guard for `user` at `now`: unbounded for premium-eligible users,
/// otherwise the free monthly limit against the current month window.
pub fn guard_for(user: &User, now: DateTime<Utc>) -> QuotaGuard {
    QuotaGuard {
        monthly_limit: if user.is_premium(now) {
            None
        } else {
            Some(FREE_MONTHLY_LIMIT)
        },
        month_start: month_start(now),
    }
}

/// Whether `user` may create one more document at `now`.
pub async fn can_create(
    ledger: &dyn Ledger,
    user: &User,
    now: DateTime<Utc>,
) -> Result<bool, CoreError> {
    let guard = guard_for(user, now);
    match guard.monthly_limit {
        None => Ok(true),
        Some(limit) => {
            let used = ledger.count_since(user.id, guard.month_start).await?;
            Ok(used < limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::models::DocumentKind;
    use crate::ledger::memory::MemoryLedger;
    use crate::users::model::SubscriptionPlan;
    use chrono::Duration;
    use std::sync::Arc;
    use uuid::Uuid;

    fn free_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "free@example.com".to_string(),
            full_name: "Free User".to_string(),
            plan: SubscriptionPlan::Free,
            subscription_expires: None,
            is_active: true,
            documents_created: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_month_start_is_first_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 7, 19, 14, 30, 5).unwrap();
        let start = month_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
    }

    #[actix_web::test]
    async fn test_free_user_boundary_at_limit() {
        let ledger = Arc::new(MemoryLedger::new());
        let user = free_user();
        ledger.insert_user(user.clone());
        let now = Utc::now();

        for _ in 0..4 {
            ledger.seed_document(user.id, DocumentKind::Invoice, now);
        }
        assert!(can_create(ledger.as_ref(), &user, now).await.unwrap());

        ledger.seed_document(user.id, DocumentKind::Invoice, now);
        assert!(!can_create(ledger.as_ref(), &user, now).await.unwrap());
    }

    #[actix_web::test]
    async fn test_prior_month_documents_never_count() {
        let ledger = Arc::new(MemoryLedger::new());
        let user = free_user();
        ledger.insert_user(user.clone());
        let now = Utc::now();

        // A full previous month of activity is irrelevant this month.
        let last_month = month_start(now) - Duration::seconds(1);
        for _ in 0..20 {
            ledger.seed_document(user.id, DocumentKind::Resume, last_month);
        }
        assert!(can_create(ledger.as_ref(), &user, now).await.unwrap());
    }

    #[actix_web::test]
    async fn test_premium_is_unbounded_but_lapsed_is_not() {
        let ledger = Arc::new(MemoryLedger::new());
        let now = Utc::now();

        let mut premium = free_user();
        premium.plan = SubscriptionPlan::Premium;
        premium.subscription_expires = Some(now + Duration::days(30));
        ledger.insert_user(premium.clone());
        for _ in 0..50 {
            ledger.seed_document(premium.id, DocumentKind::Certificate, now);
        }
        assert!(can_create(ledger.as_ref(), &premium, now).await.unwrap());

        let mut lapsed = free_user();
        lapsed.plan = SubscriptionPlan::Premium;
        lapsed.subscription_expires = Some(now - Duration::days(1));
        ledger.insert_user(lapsed.clone());
        for _ in 0..5 {
            ledger.seed_document(lapsed.id, DocumentKind::Certificate, now);
        }
        assert!(!can_create(ledger.as_ref(), &lapsed, now).await.unwrap());
    }
}
