use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Subscription plan a user is on. Anything unknown in the store is
/// treated as free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Free,
    Premium,
}

impl SubscriptionPlan {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("premium") {
            SubscriptionPlan::Premium
        } else {
            SubscriptionPlan::Free
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Premium => "premium",
        }
    }
}

/// Registered user as the core sees it. Identity resolution happens at the
/// web boundary; every core call receives the user explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub plan: SubscriptionPlan,
    pub subscription_expires: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Lifetime counter, incremented atomically with each ledger row.
    pub documents_created: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Premium-eligible iff the plan is premium and the expiry is strictly
    /// after `now`. A premium plan without an expiry never qualifies.
    pub fn is_premium(&self, now: DateTime<Utc>) -> bool {
        self.plan == SubscriptionPlan::Premium
            && self
                .subscription_expires
                .map(|expires| expires > now)
                .unwrap_or(false)
    }
}

/// Account usage snapshot returned by `/api/user/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub documents_created: i64,
    pub subscription_plan: SubscriptionPlan,
    pub is_premium: bool,
    pub can_create_document: bool,
    pub documents_this_month: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(plan: SubscriptionPlan, expires: Option<DateTime<Utc>>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            full_name: "Test User".to_string(),
            plan,
            subscription_expires: expires,
            is_active: true,
            documents_created: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_premium_requires_future_expiry() {
        let now = Utc::now();
        let active = user(SubscriptionPlan::Premium, Some(now + Duration::days(30)));
        assert!(active.is_premium(now));

        let lapsed = user(SubscriptionPlan::Premium, Some(now - Duration::seconds(1)));
        assert!(!lapsed.is_premium(now));

        let no_expiry = user(SubscriptionPlan::Premium, None);
        assert!(!no_expiry.is_premium(now));
    }

    #[test]
    fn test_free_plan_is_never_premium() {
        let now = Utc::now();
        let free = user(SubscriptionPlan::Free, Some(now + Duration::days(365)));
        assert!(!free.is_premium(now));
    }

    #[test]
    fn test_plan_parse_defaults_to_free() {
        assert_eq!(SubscriptionPlan::parse("premium"), SubscriptionPlan::Premium);
        assert_eq!(SubscriptionPlan::parse("Premium"), SubscriptionPlan::Premium);
        assert_eq!(SubscriptionPlan::parse("free"), SubscriptionPlan::Free);
        assert_eq!(SubscriptionPlan::parse("trial"), SubscriptionPlan::Free);
    }
}
