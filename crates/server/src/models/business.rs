//! Business entity.

use serde::Serialize;

use vendora_core::{BusinessId, UserId};

/// Name of the sentinel business that holds products created without an
/// explicit business. It is the only business allowed to have no owner.
pub const DEFAULT_BUSINESS_NAME: &str = "Default Business";

/// A storefront owned by a business-owner user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub city: String,
    pub region: String,
    pub description: Option<String>,
    pub logo: String,
    /// `None` only for the sentinel default business.
    pub owner_id: Option<UserId>,
}

impl Business {
    /// Whether this is the ownerless sentinel business.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_BUSINESS_NAME && self.owner_id.is_none()
    }

    /// Whether `user_id` owns this business.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business(owner_id: Option<UserId>, name: &str) -> Business {
        Business {
            id: BusinessId::new(1),
            name: name.to_owned(),
            city: "Unspecified".to_owned(),
            region: "Unspecified".to_owned(),
            description: None,
            logo: "default_logo.jpg".to_owned(),
            owner_id,
        }
    }

    #[test]
    fn test_is_default() {
        assert!(business(None, DEFAULT_BUSINESS_NAME).is_default());
        // An owned business with the sentinel name is not the sentinel.
        assert!(!business(Some(UserId::new(1)), DEFAULT_BUSINESS_NAME).is_default());
        assert!(!business(None, "Acme").is_default());
    }

    #[test]
    fn test_is_owned_by() {
        let b = business(Some(UserId::new(5)), "Acme");
        assert!(b.is_owned_by(UserId::new(5)));
        assert!(!b.is_owned_by(UserId::new(6)));
        assert!(!business(None, "Acme").is_owned_by(UserId::new(5)));
    }
}
