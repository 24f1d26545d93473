// ============================================================================
// AUTORISATIONS
// ============================================================================
//
// Toutes les routes protégées passent par Policy::authorize avec la
// capacité demandée. Les routes "investisseur" utilisent en plus
// Policy::investor_profile pour retrouver le profil du compte connecté.
//
//   Capability             | admin | investor | customer
//   -----------------------+-------+----------+---------
//   ManageAllocations      |   x   |          |
//   DistributeProfit       |   x   |          |
//   ReviewDeposits         |   x   |          |
//   ManageInvestors        |   x   |          |
//   ManageEquipment        |   x   |          |
//   InvestorSelfService    |       |    x     |
//
// ============================================================================

use sea_orm::DatabaseConnection;

use crate::error::LedgerError;
use crate::middleware::AuthUser;
use crate::models::investor;
use crate::models::users::Role;
use crate::services::investor_service::InvestorService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageAllocations,
    DistributeProfit,
    ReviewDeposits,
    ManageInvestors,
    ManageEquipment,
    InvestorSelfService,
}

impl Capability {
    fn allows(self, role: Role) -> bool {
        match self {
            Capability::InvestorSelfService => role == Role::Investor,
            _ => role == Role::Admin,
        }
    }
}

pub struct Policy;

impl Policy {
    pub fn authorize(user: &AuthUser, capability: Capability) -> Result<(), LedgerError> {
        if capability.allows(user.role) {
            return Ok(());
        }

        log::warn!(
            "User {} ({:?}) denied {:?}",
            user.user_id,
            user.role,
            capability
        );

        Err(LedgerError::Forbidden(match capability {
            Capability::InvestorSelfService => "Investor access required".to_string(),
            _ => "Admin access required".to_string(),
        }))
    }

    /// Profil investisseur du compte connecté (rôle investor obligatoire)
    pub async fn investor_profile(
        db: &DatabaseConnection,
        user: &AuthUser,
    ) -> Result<investor::Model, LedgerError> {
        Self::authorize(user, Capability::InvestorSelfService)?;
        InvestorService::find_by_user(db, user.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_capabilities() {
        let admin = user(Role::Admin);

        assert!(Policy::authorize(&admin, Capability::ManageAllocations).is_ok());
        assert!(Policy::authorize(&admin, Capability::DistributeProfit).is_ok());
        assert!(matches!(
            Policy::authorize(&admin, Capability::InvestorSelfService),
            Err(LedgerError::Forbidden(_))
        ));
    }

    #[test]
    fn test_investor_and_customer() {
        assert!(Policy::authorize(&user(Role::Investor), Capability::InvestorSelfService).is_ok());
        assert!(Policy::authorize(&user(Role::Investor), Capability::ReviewDeposits).is_err());
        assert!(Policy::authorize(&user(Role::Customer), Capability::InvestorSelfService).is_err());
        assert!(Policy::authorize(&user(Role::Customer), Capability::ManageEquipment).is_err());
    }

    #[tokio::test]
    async fn test_investor_profile_requires_matching_profile() {
        let db = crate::test_support::setup_db().await;
        let investor = crate::test_support::seed_investor(&db, "leila", rust_decimal::Decimal::ZERO).await;

        let found = Policy::investor_profile(
            &db,
            &AuthUser { user_id: investor.user_id, username: "leila".to_string(), role: Role::Investor },
        )
            .await
            .unwrap();
        assert_eq!(found.id, investor.id);

        let orphan = Policy::investor_profile(&db, &AuthUser { user_id: 999, ..user(Role::Investor) }).await;
        assert!(matches!(orphan, Err(LedgerError::NotFound(_))));
    }
}
