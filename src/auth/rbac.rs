/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Roles are not stored; they are resolved from the user's employee record at
 * login and mapped to permissions through [`ROLES`].
 */

pub use super::permissions::permission_matches;
use super::permissions::consts;
use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::warn;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EMPLOYEE: &str = "employee";
pub const ROLE_CUSTOMER: &str = "customer";

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

fn customer_permissions() -> Vec<String> {
    vec![
        consts::CART_MANAGE.to_string(),
        consts::ADDRESSES_MANAGE.to_string(),
        consts::ORDERS_PLACE.to_string(),
        consts::MODELS_MANAGE.to_string(),
    ]
}

lazy_static! {
    pub static ref ROLES: HashMap<String, Role> = {
        let mut roles = HashMap::new();

        roles.insert(
            ROLE_ADMIN.to_string(),
            Role {
                name: ROLE_ADMIN.to_string(),
                description: "Administrator with full access".to_string(),
                permissions: vec!["*".to_string()],
            },
        );

        // Staff can still shop; employees are customers too.
        let mut employee = customer_permissions();
        employee.push(consts::ORDERS_MANAGE.to_string());
        employee.push(consts::MODELS_REVIEW.to_string());
        roles.insert(
            ROLE_EMPLOYEE.to_string(),
            Role {
                name: ROLE_EMPLOYEE.to_string(),
                description: "Staff member reviewing models and fulfilling orders".to_string(),
                permissions: employee,
            },
        );

        roles.insert(
            ROLE_CUSTOMER.to_string(),
            Role {
                name: ROLE_CUSTOMER.to_string(),
                description: "Marketplace customer".to_string(),
                permissions: customer_permissions(),
            },
        );

        roles
    };
}

/// Resolve the role name for a user from their employee record.
pub fn resolve_role(is_employee: bool, is_admin: bool) -> &'static str {
    match (is_employee, is_admin) {
        (true, true) => ROLE_ADMIN,
        (true, false) => ROLE_EMPLOYEE,
        _ => ROLE_CUSTOMER,
    }
}

/// Permissions granted by `role_name`; unknown roles get none.
pub fn permissions_for_role(role_name: &str) -> Vec<String> {
    match ROLES.get(role_name) {
        Some(role) => role.permissions.clone(),
        None => {
            warn!("Role not found: {}", role_name);
            vec![]
        }
    }
}
