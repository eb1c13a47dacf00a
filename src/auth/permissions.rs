/*!
 * # Permissions Module
 *
 * Permission strings are `resource:action`. A grant of `resource:*` covers every
 * action on that resource and `*` covers everything.
 */

/// Common permission string constants for compile-time safety
pub mod consts {
    // Customer-facing
    pub const CART_MANAGE: &str = "cart:manage";
    pub const ADDRESSES_MANAGE: &str = "addresses:manage";
    pub const ORDERS_PLACE: &str = "orders:place";
    pub const MODELS_MANAGE: &str = "models:manage";

    // Staff
    pub const ORDERS_MANAGE: &str = "orders:manage";
    pub const MODELS_REVIEW: &str = "models:review";

    // Admin
    pub const MATERIALS_MANAGE: &str = "materials:manage";
    pub const SHIPPING_MANAGE: &str = "shipping:manage";
    pub const DISCOUNTS_MANAGE: &str = "discounts:manage";
}

/// Whether `granted` satisfies `required`.
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == "*" || granted == required {
        return true;
    }

    match granted.strip_suffix(":*") {
        Some(resource) => required
            .split_once(':')
            .map(|(req_resource, _)| req_resource == resource)
            .unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("orders:manage", "orders:manage", true)]
    #[case("orders:*", "orders:manage", true)]
    #[case("orders:*", "ordersx:manage", false)]
    #[case("*", "discounts:manage", true)]
    #[case("orders:place", "orders:manage", false)]
    #[case("models:*", "orders:manage", false)]
    fn wildcard_matching(#[case] granted: &str, #[case] required: &str, #[case] expected: bool) {
        assert_eq!(permission_matches(granted, required), expected);
    }
}
