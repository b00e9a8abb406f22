use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogLookup, IdentityLookup};

/// Maps a sold product to the account credited in the sales ledger.
///
/// Resolution is product → seller_name (catalog) → user id (identity).
#[derive(Clone)]
pub struct SellerResolver {
    catalog: Arc<dyn CatalogLookup>,
    identity: Arc<dyn IdentityLookup>,
}

impl SellerResolver {
    pub fn new(catalog: Arc<dyn CatalogLookup>, identity: Arc<dyn IdentityLookup>) -> Self {
        Self { catalog, identity }
    }

    /// `Ok(None)` is a defined gap, not an error: a product without a
    /// seller name, a seller name matching no account, or a product that
    /// vanished mid-checkout simply produces no sale entry while the order
    /// itself still commits.
    pub fn resolve_seller(&self, product_id: Uuid) -> Result<Option<Uuid>, DomainError> {
        let Some(product) = self.catalog.product(product_id)? else {
            return Ok(None);
        };
        let Some(seller_name) = product.seller_name else {
            return Ok(None);
        };
        self.identity.user_id_by_username(&seller_name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::SellerResolver;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::{CatalogLookup, IdentityLookup, ProductInfo};

    struct FakeCatalog {
        products: HashMap<Uuid, ProductInfo>,
    }

    impl CatalogLookup for FakeCatalog {
        fn product(&self, id: Uuid) -> Result<Option<ProductInfo>, DomainError> {
            Ok(self.products.get(&id).cloned())
        }
    }

    struct FakeIdentity {
        users: HashMap<String, Uuid>,
    }

    impl IdentityLookup for FakeIdentity {
        fn user_id_by_username(&self, username: &str) -> Result<Option<Uuid>, DomainError> {
            Ok(self.users.get(username).copied())
        }

        fn username(&self, user_id: Uuid) -> Result<Option<String>, DomainError> {
            Ok(self
                .users
                .iter()
                .find(|(_, id)| **id == user_id)
                .map(|(name, _)| name.clone()))
        }
    }

    fn product(seller_name: Option<&str>) -> ProductInfo {
        ProductInfo {
            name: "vintage jacket".to_string(),
            price: BigDecimal::from_str("29.99").expect("valid decimal"),
            stock: 3,
            image_url: None,
            seller_name: seller_name.map(String::from),
        }
    }

    fn resolver(
        products: Vec<(Uuid, ProductInfo)>,
        users: Vec<(&str, Uuid)>,
    ) -> SellerResolver {
        SellerResolver::new(
            Arc::new(FakeCatalog {
                products: products.into_iter().collect(),
            }),
            Arc::new(FakeIdentity {
                users: users
                    .into_iter()
                    .map(|(n, id)| (n.to_string(), id))
                    .collect(),
            }),
        )
    }

    #[test]
    fn resolves_seller_through_both_ports() {
        let product_id = Uuid::new_v4();
        let seller_id = Uuid::new_v4();
        let resolver = resolver(
            vec![(product_id, product(Some("maria")))],
            vec![("maria", seller_id)],
        );

        let resolved = resolver.resolve_seller(product_id).expect("resolve failed");

        assert_eq!(resolved, Some(seller_id));
    }

    #[test]
    fn product_without_seller_name_is_unresolved() {
        let product_id = Uuid::new_v4();
        let resolver = resolver(vec![(product_id, product(None))], vec![]);

        assert_eq!(resolver.resolve_seller(product_id).unwrap(), None);
    }

    #[test]
    fn unknown_seller_name_is_unresolved_not_an_error() {
        let product_id = Uuid::new_v4();
        let resolver = resolver(vec![(product_id, product(Some("ghost")))], vec![]);

        assert_eq!(resolver.resolve_seller(product_id).unwrap(), None);
    }

    #[test]
    fn missing_product_is_unresolved() {
        let resolver = resolver(vec![], vec![]);

        assert_eq!(resolver.resolve_seller(Uuid::new_v4()).unwrap(), None);
    }
}
