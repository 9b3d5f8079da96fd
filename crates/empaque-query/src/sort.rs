// SPDX-License-Identifier: Apache-2.0

use empaque_model::{ParseError, Product};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Secondary ordering under the featured-first rule. Wire names match what
/// the storefront sends in its `sort` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub enum SortKey {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "nameAsc")]
    NameAsc,
    #[serde(rename = "nameDesc")]
    NameDesc,
}

impl SortKey {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        match input {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "nameAsc" => Ok(Self::NameAsc),
            "nameDesc" => Ok(Self::NameDesc),
            _ => Err(ParseError::InvalidFormat(
                "sort must be newest, oldest, nameAsc or nameDesc",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::NameAsc => "nameAsc",
            Self::NameDesc => "nameDesc",
        }
    }
}

/// Stable sort: featured products first, then the requested key. Stability
/// keeps the store's insertion order for full ties.
pub fn sort_products(products: &mut [Product], key: SortKey) {
    products.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| secondary(a, b, key))
    });
}

fn secondary(a: &Product, b: &Product, key: SortKey) -> Ordering {
    match key {
        SortKey::Newest => b.created_at_ms.cmp(&a.created_at_ms),
        SortKey::Oldest => a.created_at_ms.cmp(&b.created_at_ms),
        SortKey::NameAsc => fold(&a.name).cmp(&fold(&b.name)),
        SortKey::NameDesc => fold(&b.name).cmp(&fold(&a.name)),
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::product;
    use proptest::prelude::*;

    #[test]
    fn wire_names_round_trip() {
        for key in [
            SortKey::Newest,
            SortKey::Oldest,
            SortKey::NameAsc,
            SortKey::NameDesc,
        ] {
            assert_eq!(SortKey::parse(key.as_str()).unwrap(), key);
        }
        assert!(SortKey::parse("priceAsc").is_err());
        assert!(SortKey::parse("NEWEST").is_err());
    }

    #[test]
    fn featured_outranks_every_secondary_key() {
        for key in [
            SortKey::Newest,
            SortKey::Oldest,
            SortKey::NameAsc,
            SortKey::NameDesc,
        ] {
            let mut products = vec![
                product("Aaa", "Bolsas", false, 100),
                product("Zzz", "Bolsas", true, 1),
            ];
            sort_products(&mut products, key);
            assert!(products[0].featured, "key {key:?}");
        }
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut products = vec![
            product("cinta", "Cintas", false, 1),
            product("Bolsa", "Bolsas", false, 2),
            product("ALAMBRE", "Alambres", false, 3),
        ];
        sort_products(&mut products, SortKey::NameAsc);
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["ALAMBRE", "Bolsa", "cinta"]);
    }

    #[test]
    fn newest_puts_latest_creation_first() {
        let mut products = vec![
            product("Viejo", "Bolsas", false, 10),
            product("Nuevo", "Bolsas", false, 99),
        ];
        sort_products(&mut products, SortKey::Newest);
        assert_eq!(products[0].name, "Nuevo");
        sort_products(&mut products, SortKey::Oldest);
        assert_eq!(products[0].name, "Viejo");
    }

    #[test]
    fn sorting_twice_is_idempotent() {
        let mut once = vec![
            product("B", "Bolsas", true, 5),
            product("A", "Bolsas", false, 9),
            product("C", "Bolsas", true, 2),
        ];
        sort_products(&mut once, SortKey::NameAsc);
        let mut twice = once.clone();
        sort_products(&mut twice, SortKey::NameAsc);
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn every_sort_keeps_featured_ahead(flags in proptest::collection::vec(any::<bool>(), 0..40)) {
            for key in [
                SortKey::Newest,
                SortKey::Oldest,
                SortKey::NameAsc,
                SortKey::NameDesc,
            ] {
                let mut products: Vec<Product> = flags
                    .iter()
                    .enumerate()
                    .map(|(i, &featured)| {
                        product(&format!("Producto {i}"), "Bolsas", featured, i as u64)
                    })
                    .collect();
                sort_products(&mut products, key);
                let split = products.iter().position(|p| !p.featured).unwrap_or(products.len());
                prop_assert!(products[..split].iter().all(|p| p.featured));
                prop_assert!(products[split..].iter().all(|p| !p.featured));
            }
        }
    }
}
