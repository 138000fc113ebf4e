//! Integration tests for u-molding-partition.

use std::collections::HashSet;
use u_molding_core::{Error, LookupTables, Product};
use u_molding_partition::{
    distribute_molds, enumerate_schemes, evaluate_schemes, is_valid_grouping, search,
    FlatRatePricing, MoldDistributionConfig, MoldQuote, PartitionConfig, PricingModel, Scheme,
    SearchContext, SearchLimits, SearchStrategy,
};

fn part(id: &str, l: f64, w: f64, h: f64, weight: f64) -> Product {
    Product::new(id, l, w, h)
        .with_weight(weight)
        .with_material("ABS")
        .with_color("black")
}

fn family() -> Vec<Product> {
    vec![
        part("front", 150.0, 90.0, 25.0, 80.0),
        part("back", 150.0, 90.0, 30.0, 85.0),
        part("button", 20.0, 20.0, 8.0, 2.0),
        part("bezel", 140.0, 80.0, 10.0, 40.0),
    ]
}

mod enumeration_tests {
    use super::*;

    #[test]
    fn test_bell_number_count_for_four() {
        let e = enumerate_schemes(&family(), &PartitionConfig::default()).unwrap();
        assert_eq!(e.len(), 15);
        assert!(!e.truncated);
    }

    #[test]
    fn test_every_scheme_is_a_complete_partition() {
        let products = family();
        let e = enumerate_schemes(&products, &PartitionConfig::default()).unwrap();
        let mut keys = HashSet::new();
        for scheme in &e.schemes {
            assert!(scheme.is_partition_of(products.len()));
            assert!(keys.insert(scheme.membership_key()), "duplicate scheme");
        }
    }

    #[test]
    fn test_color_rule_splits_families() {
        let mut products = family();
        products[2] = products[2].clone().with_color("red");
        let strict = enumerate_schemes(&products, &PartitionConfig::default()).unwrap();
        // the red button is always alone: partitions of the other three
        assert_eq!(strict.len(), 5);
        for scheme in &strict.schemes {
            assert!(scheme.groups.contains(&vec![2]));
        }

        let relaxed = PartitionConfig::new().with_different_colors(true);
        assert_eq!(enumerate_schemes(&products, &relaxed).unwrap().len(), 15);
    }

    #[test]
    fn test_material_rule() {
        let mut products = family();
        products[0] = products[0].clone().with_material("PC");
        let strict = enumerate_schemes(&products, &PartitionConfig::default()).unwrap();
        assert_eq!(strict.len(), 5);
        let relaxed = PartitionConfig::new().with_different_materials(true);
        assert_eq!(enumerate_schemes(&products, &relaxed).unwrap().len(), 15);
    }

    #[test]
    fn test_limits() {
        let products: Vec<Product> = (0..8)
            .map(|i| part(&format!("p{}", i), 50.0, 50.0, 10.0, 20.0))
            .collect();

        let capped = PartitionConfig::new().with_limits(SearchLimits::new().with_max_schemes(100));
        let e = enumerate_schemes(&products, &capped).unwrap();
        assert_eq!(e.len(), 100);
        assert!(e.truncated);

        let strict = PartitionConfig::new()
            .with_limits(SearchLimits::new().with_max_schemes(100).with_strict(true));
        assert!(matches!(
            enumerate_schemes(&products, &strict),
            Err(Error::EnumerationOverflow { limit: 100 })
        ));

        let small = PartitionConfig::new().with_limits(SearchLimits::new().with_max_products(6));
        assert!(enumerate_schemes(&products, &small)
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn test_beam_handles_large_mixes() {
        let products: Vec<Product> = (0..30)
            .map(|i| part(&format!("p{}", i), 40.0 + i as f64, 30.0, 10.0, 20.0))
            .collect();
        let config = PartitionConfig::new().with_strategy(SearchStrategy::Beam { width: 16 });
        let e = enumerate_schemes(&products, &config).unwrap();
        assert_eq!(e.len(), 16);
        assert!(e.schemes.iter().all(|s| s.is_partition_of(30)));
    }
}

mod search_tests {
    use super::*;

    #[test]
    fn test_search_ranks_by_price() {
        let outcome = search(&family(), &SearchContext::default_config()).unwrap();
        assert_eq!(outcome.enumerated, 15);
        assert!(!outcome.is_empty());
        assert_eq!(outcome.discarded + outcome.schemes.len(), 15);
        for pair in outcome.schemes.windows(2) {
            assert!(pair[0].total_price <= pair[1].total_price);
        }
        for scheme in &outcome.schemes {
            assert!(scheme.groups.iter().all(|g| g.score >= 50.0));
            let members: usize = scheme.groups.iter().map(|g| g.members.len()).sum();
            assert_eq!(members, 4);
        }
    }

    #[test]
    fn test_all_singletons_always_survive() {
        let outcome = search(&family(), &SearchContext::default_config()).unwrap();
        assert!(outcome
            .schemes
            .iter()
            .any(|s| s.groups.iter().all(|g| g.members.len() == 1)));
    }

    #[test]
    fn test_expensive_molds_favor_sharing() {
        let twins: Vec<Product> = (0..2)
            .map(|i| part(&format!("t{}", i), 100.0, 80.0, 20.0, 50.0))
            .collect();
        let pricing = FlatRatePricing::new().with_mold_base(1_000_000.0);
        let ctx = SearchContext::with_pricing(
            PartitionConfig::new().with_min_group_score(0.0),
            pricing,
        );
        let outcome = search(&twins, &ctx).unwrap();
        let best = outcome.best().unwrap();
        assert_eq!(best.mold_count(), 1);
    }

    #[test]
    fn test_custom_pricing_model() {
        struct PerCavity;
        impl PricingModel for PerCavity {
            fn mold_price(&self, quote: &MoldQuote) -> f64 {
                100.0 * quote.cavities as f64
            }
            fn product_price(&self, _quote: &MoldQuote, _product: &Product) -> f64 {
                1.0
            }
        }

        let products = family();
        let ctx = SearchContext::with_pricing(
            PartitionConfig::new().with_min_group_score(0.0),
            PerCavity,
        );
        let schemes = vec![Scheme::new(vec![vec![0, 1], vec![2], vec![3]])];
        let evaluated = evaluate_schemes(&products, &schemes, &ctx).unwrap();
        assert_eq!(evaluated.len(), 1);
        assert!((evaluated[0].total_price - (400.0 + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_product_list() {
        let outcome = search(&[], &SearchContext::default_config()).unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.enumerated, 0);
    }
}

mod distribution_tests {
    use super::*;

    #[test]
    fn test_weight_rule_example() {
        let tables = LookupTables::default();
        assert!(!is_valid_grouping(&[800.0, 50.0], &tables));

        let products = vec![
            part("heavy", 100.0, 100.0, 20.0, 800.0),
            part("light", 100.0, 100.0, 20.0, 50.0),
        ];
        let d = distribute_molds(&products, &MoldDistributionConfig::default()).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.distributions[0].len(), 2);
    }

    #[test]
    fn test_distribution_dedup() {
        let d = distribute_molds(&family(), &MoldDistributionConfig::default()).unwrap();
        let mut keys = HashSet::new();
        for dist in &d.distributions {
            assert!(keys.insert(u_molding_partition::membership_key(dist)));
        }
        assert!(!d.truncated);
    }
}
