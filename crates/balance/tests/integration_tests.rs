//! Integration tests for u-molding-balance.

use u_molding_balance::{BalanceConfig, BalanceScore, BalanceScorer};
use u_molding_core::{CadData, Layout, Point2, Product};
use u_molding_layout::LayoutPacker;

fn pack(products: &[Product]) -> Layout {
    let footprints: Vec<_> = products.iter().map(Product::footprint).collect();
    LayoutPacker::default_config().pack(&footprints).unwrap()
}

fn assert_bounds(score: &BalanceScore) {
    for s in [score.total, score.geometry, score.flow, score.distribution] {
        assert!((0.0..=100.0).contains(&s), "score {} out of range", s);
    }
    assert!((0.0..=1.0).contains(&score.confidence));
}

fn mixed_products() -> Vec<Product> {
    vec![
        Product::new("housing", 180.0, 120.0, 45.0).with_weight(210.0),
        Product::new("cover", 160.0, 110.0, 20.0).with_weight(95.0),
        Product::new("knob", 40.0, 40.0, 30.0).with_weight(12.0),
        Product::new("clip", 60.0, 15.0, 8.0).with_weight(4.0),
    ]
}

mod scorer_tests {
    use super::*;

    #[test]
    fn test_single_product() {
        let products = vec![Product::new("solo", 200.0, 150.0, 40.0).with_weight(120.0)];
        let layout = pack(&products);
        let score = BalanceScorer::default_config()
            .score(&layout, &products, layout.center())
            .unwrap();
        assert_eq!(score.geometry, 100.0);
        assert!(score.flow > 90.0);
        assert_bounds(&score);
    }

    #[test]
    fn test_score_bounds_mixed() {
        let products = mixed_products();
        let layout = pack(&products);
        let scorer = BalanceScorer::default_config();
        for injection in [
            layout.center(),
            Point2::new(0.0, 0.0),
            Point2::new(layout.width * 3.0, -layout.length),
        ] {
            let score = scorer.score(&layout, &products, injection).unwrap();
            assert_bounds(&score);
        }
    }

    #[test]
    fn test_idempotent() {
        let products = mixed_products();
        let layout = pack(&products);
        let scorer = BalanceScorer::default_config();
        let a = scorer.score(&layout, &products, layout.center()).unwrap();
        let b = scorer.score(&layout, &products, layout.center()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mismatched_counts() {
        let products = mixed_products();
        let layout = pack(&products[..2]);
        let err = BalanceScorer::default_config()
            .score(&layout, &products, layout.center())
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_identical_set_beats_mixed_set() {
        let same: Vec<Product> = (0..4)
            .map(|i| Product::new(format!("s{}", i), 100.0, 80.0, 25.0).with_weight(60.0))
            .collect();
        let mixed = mixed_products();
        let scorer = BalanceScorer::default_config();
        let same_layout = pack(&same);
        let mixed_layout = pack(&mixed);
        let a = scorer
            .score(&same_layout, &same, same_layout.center())
            .unwrap();
        let b = scorer
            .score(&mixed_layout, &mixed, mixed_layout.center())
            .unwrap();
        assert_eq!(a.geometry, 100.0);
        assert!(a.geometry > b.geometry);
        assert!(a.total > b.total);
    }

    #[test]
    fn test_confidence_counts_complete_cad() {
        let cad = CadData::new(1000.0, 800.0)
            .with_bbox([50.0, 40.0, 10.0], [100.0, 80.0, 20.0])
            .with_center_of_mass([50.0, 40.0, 9.0]);
        let products = vec![
            Product::new("a", 100.0, 80.0, 20.0).with_cad(cad),
            Product::new("b", 100.0, 80.0, 20.0),
        ];
        let layout = pack(&products);
        let score = BalanceScorer::default_config()
            .score(&layout, &products, layout.center())
            .unwrap();
        assert!((score.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_custom_weights() {
        let products = mixed_products();
        let layout = pack(&products);
        let scorer = BalanceScorer::new(BalanceConfig::new().with_weights(1.0, 0.0, 0.0));
        let score = scorer.score(&layout, &products, layout.center()).unwrap();
        assert!((score.total - score.geometry).abs() < 1e-9);
    }
}

mod invariance_tests {
    use super::*;

    #[test]
    fn test_mirroring_preserves_center_deviation_and_symmetry() {
        let products = mixed_products();
        let layout = pack(&products);
        let mirrored = layout.mirrored();
        let scorer = BalanceScorer::default_config();

        let a = scorer.report(&layout, &products, layout.center()).unwrap();
        let b = scorer
            .report(&mirrored, &products, mirrored.center())
            .unwrap();

        let tol = 1e-6;
        assert!((a.distribution.center_deviation - b.distribution.center_deviation).abs() < tol);
        assert!(
            (a.distribution.volume_balance.symmetry.best()
                - b.distribution.volume_balance.symmetry.best())
            .abs()
                < tol
        );
        assert!((a.distribution.isotropy - b.distribution.isotropy).abs() < tol);
        // the injection point is mirrored with the layout
        assert!((a.score.flow - b.score.flow).abs() < tol);
    }
}
