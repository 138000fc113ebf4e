//! Integration tests for u-molding-layout.

use u_molding_core::{Footprint, Layout, LookupTables, Product};
use u_molding_layout::{LayoutPacker, MoldConfig, MoldSpec, PackerConfig};

fn assert_valid(layout: &Layout, footprints: &[Footprint]) {
    assert_eq!(layout.len(), footprints.len());
    for i in 0..layout.len() {
        for j in (i + 1)..layout.len() {
            assert!(
                !layout.rects[i].overlaps(&layout.rects[j], layout.spacing),
                "rects {} and {} overlap within spacing {}",
                i,
                j,
                layout.spacing
            );
        }
    }
    let used: f64 = footprints.iter().map(Footprint::area).sum();
    assert!(layout.area + 1e-6 >= used);
    assert!((layout.area - layout.width * layout.length).abs() < 1e-6);
}

mod packing_tests {
    use super::*;

    #[test]
    fn test_identical_items() {
        let fps = vec![Footprint::new(100.0, 60.0); 4];
        let layout = LayoutPacker::default_config().pack(&fps).unwrap();
        assert_valid(&layout, &fps);
        assert!(layout.fill_ratio() > 0.4);
    }

    #[test]
    fn test_many_seeds_never_overlap() {
        let fps = vec![
            Footprint::new(300.0, 100.0),
            Footprint::new(250.0, 100.0),
            Footprint::new(230.0, 180.0),
            Footprint::new(90.0, 40.0),
            Footprint::new(120.0, 120.0),
        ];
        for seed in 0..10 {
            let packer = LayoutPacker::new(PackerConfig::new().with_seed(seed));
            let layout = packer.pack(&fps).unwrap();
            assert_valid(&layout, &fps);
        }
    }

    #[test]
    fn test_mutation_free_search_still_packs() {
        let fps = vec![Footprint::new(150.0, 50.0), Footprint::new(50.0, 150.0)];
        let packer = LayoutPacker::new(PackerConfig::new().with_mutation_rounds(0));
        let layout = packer.pack(&fps).unwrap();
        assert_valid(&layout, &fps);
    }

    #[test]
    fn test_rotation_flags_match_extent() {
        let fps = vec![Footprint::new(40.0, 160.0), Footprint::new(160.0, 40.0)];
        let layout = LayoutPacker::default_config().pack(&fps).unwrap();
        for rect in &layout.rects {
            if rect.rotated {
                assert_eq!(rect.width(), rect.footprint.length);
            } else {
                assert_eq!(rect.width(), rect.footprint.width);
            }
        }
    }
}

mod mold_tests {
    use super::*;

    #[test]
    fn test_mold_from_packed_products() {
        let products = vec![
            Product::new("a", 120.0, 80.0, 25.0),
            Product::new("b", 100.0, 90.0, 60.0),
        ];
        let fps: Vec<Footprint> = products.iter().map(Product::footprint).collect();
        let layout = LayoutPacker::default_config().pack(&fps).unwrap();

        let tables = LookupTables::default();
        let block =
            MoldSpec::for_products(&layout, &products, &tables, &MoldConfig::default()).unwrap();
        assert!(block.edge_margin > 0.0);
        // tallest 60 -> bracket 60
        assert!((block.bottom_margin - 120.0).abs() < 1e-9);
        assert!(block.outer_width > layout.width);
        assert!(block.weight > 0.0);
    }
}
