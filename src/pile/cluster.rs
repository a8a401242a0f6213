use crate::foundation::core::IntRect;

/// Recording rects chosen for a set of invalid tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct TileClusters {
    pub rects: Vec<IntRect>,
    /// Invalid area over recorded area, in `(0, 1]`.
    pub density: f32,
}

/// Greedily merge tiles in the given order, closing a cluster whenever adding the next tile would
/// drop its density below `density_threshold`.
fn perform_clustering(tiles: &[IntRect], density_threshold: f32) -> TileClusters {
    let mut rects = Vec::new();
    let mut total_record_area: i64 = 0;
    let mut total_invalid_area: i64 = 0;

    let mut cur_record_rect = IntRect::default();
    let mut cluster_record_area: i64 = 0;
    let mut cluster_invalid_area: i64 = 0;

    for &tile in tiles {
        let tile_area = tile.area();
        let proposed_union = cur_record_rect.union_with(tile);
        let proposed_area = proposed_union.area();
        let proposed_density =
            (cluster_invalid_area + tile_area) as f64 / proposed_area.max(1) as f64;

        if proposed_density >= f64::from(density_threshold) {
            cur_record_rect = proposed_union;
            cluster_record_area = proposed_area;
            cluster_invalid_area += tile_area;
        } else {
            rects.push(cur_record_rect);
            total_record_area += cluster_record_area;
            cur_record_rect = tile;
            cluster_invalid_area = tile_area;
            cluster_record_area = tile_area;
        }
        total_invalid_area += tile_area;
    }

    debug_assert!(!cur_record_rect.is_empty());
    rects.push(cur_record_rect);
    total_record_area += cluster_record_area;
    debug_assert!(total_record_area > 0);

    TileClusters {
        rects,
        density: (total_invalid_area as f64 / total_record_area.max(1) as f64) as f32,
    }
}

/// Group invalid tile rects into a few larger recording rects.
///
/// Tries a row-major and a column-major greedy pass and keeps the denser result; the row-major
/// pass wins ties and short-circuits when it is already perfect.
#[tracing::instrument(level = "debug", skip(invalid_tiles), fields(tiles = invalid_tiles.len()))]
pub fn cluster_tiles(invalid_tiles: &[IntRect], density_threshold: f32) -> TileClusters {
    if invalid_tiles.len() <= 1 {
        return TileClusters {
            rects: invalid_tiles.to_vec(),
            density: 1.0,
        };
    }

    let mut vertical_order = invalid_tiles.to_vec();
    vertical_order.sort_by_key(|r| (r.y, r.x));
    let vertical = perform_clustering(&vertical_order, density_threshold);
    if vertical.density == 1.0 {
        return vertical;
    }

    let mut horizontal_order = invalid_tiles.to_vec();
    horizontal_order.sort_by_key(|r| (r.x, r.y));
    let horizontal = perform_clustering(&horizontal_order, density_threshold);

    if vertical.density < horizontal.density {
        horizontal
    } else {
        vertical
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pile/cluster.rs"]
mod tests;
