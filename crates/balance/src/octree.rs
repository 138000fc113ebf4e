//! Octree point index for nearest-neighbour queries.
//!
//! The index is built once per query batch and discarded. Nodes split into
//! eight octants while they hold more than [`MAX_POINTS_PER_LEAF`] points and
//! are larger than the minimum cell size; nearest-neighbour search visits the
//! query's own octant first and skips siblings whose box is farther than the
//! best distance found so far.

use nalgebra::Point3;

/// Maximum number of points stored in a leaf.
pub const MAX_POINTS_PER_LEAF: usize = 8;

/// Maximum subdivision depth.
pub const MAX_DEPTH: usize = 32;

/// Axis-aligned cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    /// Center of the cube.
    pub center: [f64; 3],
    /// Half the edge length.
    pub half_size: f64,
}

impl Cube {
    /// Octant index of `p` relative to the center (bit 0 = x, 1 = y, 2 = z).
    fn octant_of(&self, p: &Point3<f64>) -> usize {
        let mut idx = 0;
        if p.x >= self.center[0] {
            idx |= 1;
        }
        if p.y >= self.center[1] {
            idx |= 2;
        }
        if p.z >= self.center[2] {
            idx |= 4;
        }
        idx
    }

    fn child(&self, octant: usize) -> Cube {
        let q = self.half_size * 0.5;
        let offset = |bit: usize| if octant & bit != 0 { q } else { -q };
        Cube {
            center: [
                self.center[0] + offset(1),
                self.center[1] + offset(2),
                self.center[2] + offset(4),
            ],
            half_size: q,
        }
    }

    /// Squared distance from `p` to the cube (0 if inside).
    pub fn squared_distance(&self, p: &Point3<f64>) -> f64 {
        let coords = [p.x, p.y, p.z];
        let mut d2 = 0.0;
        for axis in 0..3 {
            let lo = self.center[axis] - self.half_size;
            let hi = self.center[axis] + self.half_size;
            let v = coords[axis];
            let d = if v < lo {
                lo - v
            } else if v > hi {
                v - hi
            } else {
                0.0
            };
            d2 += d * d;
        }
        d2
    }
}

#[derive(Debug)]
enum Node {
    Leaf(Vec<usize>),
    Branch(Box<[Option<Box<(Cube, Node)>>; 8]>),
}

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point in the slice the octree was built from.
    pub index: usize,
    /// Squared Euclidean distance to the query.
    pub squared_distance: f64,
}

/// Point octree.
#[derive(Debug)]
pub struct Octree {
    points: Vec<Point3<f64>>,
    root: Option<(Cube, Node)>,
    min_half_size: f64,
}

impl Octree {
    /// Builds an octree over `points`.
    pub fn build(points: &[Point3<f64>]) -> Self {
        let points = points.to_vec();
        if points.is_empty() {
            return Self {
                points,
                root: None,
                min_half_size: 0.0,
            };
        }

        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for p in &points {
            for (axis, v) in [p.x, p.y, p.z].into_iter().enumerate() {
                lo[axis] = lo[axis].min(v);
                hi[axis] = hi[axis].max(v);
            }
        }
        let center = [
            0.5 * (lo[0] + hi[0]),
            0.5 * (lo[1] + hi[1]),
            0.5 * (lo[2] + hi[2]),
        ];
        let extent = (0..3).map(|a| hi[a] - lo[a]).fold(0.0, f64::max);
        // Pad so points on the max face fall inside.
        let half_size = (0.5 * extent).max(1e-9) * (1.0 + 1e-9);
        let cube = Cube { center, half_size };
        let min_half_size = half_size * 1e-6;

        let indices: Vec<usize> = (0..points.len()).collect();
        let root = build_node(&points, cube, indices, 0, min_half_size);
        Self {
            points,
            root: Some((cube, root)),
            min_half_size,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no points are indexed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest half-size a node may be split down to.
    pub fn min_half_size(&self) -> f64 {
        self.min_half_size
    }

    /// Finds the point closest to `query`, or `None` for an empty index.
    pub fn nearest_neighbor(&self, query: &Point3<f64>) -> Option<Neighbor> {
        let (cube, node) = self.root.as_ref()?;
        let mut best: Option<Neighbor> = None;
        self.search(cube, node, query, &mut best);
        best
    }

    fn search(&self, cube: &Cube, node: &Node, query: &Point3<f64>, best: &mut Option<Neighbor>) {
        match node {
            Node::Leaf(indices) => {
                for &index in indices {
                    let d2 = (self.points[index] - query).norm_squared();
                    if best.map_or(true, |b| d2 < b.squared_distance) {
                        *best = Some(Neighbor {
                            index,
                            squared_distance: d2,
                        });
                    }
                }
            }
            Node::Branch(children) => {
                let home = cube.octant_of(query);
                if let Some(child) = &children[home] {
                    self.search(&child.0, &child.1, query, best);
                }

                let mut siblings: Vec<(f64, &(Cube, Node))> = children
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != home)
                    .filter_map(|(_, c)| c.as_deref())
                    .map(|c| (c.0.squared_distance(query), c))
                    .collect();
                siblings.sort_by(|a, b| a.0.total_cmp(&b.0));

                for (d2, child) in siblings {
                    if best.is_some_and(|b| d2 >= b.squared_distance) {
                        break;
                    }
                    self.search(&child.0, &child.1, query, best);
                }
            }
        }
    }
}

fn build_node(
    points: &[Point3<f64>],
    cube: Cube,
    indices: Vec<usize>,
    depth: usize,
    min_half_size: f64,
) -> Node {
    if indices.len() <= MAX_POINTS_PER_LEAF || cube.half_size <= min_half_size || depth >= MAX_DEPTH
    {
        return Node::Leaf(indices);
    }

    let mut buckets: [Vec<usize>; 8] = Default::default();
    for index in indices {
        buckets[cube.octant_of(&points[index])].push(index);
    }

    let mut children: [Option<Box<(Cube, Node)>>; 8] = Default::default();
    for (octant, bucket) in buckets.into_iter().enumerate() {
        if bucket.is_empty() {
            continue;
        }
        let child_cube = cube.child(octant);
        let child = build_node(points, child_cube, bucket, depth + 1, min_half_size);
        children[octant] = Some(Box::new((child_cube, child)));
    }
    Node::Branch(Box::new(children))
}
