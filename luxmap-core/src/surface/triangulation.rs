//! Bowyer-Watson Delaunay triangulation of scattered 2D points.

/// Triangle as indices into the point list, counter-clockwise.
pub type Triangle = [usize; 3];

#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<(f64, f64)>,
    pub triangles: Vec<Triangle>,
}

const AREA_EPS: f64 = 1e-12;

fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Positive when `p` lies strictly inside the circumcircle of the ccw triangle `a b c`.
fn in_circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64), p: (f64, f64)) -> f64 {
    let (ax, ay) = (a.0 - p.0, a.1 - p.1);
    let (bx, by) = (b.0 - p.0, b.1 - p.1);
    let (cx, cy) = (c.0 - p.0, c.1 - p.1);
    (ax * ax + ay * ay) * (bx * cy - cx * by) - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay)
}

impl Triangulation {
    /// Triangulates `points`. Fewer than three non-collinear points give no triangles.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        if points.len() < 3 {
            return Self {
                points,
                triangles: Vec::new(),
            };
        }

        let (min_x, max_x, min_y, max_y) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(a, b, c, d), &(x, y)| (a.min(x), b.max(x), c.min(y), d.max(y)),
        );
        let span = (max_x - min_x).max(max_y - min_y).max(1.0);
        let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

        let n = points.len();
        let mut all = points.clone();
        all.push((mid_x - 100.0 * span, mid_y - 100.0 * span));
        all.push((mid_x + 100.0 * span, mid_y - 100.0 * span));
        all.push((mid_x, mid_y + 100.0 * span));

        let mut triangles: Vec<Triangle> = vec![[n, n + 1, n + 2]];

        for i in 0..n {
            let p = all[i];
            let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
                .into_iter()
                .partition(|t| in_circumcircle(all[t[0]], all[t[1]], all[t[2]], p) > 0.0);
            triangles = good;

            // Cavity boundary: edges of bad triangles not shared with another bad triangle.
            let mut boundary: Vec<(usize, usize)> = Vec::new();
            for t in &bad {
                for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                    if let Some(pos) = boundary.iter().position(|&(u, v)| u == b && v == a) {
                        boundary.swap_remove(pos);
                    } else {
                        boundary.push((a, b));
                    }
                }
            }

            for (a, b) in boundary {
                if orient(all[a], all[b], p).abs() > AREA_EPS {
                    triangles.push([a, b, i]);
                }
            }
        }

        triangles.retain(|t| t.iter().all(|&v| v < n));

        Self {
            points,
            triangles,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangle containing `(x, y)` and the barycentric weights of its vertices.
    pub fn locate(&self, x: f64, y: f64) -> Option<(Triangle, [f64; 3])> {
        const EDGE_TOL: f64 = 1e-10;
        self.triangles.iter().find_map(|t| {
            let (a, b, c) = (self.points[t[0]], self.points[t[1]], self.points[t[2]]);
            let area = orient(a, b, c);
            if area.abs() <= AREA_EPS {
                return None;
            }
            let l0 = orient(b, c, (x, y)) / area;
            let l1 = orient(c, a, (x, y)) / area;
            let l2 = 1.0 - l0 - l1;
            if l0 >= -EDGE_TOL && l1 >= -EDGE_TOL && l2 >= -EDGE_TOL {
                Some((*t, [l0, l1, l2]))
            } else {
                None
            }
        })
    }

    /// Distinct vertices sharing a triangle with `vertex`.
    pub fn neighbours(&self, vertex: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .triangles
            .iter()
            .filter(|t| t.contains(&vertex))
            .flat_map(|t| t.iter().copied())
            .filter(|&v| v != vertex)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
