//! Polygon triangulation by ear clipping.
//!
//! Holes are first merged into the outer contour through a bridge edge (two
//! coincident seams), turning the polygon with holes into a single weakly simple
//! ring that is then clipped ear by ear.

use cgmath::Vector2;

const AREA_EPSILON: f32 = 1e-12;

/// Twice the signed area of the triangle `a`, `b`, `c` (positive when counter-clockwise).
fn orient(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Signed area of a closed polygon (positive when counter-clockwise).
pub fn signed_area(points: &[Vector2<f32>]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum::<f32>()
        * 0.5
}

fn ring_area(points: &[Vector2<f32>], ring: &[usize]) -> f32 {
    let ring: Vec<_> = ring.iter().map(|&i| points[i]).collect();
    signed_area(&ring)
}

fn contains(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>, p: Vector2<f32>) -> bool {
    let d1 = orient(p, a, b);
    let d2 = orient(p, b, c);
    let d3 = orient(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Build an index ring for `len` points starting at `offset`, dropping repeated points
/// (including a closing point equal to the first one).
fn ring(points: &[Vector2<f32>], offset: usize, len: usize) -> Vec<usize> {
    let mut ring: Vec<usize> = Vec::with_capacity(len);
    for i in offset..offset + len {
        if ring.last().is_some_and(|&last| points[last] == points[i]) {
            continue;
        }
        ring.push(i);
    }
    while ring.len() > 1 && points[ring[0]] == points[ring[ring.len() - 1]] {
        ring.pop();
    }
    ring
}

/// Triangulate a polygon given by its `contour` and any number of `holes`.
///
/// The returned triangles index into the concatenation `contour ++ holes[0] ++ holes[1] ...`
/// and are always wound counter-clockwise, regardless of the input orientation.
/// Contours with fewer than three distinct points yield no triangles.
pub fn triangulate(contour: &[Vector2<f32>], holes: &[Vec<Vector2<f32>>]) -> Vec<[usize; 3]> {
    let points: Vec<Vector2<f32>> = contour
        .iter()
        .chain(holes.iter().flatten())
        .copied()
        .collect();

    let mut outer = ring(&points, 0, contour.len());
    if outer.len() < 3 {
        return Vec::new();
    }
    if ring_area(&points, &outer) < 0.0 {
        outer.reverse();
    }

    let mut offset = contour.len();
    let mut hole_rings = Vec::with_capacity(holes.len());
    for hole in holes {
        let mut hole_ring = ring(&points, offset, hole.len());
        offset += hole.len();
        if hole_ring.len() < 3 {
            continue;
        }
        // holes run clockwise so the merged ring keeps a consistent orientation
        if ring_area(&points, &hole_ring) > 0.0 {
            hole_ring.reverse();
        }
        hole_rings.push(hole_ring);
    }

    // Bridging the rightmost hole first keeps later bridges from crossing earlier ones
    let max_x = |ring: &Vec<usize>| {
        ring.iter()
            .map(|&i| points[i].x)
            .fold(f32::NEG_INFINITY, f32::max)
    };
    hole_rings.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));
    for hole in hole_rings {
        outer = bridge(&points, outer, &hole);
    }

    clip_ears(&points, outer)
}

/// Merge `hole` into `outer` by connecting the hole's rightmost vertex with a visible
/// vertex of the outer ring.
fn bridge(points: &[Vector2<f32>], outer: Vec<usize>, hole: &[usize]) -> Vec<usize> {
    let (hole_start, m) = hole
        .iter()
        .enumerate()
        .map(|(pos, &i)| (pos, points[i]))
        .fold((0, points[hole[0]]), |best, (pos, p)| {
            if p.x > best.1.x { (pos, p) } else { best }
        });

    // Cast a ray towards +x and find the closest edge it hits
    let n = outer.len();
    let mut hit: Option<(f32, usize)> = None;
    for k in 0..n {
        let a = points[outer[k]];
        let b = points[outer[(k + 1) % n]];
        if a.y == b.y {
            if a.y == m.y {
                let (x, pos) = if a.x < b.x { (a.x, k) } else { (b.x, (k + 1) % n) };
                if x >= m.x && hit.is_none_or(|(best, _)| x < best) {
                    hit = Some((x, pos));
                }
            }
            continue;
        }
        if m.y < a.y.min(b.y) || m.y > a.y.max(b.y) {
            continue;
        }
        let x = a.x + (m.y - a.y) * (b.x - a.x) / (b.y - a.y);
        if x >= m.x && hit.is_none_or(|(best, _)| x < best) {
            let pos = if a.x > b.x { k } else { (k + 1) % n };
            hit = Some((x, pos));
        }
    }

    let target = match hit {
        Some((x, pos)) => {
            let intersection = Vector2::new(x, m.y);
            let candidate = points[outer[pos]];
            // A reflex vertex inside the triangle (m, intersection, candidate) would block
            // the view; the one closest in angle to the ray is visible instead.
            let mut best = pos;
            let mut best_key = (f32::INFINITY, f32::INFINITY);
            if candidate != intersection {
                for (k, &i) in outer.iter().enumerate() {
                    let p = points[i];
                    if k == pos || p.x < m.x || p == m {
                        continue;
                    }
                    if contains(m, intersection, candidate, p) {
                        let d = p - m;
                        let key = ((d.y / d.x.max(f32::MIN_POSITIVE)).abs(), d.x * d.x + d.y * d.y);
                        if key < best_key {
                            best_key = key;
                            best = k;
                        }
                    }
                }
            }
            best
        }
        None => {
            log::debug!("No outer edge right of a hole, bridging to the nearest vertex");
            outer
                .iter()
                .enumerate()
                .map(|(k, &i)| {
                    let d = points[i] - m;
                    (k, d.x * d.x + d.y * d.y)
                })
                .fold((0, f32::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
                .0
        }
    };

    let mut merged = Vec::with_capacity(outer.len() + hole.len() + 2);
    merged.extend_from_slice(&outer[..=target]);
    merged.extend_from_slice(&hole[hole_start..]);
    merged.extend_from_slice(&hole[..=hole_start]);
    merged.extend_from_slice(&outer[target..]);
    merged
}

fn clip_ears(points: &[Vector2<f32>], mut ring: Vec<usize>) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut start = 0;

    while ring.len() > 3 {
        let n = ring.len();
        let mut clipped = false;
        for step in 0..n {
            let k = (start + step) % n;
            let (a, b, c) = (ring[(k + n - 1) % n], ring[k], ring[(k + 1) % n]);
            let (pa, pb, pc) = (points[a], points[b], points[c]);
            let area = orient(pa, pb, pc);
            if area.abs() <= AREA_EPSILON {
                // collinear or a zero-width spike: drop the vertex, nothing to fill
                ring.remove(k);
                start = k % ring.len();
                clipped = true;
                break;
            }
            if area < 0.0 {
                continue;
            }
            let blocked = ring.iter().any(|&i| {
                let p = points[i];
                i != a && i != b && i != c && p != pa && p != pb && p != pc && contains(pa, pb, pc, p)
            });
            if blocked {
                continue;
            }
            triangles.push([a, b, c]);
            ring.remove(k);
            start = k % ring.len();
            clipped = true;
            break;
        }
        if !clipped {
            // Self-intersecting input: cut the first convex-looking corner to guarantee progress
            log::debug!("Ear clipping stalled with {} vertices left", ring.len());
            let k = start % n;
            let (a, b, c) = (ring[(k + n - 1) % n], ring[k], ring[(k + 1) % n]);
            if orient(points[a], points[b], points[c]) > 0.0 {
                triangles.push([a, b, c]);
            }
            ring.remove(k);
            start = k % ring.len();
        }
    }

    if let &[a, b, c] = ring.as_slice() {
        if orient(points[a], points[b], points[c]) > AREA_EPSILON {
            triangles.push([a, b, c]);
        }
    }
    triangles
}
