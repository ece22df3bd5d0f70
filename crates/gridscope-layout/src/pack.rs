//! Sibling circle packing (front-chain algorithm).
//!
//! Circles are placed one at a time tangent to two circles of the current front chain, picking
//! the pair closest to the centroid of the packing so far. The chain is a doubly-linked ring
//! stored as `next`/`prev` index arrays.

use crate::circle::Circle;
use crate::enclose::enclose;
use crate::error::{Error, Result};

/// Positions `circles` so that no two overlap, centered on their smallest enclosing circle.
///
/// Radii are read from the input; `x`/`y` are overwritten. Returns the radius of the enclosing
/// circle (zero for empty input).
pub fn pack_siblings(circles: &mut [Circle]) -> Result<f64> {
    for (index, c) in circles.iter().enumerate() {
        if !(c.r.is_finite() && c.r >= 0.0) {
            return Err(Error::InvalidRadius {
                index,
                radius: c.r,
            });
        }
    }

    let n = circles.len();
    if n == 0 {
        return Ok(0.0);
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return Ok(circles[0].r);
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return Ok(center_on_enclosure(circles, &[0, 1]));
    }

    let (b0, a0) = (circles[1], circles[0]);
    place(b0, a0, &mut circles[2]);

    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    let (mut a, mut b) = (0usize, 1usize);
    next[0] = 1;
    prev[2] = 1;
    next[1] = 2;
    prev[0] = 2;
    next[2] = 0;
    prev[1] = 0;

    let mut i = 3usize;
    'pack: while i < n {
        let (ca, cb) = (circles[a], circles[b]);
        place(ca, cb, &mut circles[i]);
        let c = i;

        // Find the closest intersecting circle on the front chain, if any. Closeness is the
        // accumulated radius walked along the chain in either direction.
        let mut j = next[b];
        let mut k = prev[a];
        let mut sj = circles[b].r;
        let mut sk = circles[a].r;
        loop {
            if sj <= sk {
                if intersects(&circles[j], &circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(&circles[k], &circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        let mut best = score(circles, &next, a);
        let mut cur = next[c];
        while cur != b {
            let s = score(circles, &next, cur);
            if s < best {
                a = cur;
                best = s;
            }
            cur = next[cur];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![b];
    let mut cur = next[b];
    while cur != b {
        chain.push(cur);
        cur = next[cur];
    }
    Ok(center_on_enclosure(circles, &chain))
}

/// Places `c` tangent to both `a` and `b`.
fn place(b: Circle, a: Circle, c: &mut Circle) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 > 0.0 {
        let a2 = (a.r + c.r) * (a.r + c.r);
        let b2 = (b.r + c.r) * (b.r + c.r);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.x = b.x - x * dx - y * dy;
            c.y = b.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.x = a.x + x * dx - y * dy;
            c.y = a.y + x * dy + y * dx;
        }
    } else {
        c.x = a.x + c.r;
        c.y = a.y;
    }
}

fn intersects(a: &Circle, b: &Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted midpoint of `node` and its successor.
fn score(circles: &[Circle], next: &[usize], node: usize) -> f64 {
    let a = circles[node];
    let b = circles[next[node]];
    let ab = a.r + b.r;
    if ab == 0.0 {
        return a.x * a.x + a.y * a.y;
    }
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}

/// Translates every circle so that the enclosing circle of `boundary` sits at the origin.
fn center_on_enclosure(circles: &mut [Circle], boundary: &[usize]) -> f64 {
    let hull = boundary.iter().map(|&i| circles[i]).collect::<Vec<_>>();
    let e = match enclose(&hull) {
        Some(e) => e,
        None => {
            tracing::warn!(
                circles = hull.len(),
                "degenerate enclosing circle; falling back to a centroid bound"
            );
            centroid_bound(&hull)
        }
    };
    for c in circles.iter_mut() {
        c.translate(-e.x, -e.y);
    }
    e.r
}

fn centroid_bound(circles: &[Circle]) -> Circle {
    let n = circles.len().max(1) as f64;
    let cx = circles.iter().map(|c| c.x).sum::<f64>() / n;
    let cy = circles.iter().map(|c| c.y).sum::<f64>() / n;
    let center = Circle::new(cx, cy, 0.0);
    let r = circles
        .iter()
        .map(|c| center.distance_to(c) + c.r)
        .fold(0.0, f64::max);
    Circle::new(cx, cy, r)
}
