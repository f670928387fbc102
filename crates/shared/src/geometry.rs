use glam::DVec2;

/// Bearing from `from` to `to` in degrees, normalized to [0, 360).
pub fn bearing_deg(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    normalize_deg(d.y.atan2(d.x).to_degrees())
}

/// Wrap any angle in degrees into [0, 360).
pub fn normalize_deg(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Clockwise difference `a - b` in degrees, normalized to [0, 360).
pub fn bearing_delta(a: f64, b: f64) -> f64 {
    normalize_deg(a - b)
}

/// Unit vector for a heading in degrees.
pub fn heading(angle_deg: f64) -> DVec2 {
    let r = angle_deg.to_radians();
    DVec2::new(r.cos(), r.sin())
}

/// Point on the line from `from` towards `center` that sits `margin` outside a
/// circle of `radius` around `center`.
pub fn closest_point_to(from: DVec2, center: DVec2, radius: f64, margin: f64) -> DVec2 {
    let offset = from - center;
    let len = offset.length();
    if len <= f64::EPSILON {
        return center + DVec2::new(radius + margin, 0.0);
    }
    center + offset / len * (radius + margin)
}

/// True when the segment `start`..`end` passes within `radius` of `center`.
pub fn segment_hits_circle(start: DVec2, end: DVec2, center: DVec2, radius: f64) -> bool {
    let seg = end - start;
    let len_sq = seg.length_squared();
    if len_sq <= f64::EPSILON {
        return start.distance(center) <= radius;
    }
    let t = ((center - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = start + seg * t;
    closest.distance(center) <= radius
}
