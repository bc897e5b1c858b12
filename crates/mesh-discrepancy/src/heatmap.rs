//! Heat-map colouring of weighted vertices.
//!
//! Weights are shown on the usual weight-paint ramp: blue at 0, cyan, green
//! at 0.5, yellow, red at 1. The painted copy of the probe mesh can be saved
//! as PLY or OBJ with vertex colours.

use crate::types::{Mesh, VertexColor};
use crate::weight::WeightMap;

/// Colour for vertices that have no weight.
pub const UNPAINTED: VertexColor = VertexColor { r: 128, g: 128, b: 128 };

/// Map a weight in [0, 1] to a colour. Out-of-range weights are clamped and
/// NaN is treated as 0.
pub fn weight_to_color(weight: f64) -> VertexColor {
    let w = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };

    let (r, g, b) = if w < 0.25 {
        (0.0, w * 4.0, 1.0)
    } else if w < 0.5 {
        (0.0, 1.0, 1.0 - (w - 0.25) * 4.0)
    } else if w < 0.75 {
        ((w - 0.5) * 4.0, 1.0, 0.0)
    } else {
        (1.0, 1.0 - (w - 0.75) * 4.0, 0.0)
    };

    VertexColor::from_float(r, g, b)
}

/// Return a copy of `mesh` with vertex colours taken from `weights`.
///
/// Vertices without a weight get `unpainted`. Weight entries past the end of
/// the vertex list are ignored.
pub fn paint_heatmap(mesh: &Mesh, weights: &WeightMap, unpainted: VertexColor) -> Mesh {
    let mut painted = mesh.clone();
    for vertex in &mut painted.vertices {
        vertex.color = Some(unpainted);
    }
    for (index, weight) in weights.iter() {
        if let Some(vertex) = painted.vertices.get_mut(index) {
            vertex.color = Some(weight_to_color(weight));
        }
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrepancy::DistanceField;
    use crate::types::Vertex;
    use crate::weight::{MissingDistancePolicy, ThresholdConfig, build_weight_map};

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(weight_to_color(0.0), VertexColor::new(0, 0, 255));
        assert_eq!(weight_to_color(0.5), VertexColor::new(0, 255, 0));
        assert_eq!(weight_to_color(1.0), VertexColor::new(255, 0, 0));
        assert_eq!(weight_to_color(0.25), VertexColor::new(0, 255, 255));
        assert_eq!(weight_to_color(0.75), VertexColor::new(255, 255, 0));
    }

    #[test]
    fn test_ramp_clamps() {
        assert_eq!(weight_to_color(-3.0), weight_to_color(0.0));
        assert_eq!(weight_to_color(7.0), weight_to_color(1.0));
        assert_eq!(weight_to_color(f64::NAN), weight_to_color(0.0));
    }

    #[test]
    fn test_paint_heatmap() {
        let mut mesh = Mesh::new();
        for i in 0..3 {
            mesh.vertices.push(Vertex::from_coords(i as f64, 0.0, 0.0));
        }
        let field: DistanceField = vec![Some(1.0), None, Some(0.0)];
        let weights = build_weight_map(&field, &ThresholdConfig::default(), MissingDistancePolicy::Skip);

        let painted = paint_heatmap(&mesh, &weights, UNPAINTED);

        assert_eq!(painted.vertices[0].color, Some(VertexColor::new(255, 0, 0)));
        assert_eq!(painted.vertices[1].color, Some(UNPAINTED));
        assert_eq!(painted.vertices[2].color, Some(weight_to_color(0.01)));
        assert!(mesh.vertices.iter().all(|v| v.color.is_none()));
    }
}
