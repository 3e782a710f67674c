/// Color matrix utilities
///
/// The filter primitives that mix channels (grayscale, sepia, saturate,
/// hue-rotate) are 3x3 linear transforms on normalized RGB. The matrices
/// below are the ones defined by the W3C Filter Effects module, so a
/// composition string renders the same way a browser would draw it.

use cgmath::{Matrix3, Vector3};

/// Luminance weights used by the saturate and hue-rotate matrices
const LUMA: [f32; 3] = [0.213, 0.715, 0.072];

/// Build a cgmath matrix from row-major rows
///
/// cgmath stores matrices column-major, so `Matrix3::new` takes its
/// arguments column by column.
pub fn from_rows(rows: [[f32; 3]; 3]) -> Matrix3<f32> {
    Matrix3::new(
        rows[0][0], rows[1][0], rows[2][0], // Column 0
        rows[0][1], rows[1][1], rows[2][1], // Column 1
        rows[0][2], rows[1][2], rows[2][2], // Column 2
    )
}

/// grayscale(amount), amount clamped to [0, 1]
pub fn grayscale_matrix(amount: f32) -> Matrix3<f32> {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    from_rows([
        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
    ])
}

/// sepia(amount), amount clamped to [0, 1]
pub fn sepia_matrix(amount: f32) -> Matrix3<f32> {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    from_rows([
        [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
        [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
    ])
}

/// saturate(amount), negative amounts treated as 0
pub fn saturate_matrix(amount: f32) -> Matrix3<f32> {
    let s = amount.max(0.0);
    let [r, g, b] = LUMA;
    from_rows([
        [r + (1.0 - r) * s, g - g * s, b - b * s],
        [r - r * s, g + (1.0 - g) * s, b - b * s],
        [r - r * s, g - g * s, b + (1.0 - b) * s],
    ])
}

/// hue-rotate(degrees)
pub fn hue_rotate_matrix(degrees: f32) -> Matrix3<f32> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    from_rows([
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ])
}

/// Apply a color matrix to a normalized RGB triple, clamping the result
pub fn apply_matrix(matrix: &Matrix3<f32>, rgb: [f32; 3]) -> [f32; 3] {
    let out = matrix * Vector3::new(rgb[0], rgb[1], rgb[2]);
    [
        out.x.clamp(0.0, 1.0),
        out.y.clamp(0.0, 1.0),
        out.z.clamp(0.0, 1.0),
    ]
}

/// Check if a color matrix is the identity matrix (no conversion)
pub fn is_identity_matrix(matrix: &Matrix3<f32>) -> bool {
    const EPSILON: f32 = 0.001;

    for col in 0..3 {
        for row in 0..3 {
            let expected = if col == row { 1.0 } else { 0.0 };
            if (matrix[col][row] - expected).abs() > EPSILON {
                return false;
            }
        }
    }
    true
}

/// Parse a `#rrggbb` or `#rgb` hex color into opaque RGBA
pub fn parse_hex(text: &str) -> Option<[u8; 4]> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ]),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some([expand(0)?, expand(1)?, expand(2)?, 255])
        }
        _ => None,
    }
}

/// Linear interpolation between two RGBA colors
pub fn lerp_rgba(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), mix(a[3], b[3])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_amounts_are_identity() {
        assert!(is_identity_matrix(&grayscale_matrix(0.0)));
        assert!(is_identity_matrix(&sepia_matrix(0.0)));
        assert!(is_identity_matrix(&saturate_matrix(1.0)));
        assert!(is_identity_matrix(&hue_rotate_matrix(0.0)));
        assert!(!is_identity_matrix(&sepia_matrix(1.0)));
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let out = apply_matrix(&grayscale_matrix(1.0), [1.0, 0.0, 0.0]);
        assert!((out[0] - out[1]).abs() < 1e-4);
        assert!((out[1] - out[2]).abs() < 1e-4);
        assert!((out[0] - 0.2126).abs() < 1e-3);
    }

    #[test]
    fn test_from_rows_keeps_row_major_meaning() {
        let m = from_rows([[1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        let out = m * Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(out.x, 6.0);
        assert_eq!(out.y, 1.0);
    }

    #[test]
    fn test_apply_matrix_clamps() {
        let out = apply_matrix(&saturate_matrix(10.0), [1.0, 0.0, 0.0]);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ff6b6b"), Some([255, 107, 107, 255]));
        assert_eq!(parse_hex("#fff"), Some([255, 255, 255, 255]));
        assert_eq!(parse_hex("ff6b6b"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(parse_hex("#€"), None);
        assert_eq!(parse_hex("#a€bc"), None);
        assert_eq!(parse_hex("#ab€"), None);
    }

    #[test]
    fn test_lerp_rgba() {
        let mid = lerp_rgba([0, 0, 0, 255], [200, 100, 50, 255], 0.5);
        assert_eq!(mid, [100, 50, 25, 255]);
    }
}
