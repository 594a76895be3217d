//! SVG path data.
//!
//! Path strings are built into `lyon` paths, which resolve relative,
//! smooth and arc commands. Bounds and polylines are derived from the built
//! path.

use lyon::geom::ArcFlags;
use lyon::math::{point, vector, Angle};
use lyon::path::builder::{Build, SvgPathBuilder};
use lyon::path::iterator::*;
use lyon::path::{Event, Path};

/// Curve flattening tolerance, in canvas units.
const TOLERANCE: f32 = 0.1;

/// Polyline parsed from path data: points and closed flag.
pub type PathSegment = (Vec<[f64; 2]>, bool);

fn is_command(c: char) -> bool {
    matches!(
        c,
        'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'C' | 'c' | 'S' | 's' | 'Q' | 'q' | 'T'
            | 't' | 'A' | 'a' | 'Z' | 'z'
    )
}

fn tokenize(data: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in data.chars() {
        match ch {
            c if is_command(c) => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
            }
            c if c.is_whitespace() || c == ',' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '-' | '+' if !current.is_empty() && !current.ends_with(['e', 'E']) => {
                tokens.push(std::mem::take(&mut current));
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Build a `lyon` path from SVG path data.
///
/// Returns `None` for malformed data: a drawing command before the first
/// moveto, an unknown token or a command missing arguments.
pub fn build_path(data: &str) -> Option<Path> {
    let tokens = tokenize(data);
    let mut builder = Path::builder().with_svg();
    let mut index = 0;
    let mut command: Option<char> = None;
    let mut started = false;

    while index < tokens.len() {
        let token = &tokens[index];
        let current = match token.chars().next() {
            Some(c) if token.len() == 1 && is_command(c) => {
                index += 1;
                c
            }
            // Repeated arguments reuse the previous command; a moveto
            // continues as lineto.
            _ => match command? {
                'M' => 'L',
                'm' => 'l',
                'Z' | 'z' => return None,
                c => c,
            },
        };
        if !started && !matches!(current, 'M' | 'm') {
            return None;
        }
        started = true;
        command = Some(current);

        let arity = match current {
            'Z' | 'z' => 0,
            'H' | 'h' | 'V' | 'v' => 1,
            'M' | 'm' | 'L' | 'l' | 'T' | 't' => 2,
            'S' | 's' | 'Q' | 'q' => 4,
            'C' | 'c' => 6,
            _ => 7,
        };
        let args = tokens
            .get(index..index + arity)?
            .iter()
            .map(|t| t.parse::<f32>().ok())
            .collect::<Option<Vec<f32>>>()?;
        index += arity;

        match current {
            'M' => {
                builder.move_to(point(args[0], args[1]));
            }
            'm' => {
                builder.relative_move_to(vector(args[0], args[1]));
            }
            'L' => {
                builder.line_to(point(args[0], args[1]));
            }
            'l' => {
                builder.relative_line_to(vector(args[0], args[1]));
            }
            'H' => {
                builder.horizontal_line_to(args[0]);
            }
            'h' => {
                builder.relative_horizontal_line_to(args[0]);
            }
            'V' => {
                builder.vertical_line_to(args[0]);
            }
            'v' => {
                builder.relative_vertical_line_to(args[0]);
            }
            'C' => {
                builder.cubic_bezier_to(
                    point(args[0], args[1]),
                    point(args[2], args[3]),
                    point(args[4], args[5]),
                );
            }
            'c' => {
                builder.relative_cubic_bezier_to(
                    vector(args[0], args[1]),
                    vector(args[2], args[3]),
                    vector(args[4], args[5]),
                );
            }
            'S' => {
                builder.smooth_cubic_bezier_to(point(args[0], args[1]), point(args[2], args[3]));
            }
            's' => {
                builder.smooth_relative_cubic_bezier_to(
                    vector(args[0], args[1]),
                    vector(args[2], args[3]),
                );
            }
            'Q' => {
                builder.quadratic_bezier_to(point(args[0], args[1]), point(args[2], args[3]));
            }
            'q' => {
                builder.relative_quadratic_bezier_to(
                    vector(args[0], args[1]),
                    vector(args[2], args[3]),
                );
            }
            'T' => {
                builder.smooth_quadratic_bezier_to(point(args[0], args[1]));
            }
            't' => {
                builder.smooth_relative_quadratic_bezier_to(vector(args[0], args[1]));
            }
            'A' | 'a' => {
                let radii = vector(args[0], args[1]);
                let x_rotation = Angle::degrees(args[2]);
                let flags = ArcFlags {
                    large_arc: args[3] != 0.0,
                    sweep: args[4] != 0.0,
                };
                if current == 'A' {
                    builder.arc_to(radii, x_rotation, flags, point(args[5], args[6]));
                } else {
                    builder.relative_arc_to(radii, x_rotation, flags, vector(args[5], args[6]));
                }
            }
            _ => builder.close(),
        }
    }
    Some(builder.build())
}

/// Flatten path data into polylines, curves approximated by line segments.
///
/// Malformed data yields no segments.
pub fn parse_path_data(data: &str) -> Vec<PathSegment> {
    let Some(path) = build_path(data) else {
        return Vec::new();
    };
    let mut segments = Vec::new();
    let mut points: Vec<[f64; 2]> = Vec::new();
    for event in path.iter().flattened(TOLERANCE) {
        match event {
            Event::Begin { at } => {
                points.clear();
                points.push([f64::from(at.x), f64::from(at.y)]);
            }
            Event::Line { to, .. } => points.push([f64::from(to.x), f64::from(to.y)]),
            Event::End { close, .. } => {
                if !points.is_empty() {
                    segments.push((std::mem::take(&mut points), close));
                }
            }
            _ => {}
        }
    }
    segments
}

/// Axis-aligned bounds of path data: `(min_x, min_y, max_x, max_y)`.
pub fn path_bounds(data: &str) -> Option<(f64, f64, f64, f64)> {
    let path = build_path(data)?;
    path.iter().next()?;
    let bb = lyon::algorithms::aabb::bounding_box(path.iter());
    Some((
        f64::from(bb.min.x),
        f64::from(bb.min.y),
        f64::from(bb.max.x),
        f64::from(bb.max.y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bounds_within(data: &str, expected: (f64, f64, f64, f64), tolerance: f64) {
        let (x1, y1, x2, y2) = path_bounds(data).unwrap();
        for (got, want) in [(x1, expected.0), (y1, expected.1), (x2, expected.2), (y2, expected.3)] {
            assert!((got - want).abs() < tolerance, "{}: {} != {}", data, got, want);
        }
    }

    fn assert_bounds(data: &str, expected: (f64, f64, f64, f64)) {
        assert_bounds_within(data, expected, 1e-3);
    }

    #[test]
    fn test_parse_path_data() {
        let segments = parse_path_data("M 0 0 L 10 0 L 10 10 Z M 20,20 L 30,30");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].0.len(), 3);
        assert!(segments[0].1);
        assert_eq!(segments[1].0, vec![[20.0, 20.0], [30.0, 30.0]]);
        assert!(!segments[1].1);
    }

    #[test]
    fn test_line_bounds() {
        assert_bounds("M 5 -2 L 10 8 L -1 3", (-1.0, -2.0, 10.0, 8.0));
        assert_eq!(path_bounds(""), None);
    }

    #[test]
    fn test_horizontal_and_vertical_lines() {
        assert_bounds("M 0 0 H 10 V 10", (0.0, 0.0, 10.0, 10.0));
        assert_eq!(
            parse_path_data("M 0 0 H 10 V 10")[0].0,
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]
        );
    }

    #[test]
    fn test_relative_commands() {
        assert_bounds("m 5 5 l 10 0 l 0 10 h -20", (-5.0, 5.0, 15.0, 15.0));
        // Implicit lineto after a relative moveto
        assert_bounds("m 1 1 2 2 2 2", (1.0, 1.0, 5.0, 5.0));
    }

    #[test]
    fn test_curve_bounds_are_tight() {
        // The control point sits at y = 10; the curve peaks at y = 5.
        assert_bounds("M 0 0 Q 5 10 10 0", (0.0, 0.0, 10.0, 5.0));
        let segments = parse_path_data("M 0 0 C 0 10 10 10 10 0");
        assert!(segments[0].0.len() > 2);
    }

    #[test]
    fn test_arc_bounds() {
        // Half circle of radius 5 above the x axis (y down).
        // Arcs are approximated by curves, so allow a small error.
        assert_bounds_within("M 0 0 A 5 5 0 0 1 10 0", (0.0, -5.0, 10.0, 0.0), 0.05);
    }

    #[test]
    fn test_compact_numbers() {
        assert_bounds("M0,0L10-5", (0.0, -5.0, 10.0, 0.0));
        assert_bounds("M 1e1 0 L 0 0", (0.0, 0.0, 10.0, 0.0));
    }

    #[test]
    fn test_malformed_data() {
        assert!(build_path("L 1 1").is_none());
        assert!(build_path("M 0 0 L 1").is_none());
        assert!(build_path("M 0 0 X 1 1").is_none());
        assert!(parse_path_data("M 0 0 L oops 1").is_empty());
    }
}
