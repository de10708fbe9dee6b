//! CSS color strings used by map styles.
//!
//! Supported: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
//! `hsl()`, `hsla()` and a set of common named colors.

use tiny_skia::Color;

/// Parse a CSS color string.
///
/// Returns `None` for anything unrecognized; callers treat that the same as
/// an undeclared color.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();

    let rgba = if let Some(hex) = lower.strip_prefix('#') {
        parse_hex(hex)
    } else if lower.starts_with("rgb") {
        parse_rgb(&lower)
    } else if lower.starts_with("hsl") {
        parse_hsl(&lower)
    } else {
        named_color(&lower)
    }?;

    Color::from_rgba(
        rgba[0].clamp(0.0, 1.0),
        rgba[1].clamp(0.0, 1.0),
        rgba[2].clamp(0.0, 1.0),
        rgba[3].clamp(0.0, 1.0),
    )
}

fn hex_byte(s: &str) -> Option<f32> {
    u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0)
}

fn parse_hex(hex: &str) -> Option<[f32; 4]> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 | 4 => {
            let mut out = [1.0; 4];
            for (i, c) in hex.chars().enumerate() {
                out[i] = hex_byte(&c.to_string().repeat(2))?;
            }
            Some(out)
        }
        6 | 8 => {
            let mut out = [1.0; 4];
            for i in 0..hex.len() / 2 {
                out[i] = hex_byte(&hex[i * 2..i * 2 + 2])?;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Splits the argument list of `name(a, b, c[, d])`.
fn function_args<'a>(s: &'a str, prefixes: &[&str]) -> Option<Vec<&'a str>> {
    let open = s.find('(')?;
    let name = &s[..open];
    if !prefixes.contains(&name.trim()) {
        return None;
    }
    let inner = s[open + 1..].strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    Some(parts)
}

fn parse_alpha(parts: &[&str]) -> Option<f32> {
    match parts.get(3) {
        Some(a) => a.parse().ok(),
        None => Some(1.0),
    }
}

fn parse_rgb(s: &str) -> Option<[f32; 4]> {
    let parts = function_args(s, &["rgb", "rgba"])?;
    let mut out = [0.0; 4];
    for i in 0..3 {
        out[i] = match parts[i].strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
            None => parts[i].parse::<f32>().ok()? / 255.0,
        };
    }
    out[3] = parse_alpha(&parts)?;
    Some(out)
}

fn parse_hsl(s: &str) -> Option<[f32; 4]> {
    let parts = function_args(s, &["hsl", "hsla"])?;
    let h: f32 = parts[0].trim_end_matches("deg").parse().ok()?;
    let sat = parts[1].strip_suffix('%')?.trim().parse::<f32>().ok()? / 100.0;
    let light = parts[2].strip_suffix('%')?.trim().parse::<f32>().ok()? / 100.0;
    let (r, g, b) = hsl_to_rgb(h.rem_euclid(360.0) / 360.0, sat, light);
    Some([r, g, b, parse_alpha(&parts)?])
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn named_color(name: &str) -> Option<[f32; 4]> {
    let rgb: (u8, u8, u8) = match name {
        "transparent" => return Some([0.0, 0.0, 0.0, 0.0]),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        "tan" => (210, 180, 140),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        "khaki" => (240, 230, 140),
        "lightblue" => (173, 216, 230),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "darkgreen" => (0, 100, 0),
        "forestgreen" => (34, 139, 34),
        "skyblue" => (135, 206, 235),
        "steelblue" => (70, 130, 180),
        "wheat" => (245, 222, 179),
        "whitesmoke" => (245, 245, 245),
        _ => return None,
    };
    Some([
        rgb.0 as f32 / 255.0,
        rgb.1 as f32 / 255.0,
        rgb.2 as f32 / 255.0,
        1.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(c: Color) -> [u8; 4] {
        let c = c.to_color_u8();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(rgba8(parse_color("#fff").unwrap()), [255, 255, 255, 255]);
        assert_eq!(rgba8(parse_color("#0000ff").unwrap()), [0, 0, 255, 255]);
        assert_eq!(rgba8(parse_color("#FF000080").unwrap()), [255, 0, 0, 128]);
        assert_eq!(rgba8(parse_color("#0f08").unwrap()), [0, 255, 0, 136]);
        assert!(parse_color("#12").is_none());
        assert!(parse_color("#gggggg").is_none());
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(
            rgba8(parse_color("rgb(255, 0, 0)").unwrap()),
            [255, 0, 0, 255]
        );
        let c = parse_color("rgba(0, 255, 0, 0.5)").unwrap();
        assert!((c.alpha() - 0.5).abs() < 0.01);
        assert_eq!(
            rgba8(parse_color("rgb(100%, 0%, 0%)").unwrap()),
            [255, 0, 0, 255]
        );
        assert!(parse_color("rgb(1, 2)").is_none());
    }

    #[test]
    fn test_hsl_functions() {
        assert_eq!(
            rgba8(parse_color("hsl(0, 100%, 50%)").unwrap()),
            [255, 0, 0, 255]
        );
        assert_eq!(
            rgba8(parse_color("hsl(240, 100%, 50%)").unwrap()),
            [0, 0, 255, 255]
        );
        let c = parse_color("hsla(120, 100%, 25%, 0.25)").unwrap();
        assert!((c.alpha() - 0.25).abs() < 0.01);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(rgba8(parse_color("blue").unwrap()), [0, 0, 255, 255]);
        assert_eq!(rgba8(parse_color(" Red ").unwrap()), [255, 0, 0, 255]);
        assert_eq!(rgba8(parse_color("transparent").unwrap())[3], 0);
        assert!(parse_color("notacolor").is_none());
    }
}
