use crate::config::OverlaySettings;
use crate::constants::positioning;
use crate::types::{Position, ScreenSize};

/// Bound a candidate position to `[0, width] × [0, height]`
pub fn clamp_to_screen(position: Position, screen: ScreenSize) -> Position {
    Position {
        x: position.x.clamp(0, screen.width.max(0)),
        y: position.y.clamp(0, screen.height.max(0)),
    }
}

/// Position used when no drag position is remembered
/// Screen fraction anchor, overridden per axis by explicit defaults, then shifted by the Y offset
pub fn default_position(settings: &OverlaySettings, screen: ScreenSize) -> Position {
    let anchor = |extent: i32| (extent as f64 * positioning::DEFAULT_SCREEN_FRACTION) as i32;

    let x = if settings.default_x == positioning::UNSET {
        anchor(screen.width)
    } else {
        settings.default_x
    };
    let y = if settings.default_y == positioning::UNSET {
        anchor(screen.height)
    } else {
        settings.default_y
    };

    Position::new(x, y.saturating_add(settings.default_offset_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: ScreenSize = ScreenSize { width: 1080, height: 1920 };

    #[test]
    fn test_default_position_uses_screen_fraction_and_offset() {
        let settings = OverlaySettings::default();
        assert_eq!(default_position(&settings, PHONE), Position::new(864, 1416));
    }

    #[test]
    fn test_default_position_explicit_axes() {
        let settings = OverlaySettings {
            default_x: 100,
            default_y: 500,
            default_offset_y: -20,
            ..OverlaySettings::default()
        };
        // Offset still applies to an explicit Y
        assert_eq!(default_position(&settings, PHONE), Position::new(100, 480));
    }

    #[test]
    fn test_default_position_mixed_axes() {
        let settings = OverlaySettings {
            default_x: -1,
            default_y: 300,
            default_offset_y: 0,
            ..OverlaySettings::default()
        };
        assert_eq!(default_position(&settings, PHONE), Position::new(864, 300));
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let p = Position::new(10, 20);
        assert_eq!(clamp_to_screen(p, PHONE), p);
    }

    #[test]
    fn test_clamp_edges_are_inclusive() {
        assert_eq!(clamp_to_screen(Position::new(1080, 1920), PHONE), Position::new(1080, 1920));
        assert_eq!(clamp_to_screen(Position::new(0, 0), PHONE), Position::new(0, 0));
    }

    #[test]
    fn test_clamp_out_of_bounds() {
        assert_eq!(clamp_to_screen(Position::new(-50, 5000), PHONE), Position::new(0, 1920));
        assert_eq!(clamp_to_screen(Position::new(2000, -1), PHONE), Position::new(1080, 0));
    }
}
