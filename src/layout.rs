use crate::types::OverlayStyle;

/// The overlay's controls, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Space around the small controls; only drags
    Body,
    /// Temporary fade toggle
    Fade,
    PageUp,
    /// Long press closes the tab
    Center,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Half-open: the right and bottom edges belong to the next rect
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }
}

/// Window-local rectangles for each control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayout {
    pub width: i32,
    pub height: i32,
    controls: [(Control, Rect); 4],
}

impl OverlayLayout {
    /// Stack fade, up, center, down vertically; small controls are centered
    pub fn new(style: &OverlayStyle) -> Self {
        let main = style.main_size.max(1);
        let small = style.small_size.max(1);
        let small_x = (main - small) / 2;

        let fade = Rect { x: small_x, y: 0, width: small, height: small };
        let up = Rect { x: 0, y: fade.bottom(), width: main, height: main };
        let center = Rect { x: small_x, y: up.bottom(), width: small, height: small };
        let down = Rect { x: 0, y: center.bottom(), width: main, height: main };

        Self {
            width: main,
            height: down.bottom(),
            controls: [
                (Control::Fade, fade),
                (Control::PageUp, up),
                (Control::Center, center),
                (Control::PageDown, down),
            ],
        }
    }

    pub fn controls(&self) -> &[(Control, Rect)] {
        &self.controls
    }

    #[cfg(test)]
    pub fn rect(&self, control: Control) -> Option<Rect> {
        self.controls
            .iter()
            .find(|(c, _)| *c == control)
            .map(|(_, r)| *r)
    }

    /// Control under a window-local point; `None` outside the overlay
    pub fn hit_test(&self, x: i32, y: i32) -> Option<Control> {
        if !(Rect { x: 0, y: 0, width: self.width, height: self.height }).contains(x, y) {
            return None;
        }
        let control = self
            .controls
            .iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(c, _)| *c)
            .unwrap_or(Control::Body);
        Some(control)
    }
}
