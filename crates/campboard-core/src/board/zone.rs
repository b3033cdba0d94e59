//! Drop-target registry and pointer hit-testing.
//!
//! Zones are re-registered every frame in render order. When several zone
//! rectangles contain the pointer, the zone whose center is nearest wins;
//! equal distances go to the zone registered first.

use std::fmt;

/// Identity of a drop target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneId {
    /// The unassigned-camper pool
    Pool,
    /// One bunk's roster
    Bunk(String),
    /// The pool of counselors without a bunk
    CounselorPool,
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneId::Pool => write!(f, "pool"),
            ZoneId::Bunk(id) => write!(f, "bunk:{}", id),
            ZoneId::CounselorPool => write!(f, "counselor-pool"),
        }
    }
}

/// Screen rectangle in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && y >= self.y
            && (x as u32) < self.x as u32 + self.width as u32
            && (y as u32) < self.y as u32 + self.height as u32
    }

    /// Center in doubled coordinates so odd sizes stay exact in integers
    fn center_x2(&self) -> (i64, i64) {
        (
            2 * self.x as i64 + self.width as i64,
            2 * self.y as i64 + self.height as i64,
        )
    }

    fn distance_sq_to(&self, x: u16, y: u16) -> i64 {
        let (cx, cy) = self.center_x2();
        // Sample the middle of the pointer's cell
        let dx = cx - (2 * x as i64 + 1);
        let dy = cy - (2 * y as i64 + 1);
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone)]
struct RegisteredZone {
    id: ZoneId,
    rect: Rect,
}

/// All drop targets currently on screen plus the one the pointer is over.
#[derive(Debug, Default)]
pub struct ZoneRegistry {
    zones: Vec<RegisteredZone>,
    over: Option<ZoneId>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every registration. Called before re-registering a frame's layout.
    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// Register a zone. A second registration of the same id replaces the rect
    /// but keeps the original registration order.
    pub fn register(&mut self, id: ZoneId, rect: Rect) {
        if let Some(existing) = self.zones.iter_mut().find(|z| z.id == id) {
            existing.rect = rect;
        } else {
            self.zones.push(RegisteredZone { id, rect });
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Best drop candidate under the pointer, without touching `over`.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<&ZoneId> {
        let mut best: Option<(&RegisteredZone, i64)> = None;
        for zone in self.zones.iter().filter(|z| z.rect.contains(x, y)) {
            let dist = zone.rect.distance_sq_to(x, y);
            // Strict less-than keeps the earliest registration on ties
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((zone, dist)),
            }
        }
        best.map(|(zone, _)| &zone.id)
    }

    /// Move the pointer and recompute which zone it is over.
    pub fn update_pointer(&mut self, x: u16, y: u16) -> Option<&ZoneId> {
        self.over = self.hit_test(x, y).cloned();
        self.over.as_ref()
    }

    /// The zone that last reported the pointer over it
    pub fn over(&self) -> Option<&ZoneId> {
        self.over.as_ref()
    }

    /// Forget the hover state at the end of a gesture.
    pub fn reset_pointer(&mut self) {
        self.over = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bunk(id: &str) -> ZoneId {
        ZoneId::Bunk(id.to_string())
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(2, 3, 4, 2);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 4));
        assert!(!r.contains(6, 4)); // Right edge is exclusive
        assert!(!r.contains(5, 5)); // Bottom edge is exclusive
        assert!(!r.contains(1, 3));
        assert!(!Rect::new(0, 0, 0, 0).contains(0, 0));
    }

    #[test]
    fn test_hit_test_single_zone() {
        let mut reg = ZoneRegistry::new();
        reg.register(ZoneId::Pool, Rect::new(0, 0, 20, 10));
        reg.register(bunk("B1"), Rect::new(30, 0, 20, 10));

        assert_eq!(reg.hit_test(5, 5), Some(&ZoneId::Pool));
        assert_eq!(reg.hit_test(35, 5), Some(&bunk("B1")));
        assert_eq!(reg.hit_test(25, 5), None);
    }

    #[test]
    fn test_hit_test_overlap_prefers_nearest_center() {
        let mut reg = ZoneRegistry::new();
        // Outer container registered first, inner bunk nested inside it
        reg.register(ZoneId::Pool, Rect::new(0, 0, 40, 20));
        reg.register(bunk("B1"), Rect::new(2, 2, 6, 4));

        // Near the bunk's center: bunk wins even though it registered later
        assert_eq!(reg.hit_test(4, 3), Some(&bunk("B1")));
        // Near the pool's center: not inside the bunk at all
        assert_eq!(reg.hit_test(20, 10), Some(&ZoneId::Pool));
    }

    #[test]
    fn test_hit_test_tie_goes_to_first_registered() {
        let mut reg = ZoneRegistry::new();
        reg.register(bunk("B1"), Rect::new(0, 0, 10, 10));
        reg.register(bunk("B2"), Rect::new(0, 0, 10, 10));

        assert_eq!(reg.hit_test(3, 3), Some(&bunk("B1")));
    }

    #[test]
    fn test_register_same_id_keeps_order() {
        let mut reg = ZoneRegistry::new();
        reg.register(bunk("B1"), Rect::new(0, 0, 10, 10));
        reg.register(bunk("B2"), Rect::new(0, 0, 10, 10));
        reg.register(bunk("B1"), Rect::new(0, 0, 10, 10));

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.hit_test(3, 3), Some(&bunk("B1")));
    }

    #[test]
    fn test_update_pointer_tracks_last_over() {
        let mut reg = ZoneRegistry::new();
        reg.register(bunk("B1"), Rect::new(0, 0, 10, 10));

        reg.update_pointer(5, 5);
        assert_eq!(reg.over(), Some(&bunk("B1")));

        // Leaving every zone clears the candidate
        reg.update_pointer(50, 50);
        assert_eq!(reg.over(), None);

        reg.update_pointer(1, 1);
        reg.reset_pointer();
        assert_eq!(reg.over(), None);
    }

    #[test]
    fn test_clear_keeps_hover_until_next_pointer_update() {
        let mut reg = ZoneRegistry::new();
        reg.register(ZoneId::CounselorPool, Rect::new(0, 0, 10, 10));
        reg.update_pointer(2, 2);
        reg.clear();

        assert!(reg.is_empty());
        assert_eq!(reg.over(), Some(&ZoneId::CounselorPool));
        assert_eq!(reg.update_pointer(2, 2), None);
    }
}
