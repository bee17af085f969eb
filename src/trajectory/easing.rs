//! Easing curves for the fall

/// Quadratic ease-in over `t` in `[0, 1]`; slow start, accelerating finish
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(ease_in(0.0), 0.0);
        assert_eq!(ease_in(1.0), 1.0);
        assert_eq!(ease_in(-3.0), 0.0);
        assert_eq!(ease_in(7.0), 1.0);
    }

    #[test]
    fn test_accelerates() {
        let early = ease_in(0.2) - ease_in(0.1);
        let late = ease_in(1.0) - ease_in(0.9);
        assert!(late > early);
    }
}
