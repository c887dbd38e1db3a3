/// Transient visual cue the render layer maps to an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VisualFlag {
    Pop = 0,
    Bump = 1,
    Pause = 2,
    Surprised = 3,
    HappyBounce = 4,
    Celebrate = 5,
}

/// Set of active [`VisualFlag`]s, packed into one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualFlags(u8);

const REACTIONS: u8 = (1 << VisualFlag::Surprised as u8)
    | (1 << VisualFlag::HappyBounce as u8)
    | (1 << VisualFlag::Celebrate as u8);

impl VisualFlags {
    pub fn insert(&mut self, flag: VisualFlag) {
        self.0 |= 1 << flag as u8;
    }

    pub fn remove(&mut self, flag: VisualFlag) {
        self.0 &= !(1 << flag as u8);
    }

    pub fn contains(&self, flag: VisualFlag) -> bool {
        self.0 & (1 << flag as u8) != 0
    }

    /// Drop the click-reaction animations, keeping pop/bump/pause.
    pub fn remove_reactions(&mut self) {
        self.0 &= !REACTIONS;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw bits, one per flag discriminant.
    pub fn bits(&self) -> u32 {
        self.0 as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reactions_cleared_together() {
        let mut flags = VisualFlags::default();
        flags.insert(VisualFlag::Bump);
        flags.insert(VisualFlag::Celebrate);
        flags.insert(VisualFlag::Surprised);
        flags.remove_reactions();
        assert!(flags.contains(VisualFlag::Bump));
        assert!(!flags.contains(VisualFlag::Celebrate));
        assert!(!flags.contains(VisualFlag::Surprised));
        assert_eq!(flags.bits(), 0b10);
    }
}
