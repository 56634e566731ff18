use core::num::NonZero;

#[cfg(test)]
type RawIndex = u16;
#[cfg(not(test))]
type RawIndex = u32;

/// A copyable address of an arena slot, stamped with the generation the slot
/// carried when its current occupant was allocated.
///
/// The generation makes invalidation observable: once a slot's element is
/// taken, the slot's generation advances, and any handle minted for the old
/// occupant no longer matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct Handle {
    // Stored with a +1 offset so that `Option<Handle>` can use the niche.
    slot: NonZero<RawIndex>,
    generation: u32,
}

impl Handle {
    pub(crate) const MAX: usize = (RawIndex::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        assert!(index <= Self::MAX, "`Handle::new()` - `index` > `Handle::MAX`!");
        // The unwrap cannot fire: `index + 1` is nonzero and cannot overflow.
        Self {
            slot: NonZero::new((index + 1) as RawIndex).unwrap(),
            generation,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.slot.get() - 1) as usize
    }

    #[inline]
    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Verify our assumptions about the niche optimization on the slot index.
    assert_eq_size!(Handle, Option<Handle>);

    #[test]
    #[should_panic(expected = "`Handle::new()` - `index` > `Handle::MAX`!")]
    fn invalid_handle() {
        let _ = Handle::new(Handle::MAX + 1, 0);
    }

    proptest! {
        #[test]
        fn handle_round_trip(index in 0..=Handle::MAX, generation in any::<u32>()) {
            let handle = Handle::new(index, generation);
            assert_eq!(handle.index(), index);
            assert_eq!(handle.generation(), generation);
        }
    }
}
