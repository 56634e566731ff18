use super::handle::Handle;

/// One arena slot. The generation advances every time the slot's element is
/// taken, which invalidates every handle minted for an earlier occupant.
#[derive(Clone)]
struct Slot<T> {
    generation: u32,
    entry: Option<T>,
}

/// A slab of elements addressed by generation-checked [`Handle`]s.
///
/// Freed slots are recycled through a free list. Accessing a slot through a
/// handle whose generation no longer matches panics rather than silently
/// returning the slot's new occupant.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(index) = self.free.pop() {
            // Reuse a free slot; its generation was already advanced on free.
            let slot = &mut self.slots[index];
            debug_assert!(slot.entry.is_none());
            slot.entry = Some(element);
            Handle::new(index, slot.generation)
        } else {
            // Use strict less-than so the slot count never exceeds Handle::MAX,
            // which means every slot index remains representable.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Slot {
                generation: 0,
                entry: Some(element),
            });
            Handle::new(self.slots.len() - 1, 0)
        }
    }

    /// Checks the handle's generation against its slot before any access.
    #[inline]
    fn check(slot: &Slot<T>, handle: Handle) {
        assert!(
            slot.generation == handle.generation(),
            "`Arena` - `handle` is stale (generation {} != {})!",
            handle.generation(),
            slot.generation
        );
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        let slot = &self.slots[handle.index()];
        Self::check(slot, handle);
        slot.entry.as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        let slot = &mut self.slots[handle.index()];
        Self::check(slot, handle);
        slot.entry.as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.index()];
        Self::check(slot, handle);
        let element = slot.entry.take().expect("`Arena::take()` - `handle` is invalid!");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        element
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn stale_handle_is_detected() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        arena.free(a);
        // The slot is recycled under a new generation; the old handle must
        // not alias the new occupant.
        let b = arena.alloc(2);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert_eq!(*arena.get(b), 2);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| arena.get(a)));
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "is stale")]
    fn take_through_stale_handle_panics() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        arena.free(a);
        arena.alloc(2);
        let _ = arena.take(a);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::Get(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        prop_assert_eq!(*arena.get(handle), model[index].1);
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        *arena.get_mut(handle) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        let value1 = arena.take(handle);
                        let (_, value2) = model.swap_remove(index);
                        prop_assert_eq!(value1, value2);
                    }
                    Operation::Free(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        arena.free(handle);
                        model.swap_remove(index);
                    }
                }

                prop_assert_eq!(arena.len(), model.len());

                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        Get(usize),
        GetMut(usize, u32),
        Take(usize),
        Free(usize),
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => any::<usize>().prop_map(Operation::Get),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            5 => any::<usize>().prop_map(Operation::Take),
            5 => any::<usize>().prop_map(Operation::Free),
        ]
    }
}
