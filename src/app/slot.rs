use std::sync::Arc;

use log::debug;

/// A render resource derived from one shared result value. The scene is rebuilt only
/// when the result is replaced, and the previous scene is dropped before its successor
/// is built.
pub(in crate::app) struct SceneSlot<I, S> {
    source: Option<Arc<I>>,
    scene: Option<S>,
    builds: usize,
}

impl<I, S> Default for SceneSlot<I, S> {
    fn default() -> Self {
        Self {
            source: None,
            scene: None,
            builds: 0,
        }
    }
}

impl<I, S> SceneSlot<I, S> {
    pub(in crate::app) fn sync(&mut self, source: &Arc<I>, build: impl FnOnce(&I) -> S) -> &mut S {
        let current = self
            .source
            .as_ref()
            .is_some_and(|held| Arc::ptr_eq(held, source));

        if !current || self.scene.is_none() {
            self.scene = None;
            self.source = Some(Arc::clone(source));
            self.builds += 1;
            debug!("rebuilding scene (build #{})", self.builds);
        }
        self.scene.get_or_insert_with(|| build(source))
    }

    pub(in crate::app) fn clear(&mut self) {
        self.scene = None;
        self.source = None;
    }

    #[cfg(test)]
    pub(in crate::app) fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    #[cfg(test)]
    pub(in crate::app) fn builds(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    struct Tracked {
        alive: Rc<Cell<usize>>,
        value: i32,
    }

    impl Tracked {
        fn new(alive: &Rc<Cell<usize>>, value: i32) -> Self {
            alive.set(alive.get() + 1);
            Self {
                alive: Rc::clone(alive),
                value,
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.alive.set(self.alive.get() - 1);
        }
    }

    #[test]
    fn same_result_builds_once() {
        let alive = Rc::new(Cell::new(0));
        let mut slot = SceneSlot::default();
        let source = Arc::new(3);

        for _ in 0..5 {
            let scene = slot.sync(&source, |value| Tracked::new(&alive, *value));
            assert_eq!(scene.value, 3);
        }

        assert_eq!(slot.builds(), 1);
        assert_eq!(alive.get(), 1);
    }

    #[test]
    fn equal_but_replaced_result_rebuilds() {
        let alive = Rc::new(Cell::new(0));
        let mut slot = SceneSlot::default();

        slot.sync(&Arc::new(1), |value| Tracked::new(&alive, *value));
        slot.sync(&Arc::new(1), |value| {
            assert_eq!(alive.get(), 0, "previous scene still alive");
            Tracked::new(&alive, *value)
        });

        assert_eq!(slot.builds(), 2);
        assert_eq!(alive.get(), 1);
    }

    #[test]
    fn clear_releases_the_scene() {
        let alive = Rc::new(Cell::new(0));
        let mut slot = SceneSlot::default();
        let source = Arc::new(7);

        slot.sync(&source, |value| Tracked::new(&alive, *value));
        slot.clear();
        assert_eq!(alive.get(), 0);
        assert!(slot.scene().is_none());

        slot.sync(&source, |value| Tracked::new(&alive, *value));
        assert_eq!(slot.builds(), 2);
    }
}
