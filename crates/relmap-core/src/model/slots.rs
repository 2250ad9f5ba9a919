/// Append-only arena whose indices stay valid after removal.
///
/// Removing an item leaves an empty slot behind, so an index handed out once
/// never refers to a different item later. Iteration follows insertion order.
#[derive(Debug, Clone)]
pub(crate) struct Slots<T> {
    items: Vec<Option<T>>,
}

impl<T> Slots<T> {
    pub(crate) fn new() -> Self {
        Self { items: vec![] }
    }

    /// Index the next pushed item will receive.
    pub(crate) fn next_index(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn push(&mut self, item: T) -> usize {
        self.items.push(Some(item));
        self.items.len() - 1
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)?.as_mut()
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        self.items.get_mut(index)?.take()
    }

    pub(crate) fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().flatten()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.items.iter_mut().flatten()
    }

    /// Number of live items.
    pub(crate) fn len(&self) -> usize {
        self.iter().count()
    }
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}
