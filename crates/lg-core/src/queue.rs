use std::collections::VecDeque;

/// A named FIFO: `enqueue` at the head, `dequeue` from the tail.
///
/// Path hooks pull blocks from one queue and push exhausted blocks onto
/// another; sharing a queue between two hooks chains their paths.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    name: String,
    data: VecDeque<T>,
}

impl<T> Queue<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enqueue(&mut self, item: T) {
        self.data.push_front(item);
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.data.pop_back()
    }

    /// Most recently enqueued.
    pub fn first(&self) -> Option<&T> {
        self.data.front()
    }

    /// Next to be dequeued.
    pub fn last(&self) -> Option<&T> {
        self.data.back()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.iter()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
