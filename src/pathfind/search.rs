//! Queue-driven breadth-first traversal shared by every board search.
//!
//! Callers supply two closures over an explicit context: `should_expand`
//! decides whether a popped node is processed at all, and `on_visit` does the
//! work and pushes successors. Passing the context by `&mut` keeps both
//! closures free of captured borrows of the grid.

use std::collections::VecDeque;

/// Whether a traversal keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep popping.
    Continue,
    /// Stop immediately; the remaining queue is discarded.
    Stop,
}

/// Pending nodes of a traversal.
#[derive(Debug)]
pub struct Frontier<N> {
    queue: VecDeque<N>,
}

impl<N> Frontier<N> {
    /// Enqueue a node behind every node already waiting.
    #[inline]
    pub fn push(&mut self, node: N) {
        self.queue.push_back(node);
    }

    /// Enqueue several nodes in order.
    pub fn extend(&mut self, nodes: impl IntoIterator<Item = N>) {
        self.queue.extend(nodes);
    }

    /// Nodes still waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Nothing left to visit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Counters from one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Nodes popped from the queue.
    pub popped: usize,
    /// Nodes handed to `on_visit`.
    pub visited: usize,
    /// `on_visit` asked to stop.
    pub stopped: bool,
}

/// Breadth-first traversal from `seed`.
///
/// Nodes are processed in FIFO order. A popped node for which
/// `should_expand` returns `false` is dropped without a visit.
pub fn breadth_first<C, N>(
    ctx: &mut C,
    seed: N,
    mut should_expand: impl FnMut(&C, &N) -> bool,
    mut on_visit: impl FnMut(&mut C, N, &mut Frontier<N>) -> Flow,
) -> Traversal {
    let mut frontier = Frontier {
        queue: VecDeque::from([seed]),
    };
    let mut stats = Traversal::default();

    while let Some(node) = frontier.queue.pop_front() {
        stats.popped += 1;
        if !should_expand(ctx, &node) {
            continue;
        }
        stats.visited += 1;
        if on_visit(ctx, node, &mut frontier) == Flow::Stop {
            stats.stopped = true;
            break;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visits_in_fifo_order() {
        let mut order = Vec::new();
        let stats = breadth_first(
            &mut order,
            1u32,
            |_, &n| n < 8,
            |order, n, frontier| {
                order.push(n);
                frontier.push(n * 2);
                frontier.push(n * 2 + 1);
                Flow::Continue
            },
        );
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(stats.visited, 7);
        assert!(!stats.stopped);
    }

    #[test]
    fn test_stop_discards_queue() {
        let mut seen = 0;
        let stats = breadth_first(
            &mut seen,
            0u32,
            |_, _| true,
            |seen, n, frontier| {
                *seen += 1;
                frontier.push(n + 1);
                if n == 3 { Flow::Stop } else { Flow::Continue }
            },
        );
        assert_eq!(seen, 4);
        assert!(stats.stopped);
    }

    #[test]
    fn test_should_expand_sees_context() {
        let mut visited = vec![false; 5];
        breadth_first(
            &mut visited,
            0usize,
            |visited, &n| n < visited.len() && !visited[n],
            |visited, n, frontier| {
                visited[n] = true;
                frontier.extend([n + 1, n, n + 2]);
                Flow::Continue
            },
        );
        assert!(visited.iter().all(|&v| v));
    }
}
