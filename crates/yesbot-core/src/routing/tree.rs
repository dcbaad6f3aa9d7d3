use std::collections::HashMap;

use super::key_path::{KeyPath, WILDCARD};

/// A registered value together with its insertion sequence number.
#[derive(Debug)]
struct Entry<T> {
    seq: u64,
    value: T,
}

#[derive(Debug)]
struct Node<T> {
    bucket: Vec<Entry<T>>,
    children: HashMap<String, Node<T>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            bucket: Vec::new(),
            children: HashMap::new(),
        }
    }
}

/// A tree of buckets addressed by [`KeyPath`]s.
///
/// Every node holds a bucket of values registered at exactly that path and a
/// map of deeper children, so a node can match at its own depth and still be
/// walked through.
///
/// # Lookup
///
/// For each segment of the looked-up path the walk follows both the exact
/// child and the [`WILDCARD`] child. Values are collected from every node the
/// walk reaches, prefix nodes included, and returned in insertion order.
///
/// ```rust,ignore
/// let mut tree = RoutingTree::new();
/// tree.insert(&KeyPath::new(["", "👍"]), "any channel");
/// tree.insert(&KeyPath::new(["general", "👍"]), "general only");
///
/// assert_eq!(tree.lookup(&KeyPath::new(["general", "👍"])), [&"any channel", &"general only"]);
/// assert_eq!(tree.lookup(&KeyPath::new(["random", "👍"])), [&"any channel"]);
/// ```
#[derive(Debug)]
pub struct RoutingTree<T> {
    root: Node<T>,
    next_seq: u64,
    len: usize,
}

impl<T> Default for RoutingTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RoutingTree<T> {
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            next_seq: 0,
            len: 0,
        }
    }

    /// Appends `value` to the bucket at `path`, creating intermediate nodes.
    pub fn insert(&mut self, path: &KeyPath, value: T) {
        let mut node = &mut self.root;
        for segment in path.iter() {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.bucket.push(Entry {
            seq: self.next_seq,
            value,
        });
        self.next_seq += 1;
        self.len += 1;
    }

    /// Returns every value reachable from `path`, in insertion order.
    pub fn lookup(&self, path: &KeyPath) -> Vec<&T> {
        let mut found: Vec<&Entry<T>> = self.root.bucket.iter().collect();
        let mut frontier = vec![&self.root];

        for segment in path.iter() {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            for node in frontier {
                if let Some(child) = node.children.get(segment) {
                    next.push(child);
                }
                if segment != WILDCARD {
                    if let Some(child) = node.children.get(WILDCARD) {
                        next.push(child);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            for node in &next {
                found.extend(node.bucket.iter());
            }
            frontier = next;
        }

        found.sort_by_key(|entry| entry.seq);
        found.into_iter().map(|entry| &entry.value).collect()
    }

    /// Total number of inserted values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visits every stored value with its path, in insertion order.
    pub fn entries(&self) -> Vec<(KeyPath, &T)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = vec![(KeyPath::root(), &self.root)];
        while let Some((path, node)) = stack.pop() {
            for entry in &node.bucket {
                out.push((entry.seq, path.clone(), &entry.value));
            }
            for (segment, child) in &node.children {
                let mut child_path = path.clone();
                child_path.push(segment.as_str());
                stack.push((child_path, child));
            }
        }
        out.sort_by_key(|(seq, _, _)| *seq);
        out.into_iter().map(|(_, path, value)| (path, value)).collect()
    }
}
