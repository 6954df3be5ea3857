//! Connected components over induced subgraphs

use std::collections::HashMap;

use crate::graph::{GraphStore, NodeId};

/// Union-Find data structure for connected component analysis
#[derive(Debug, Clone)]
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of element i)
    parent: Vec<usize>,

    /// Size of each set, valid at roots (used for union by size)
    size: Vec<usize>,
}

impl DisjointSets {
    /// Create `size` singleton sets
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach the smaller tree under the root of the larger tree
        if self.size[root_x] >= self.size[root_y] {
            self.parent[root_y] = root_x;
            self.size[root_x] += self.size[root_y];
        } else {
            self.parent[root_x] = root_y;
            self.size[root_y] += self.size[root_x];
        }
    }

    /// Get the size of the set containing x
    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }

    /// Group elements by set, ordered by each set's smallest element
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut root_to_group: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for element in 0..self.parent.len() {
            let root = self.find(element);
            let group = *root_to_group.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(element);
        }

        groups
    }
}

/// Connected components of the subgraph of `store` induced on `nodes`.
///
/// Components come out in order of their first member in `nodes`, and members
/// keep their relative order. Duplicate entries in `nodes` are ignored.
pub fn induced_components<N, S>(store: &S, nodes: &[N]) -> Vec<Vec<N>>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
{
    let mut position: HashMap<N, usize> = HashMap::with_capacity(nodes.len());
    let mut members: Vec<N> = Vec::with_capacity(nodes.len());
    for &node in nodes {
        position.entry(node).or_insert_with(|| {
            members.push(node);
            members.len() - 1
        });
    }

    let mut sets = DisjointSets::new(members.len());
    for (i, &node) in members.iter().enumerate() {
        for other in store.neighbors(node) {
            if let Some(&j) = position.get(&other) {
                sets.union(i, j);
            }
        }
    }

    sets.groups()
        .into_iter()
        .map(|group| group.into_iter().map(|i| members[i]).collect())
        .collect()
}
