//! FILENAME: core/entanglement-engine/src/union_find.rs
//! PURPOSE: Disjoint-set forest over dense indices `0..n`.
//! CONTEXT: Connected components of the "shares a categorical field" graph.
//! Path halving plus union by rank keeps operations near-constant.

#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        DisjointSet {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets of `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// All sets, each sorted ascending, ordered by their smallest member.
    /// The result does not depend on the order unions were applied in.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for x in 0..self.len() {
            let root = self.find(x);
            match slot_of_root[root] {
                Some(slot) => groups[slot].push(x),
                None => {
                    slot_of_root[root] = Some(groups.len());
                    groups.push(vec![x]);
                }
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons_by_default() {
        let mut set = DisjointSet::new(3);
        assert_eq!(set.groups(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_union_is_transitive() {
        let mut set = DisjointSet::new(5);
        assert!(set.union(0, 3));
        assert!(set.union(3, 4));
        assert!(!set.union(0, 4));
        assert!(set.connected(0, 4));
        assert!(!set.connected(1, 2));
        assert_eq!(set.groups(), vec![vec![0, 3, 4], vec![1], vec![2]]);
    }

    #[test]
    fn test_groups_independent_of_union_order() {
        let pairs = [(4, 2), (2, 0), (1, 3)];
        let mut forward = DisjointSet::new(5);
        for &(a, b) in &pairs {
            forward.union(a, b);
        }
        let mut backward = DisjointSet::new(5);
        for &(a, b) in pairs.iter().rev() {
            backward.union(b, a);
        }
        assert_eq!(forward.groups(), backward.groups());
        assert_eq!(forward.groups(), vec![vec![0, 2, 4], vec![1, 3]]);
    }

    #[test]
    fn test_empty() {
        let mut set = DisjointSet::new(0);
        assert!(set.is_empty());
        assert!(set.groups().is_empty());
    }
}
