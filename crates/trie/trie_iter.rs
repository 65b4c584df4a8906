use crate::{PathRLP, Trie, ValueRLP, nibbles::Nibbles, node::Node, node_hash::NodeHash};

/// In-order traversal over all the trie's nodes, yielding each node
/// together with the path that leads to it.
pub struct TrieIterator {
    trie: Trie,
    // The stack contains the current traversed path and the next node to be traversed.
    // Elements are added in the reverse order they will be popped, so branch
    // children come out in ascending nibble order.
    stack: Vec<(Nibbles, NodeHash)>,
}

impl TrieIterator {
    pub(crate) fn new(trie: Trie) -> Self {
        let stack = match trie.root {
            Some(root) if root.is_valid() => vec![(Nibbles::default(), root)],
            _ => vec![],
        };
        Self { trie, stack }
    }
}

impl Iterator for TrieIterator {
    type Item = (Nibbles, Node);

    fn next(&mut self) -> Option<Self::Item> {
        // Fetch the last node in the stack
        let (mut path, next_node_hash) = self.stack.pop()?;
        let next_node = self.trie.state.get_node(next_node_hash).ok().flatten()?;
        match &next_node {
            Node::Branch(branch_node) => {
                // Add all children to the stack (in reverse order so we process first child first)
                for (choice, child) in branch_node.choices.iter().enumerate().rev() {
                    if child.is_valid() {
                        let mut child_path = path.clone();
                        child_path.append(choice as u8);
                        self.stack.push((child_path, *child))
                    }
                }
            }
            Node::Extension(extension_node) => {
                // Update path
                path.extend(&extension_node.prefix);
                // Add child to the stack
                self.stack.push((path.clone(), extension_node.child));
            }
            Node::Leaf(leaf_node) => {
                path.extend(&leaf_node.partial);
            }
        }
        Some((path, next_node))
    }
}

impl TrieIterator {
    /// Consumes the iterator, yielding the trie's key-value pairs instead of its nodes
    pub fn content(self) -> impl Iterator<Item = (PathRLP, ValueRLP)> {
        self.filter_map(|(path, node)| match node {
            Node::Branch(branch_node) => {
                (!branch_node.value.is_empty()).then(|| (path.to_bytes(), branch_node.value))
            }
            Node::Extension(_) => None,
            Node::Leaf(leaf_node) => Some((path.to_bytes(), leaf_node.value)),
        })
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use proptest::{
        collection::{btree_map, vec},
        prelude::any,
        proptest,
    };

    #[test]
    fn trie_iter_content() {
        let expected_content = vec![
            (vec![0, 9], vec![3, 4]),
            (vec![1, 2], vec![5, 6]),
            (vec![2, 7], vec![7, 8]),
        ];
        let mut trie = Trie::new_temp();
        for (path, value) in expected_content.clone() {
            trie.insert(path, value).unwrap()
        }
        let content = trie.into_iter().content().collect::<Vec<_>>();
        assert_eq!(content, expected_content);
    }

    #[test]
    fn trie_iter_content_nested_paths() {
        let expected_content = vec![
            (vec![0x12], vec![0x01]),
            (vec![0x12, 0x34], vec![0x02]),
            (vec![0x12, 0x34, 0x56], vec![0x03]),
        ];
        let mut trie = Trie::new_temp();
        for (path, value) in expected_content.clone() {
            trie.insert(path, value).unwrap()
        }
        let content = trie.into_iter().content().collect::<Vec<_>>();
        assert_eq!(content, expected_content);
    }

    proptest! {

        #[test]
        fn proptest_trie_iter_content(data in btree_map(vec(any::<u8>(), 5..100), vec(any::<u8>(), 5..100), 5..100)) {
            let expected_content = data.clone().into_iter().collect::<Vec<_>>();
            let mut trie = Trie::new_temp();
            for (path, value) in data.into_iter() {
                trie.insert(path, value).unwrap()
            }
            let content = trie.into_iter().content().collect::<Vec<_>>();
            assert_eq!(content, expected_content);
        }
    }
}
