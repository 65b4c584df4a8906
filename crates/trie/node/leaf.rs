use crate::{
    ValueRLP,
    error::TrieError,
    nibbles::Nibbles,
    node::{BranchNode, ExtensionNode, Node},
    node_hash::NodeHash,
    state::TrieState,
};
use hexary_rlp::encode::RLPEncode;

/// Leaf node: stores a value at the end of a path. `partial` is the
/// remainder of the path below the parent, including the leaf marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafNode {
    pub partial: Nibbles,
    pub value: ValueRLP,
}

impl LeafNode {
    /// Creates a new leaf node and stores the given (path, value) pair
    pub const fn new(partial: Nibbles, value: ValueRLP) -> Self {
        Self { partial, value }
    }

    /// Returns the stored value if the given path matches the stored path
    pub fn get(&self, path: Nibbles) -> Result<Option<ValueRLP>, TrieError> {
        if self.partial == path {
            Ok(Some(self.value.clone()))
        } else {
            Ok(None)
        }
    }

    /// Stores the received value and returns the new root of the subtrie previously consisting of self
    pub fn insert(
        mut self,
        state: &mut TrieState,
        path: Nibbles,
        value: ValueRLP,
    ) -> Result<Node, TrieError> {
        /* Possible flow paths:
            Leaf { SelfValue } -> Leaf { Value }
            Leaf { SelfValue } -> Branch { [ Leaf { Value } ], SelfValue }
            Leaf { SelfValue } -> Branch { [ Leaf { SelfValue } ], Value }
            Leaf { SelfValue } -> Branch { [ Leaf { Value }, Leaf { SelfValue } ], None }
            Leaf { SelfValue } -> Extension { Branch { ... } }
        */
        if self.partial == path {
            // Replace the stored value
            self.value = value;
            Ok(self.into())
        } else {
            let match_index = path.count_prefix(&self.partial);
            let branch_node = if self.partial.at(match_index) == 16 {
                // Paths diverge where self's path ends: self's value moves into the branch
                let new_leaf = LeafNode::new(path.offset(match_index + 1), value);
                let mut choices = [NodeHash::default(); 16];
                choices[path.at(match_index)] = Node::from(new_leaf).insert_self(state)?;
                BranchNode::new_with_value(choices, self.value)
            } else if path.at(match_index) == 16 {
                // Paths diverge where the new path ends: the new value moves into the branch
                let self_leaf = LeafNode::new(self.partial.offset(match_index + 1), self.value);
                let mut choices = [NodeHash::default(); 16];
                choices[self.partial.at(match_index)] = Node::from(self_leaf).insert_self(state)?;
                BranchNode::new_with_value(choices, value)
            } else {
                // Both paths continue after the divergence: one leaf per path
                let new_leaf = LeafNode::new(path.offset(match_index + 1), value);
                let self_leaf = LeafNode::new(self.partial.offset(match_index + 1), self.value);
                let mut choices = [NodeHash::default(); 16];
                choices[path.at(match_index)] = Node::from(new_leaf).insert_self(state)?;
                choices[self.partial.at(match_index)] = Node::from(self_leaf).insert_self(state)?;
                BranchNode::new(choices)
            };

            // Connect the branch to the trie, possibly via an extension
            // holding the shared prefix
            let final_node = if match_index == 0 {
                branch_node.into()
            } else {
                let branch_ref = Node::from(branch_node).insert_self(state)?;
                ExtensionNode::new(path.slice(0, match_index), branch_ref).into()
            };

            Ok(final_node)
        }
    }

    /// Removes own value if the path matches own path and returns self and the value if it was removed
    pub fn remove(self, path: Nibbles) -> Result<(Option<Node>, Option<ValueRLP>), TrieError> {
        Ok(if self.partial == path {
            (None, Some(self.value))
        } else {
            (Some(self.into()), None)
        })
    }

    /// Appends own encoding to `node_path` unless it is inlined in the parent
    pub fn get_path(&self, node_path: &mut Vec<Vec<u8>>) -> Result<(), TrieError> {
        let encoded = self.encode_to_vec();
        if encoded.len() >= 32 {
            node_path.push(encoded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trie;

    #[test]
    fn get_matching_path() {
        let leaf = LeafNode::new(Nibbles::from_bytes(&[0x12]), vec![0x34]);
        assert_eq!(
            leaf.get(Nibbles::from_bytes(&[0x12])).unwrap(),
            Some(vec![0x34])
        );
        assert_eq!(leaf.get(Nibbles::from_bytes(&[0x21])).unwrap(), None);
    }

    #[test]
    fn insert_same_path_replaces_value() {
        let mut trie = Trie::new_temp();
        trie.insert(vec![0x12], vec![0x34]).unwrap();
        trie.insert(vec![0x12], vec![0x56]).unwrap();
        assert_eq!(trie.get(&vec![0x12]).unwrap(), Some(vec![0x56]));
    }

    #[test]
    fn insert_diverging_path_splits_into_branch() {
        let mut trie = Trie::new_temp();
        trie.insert(vec![0x12], vec![0x12]).unwrap();
        trie.insert(vec![0x22], vec![0x22]).unwrap();
        assert_eq!(trie.get(&vec![0x12]).unwrap(), Some(vec![0x12]));
        assert_eq!(trie.get(&vec![0x22]).unwrap(), Some(vec![0x22]));
    }

    #[test]
    fn insert_prefix_path_stores_value_in_branch() {
        let mut trie = Trie::new_temp();
        trie.insert(vec![0x12, 0x34], vec![0x01]).unwrap();
        trie.insert(vec![0x12], vec![0x02]).unwrap();
        assert_eq!(trie.get(&vec![0x12, 0x34]).unwrap(), Some(vec![0x01]));
        assert_eq!(trie.get(&vec![0x12]).unwrap(), Some(vec![0x02]));
    }
}
