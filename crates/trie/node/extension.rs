use crate::{
    ValueRLP,
    error::TrieError,
    nibbles::Nibbles,
    node::{BranchNode, LeafNode, Node},
    node_hash::NodeHash,
    state::TrieState,
};
use hexary_rlp::encode::RLPEncode;

/// Extension node: a shared path segment leading to a single child node.
/// The prefix never carries the leaf marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionNode {
    pub prefix: Nibbles,
    pub child: NodeHash,
}

impl ExtensionNode {
    /// Creates a new extension node given its child hash and prefix
    pub const fn new(prefix: Nibbles, child: NodeHash) -> Self {
        Self { prefix, child }
    }

    /// Retrieves a value from the subtrie originating from this node given its path
    pub fn get(&self, state: &TrieState, mut path: Nibbles) -> Result<Option<ValueRLP>, TrieError> {
        // If the path is prefixed by this node's prefix, delegate to its child.
        // Otherwise, no value is present.
        if path.skip_prefix(&self.prefix) {
            let child_node = state
                .get_node(self.child)?
                .ok_or(TrieError::InconsistentTree)?;
            child_node.get(state, path)
        } else {
            Ok(None)
        }
    }

    /// Inserts a value into the subtrie originating from this node and returns the new root of the subtrie
    pub fn insert(
        mut self,
        state: &mut TrieState,
        path: Nibbles,
        value: ValueRLP,
    ) -> Result<Node, TrieError> {
        /* Possible flow paths:
            Extension { prefix, child } -> Extension { prefix, child' } (insert into child)
            Extension { prefix, child } -> Branch { [ ... ], Value } (total divergence)
            Extension { prefix, child } -> Extension { shared, Branch { [ ... ] } } (partial divergence)
        */
        let match_index = path.count_prefix(&self.prefix);
        if match_index == self.prefix.len() {
            // Insert into child
            let child_node = state
                .get_node(self.child)?
                .ok_or(TrieError::InconsistentTree)?;
            let new_child_node = child_node.insert(state, path.offset(match_index), value)?;
            self.child = new_child_node.insert_self(state)?;
            Ok(self.into())
        } else {
            // Split the prefix at the divergence, connecting the child and
            // the new value through a branch
            let prefix_choice = self.prefix.at(match_index);
            let child_ref = if match_index + 1 == self.prefix.len() {
                // The whole prefix was consumed, hang the child directly
                // from the branch
                self.child
            } else {
                let shortened =
                    ExtensionNode::new(self.prefix.slice(match_index + 1, self.prefix.len()), self.child);
                Node::from(shortened).insert_self(state)?
            };

            let mut choices = [NodeHash::default(); 16];
            choices[prefix_choice] = child_ref;

            let mut remaining_path = path.offset(match_index);
            let branch_node = match remaining_path.next_choice() {
                Some(path_choice) => {
                    let new_leaf = LeafNode::new(remaining_path, value);
                    choices[path_choice] = Node::from(new_leaf).insert_self(state)?;
                    BranchNode::new(choices)
                }
                // The inserted path ends at the divergence, its value lives
                // in the branch
                None => BranchNode::new_with_value(choices, value),
            };

            let final_node = if match_index == 0 {
                branch_node.into()
            } else {
                let branch_ref = Node::from(branch_node).insert_self(state)?;
                ExtensionNode::new(self.prefix.slice(0, match_index), branch_ref).into()
            };

            Ok(final_node)
        }
    }

    /// Removes a value from the subtrie originating from this node given its path
    /// Returns the new root of the subtrie (if any) and the removed value if it existed in the subtrie
    pub fn remove(
        mut self,
        state: &mut TrieState,
        mut path: Nibbles,
    ) -> Result<(Option<Node>, Option<ValueRLP>), TrieError> {
        /* Possible flow paths:
            Extension { prefix, child } -> Extension { prefix, child } (no removal)
            Extension { prefix, child } -> None (child removed)
            Extension { prefix, Branch' } -> Extension { prefix, Branch' } (child updated)
            Extension { prefixA, Extension { prefixB, child } } -> Extension { prefixA + prefixB, child } (collapsed child)
            Extension { prefix, Leaf { partial, value } } -> Leaf { prefix + partial, value } (collapsed child)
        */
        if !path.skip_prefix(&self.prefix) {
            return Ok((Some(self.into()), None));
        }

        let child_node = state
            .get_node(self.child)?
            .ok_or(TrieError::InconsistentTree)?;
        let (child_node, old_value) = child_node.remove(state, path)?;
        let node = match child_node {
            Some(node) => Some(match node {
                Node::Branch(_) => {
                    self.child = node.insert_self(state)?;
                    self.into()
                }
                // The child is no longer a branch, absorb it into this
                // node's prefix to keep the structure canonical
                Node::Extension(mut extension_node) => {
                    extension_node.prefix = self.prefix.concat(&extension_node.prefix);
                    extension_node.into()
                }
                Node::Leaf(mut leaf_node) => {
                    leaf_node.partial = self.prefix.concat(&leaf_node.partial);
                    leaf_node.into()
                }
            }),
            None => None,
        };

        Ok((node, old_value))
    }

    /// Traverses own subtrie until reaching the node containing `path`
    /// Appends the encoding of every traversed node to `node_path` (including self)
    pub fn get_path(
        &self,
        state: &TrieState,
        mut path: Nibbles,
        node_path: &mut Vec<Vec<u8>>,
    ) -> Result<(), TrieError> {
        // Add self to node_path (if not inlined in parent)
        let encoded = self.encode_to_vec();
        if encoded.len() >= 32 {
            node_path.push(encoded);
        }
        // Continue to the child if the path matches the prefix
        if path.skip_prefix(&self.prefix) {
            let child_node = state
                .get_node(self.child)?
                .ok_or(TrieError::InconsistentTree)?;
            child_node.get_path(state, path, node_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trie;

    #[test]
    fn insert_into_shared_prefix_keeps_extension() {
        let mut trie = Trie::new_temp();
        trie.insert(vec![0x12, 0x34], vec![0x01]).unwrap();
        trie.insert(vec![0x12, 0x56], vec![0x02]).unwrap();
        trie.insert(vec![0x12, 0x78], vec![0x03]).unwrap();
        assert_eq!(trie.get(&vec![0x12, 0x34]).unwrap(), Some(vec![0x01]));
        assert_eq!(trie.get(&vec![0x12, 0x56]).unwrap(), Some(vec![0x02]));
        assert_eq!(trie.get(&vec![0x12, 0x78]).unwrap(), Some(vec![0x03]));
    }

    #[test]
    fn insert_diverging_from_prefix_splits_extension() {
        let mut trie = Trie::new_temp();
        // Shares only the first nibble with the extension built by the
        // first two keys
        trie.insert(vec![0x12, 0x34], vec![0x01]).unwrap();
        trie.insert(vec![0x12, 0x56], vec![0x02]).unwrap();
        trie.insert(vec![0x17, 0x78], vec![0x03]).unwrap();
        assert_eq!(trie.get(&vec![0x12, 0x34]).unwrap(), Some(vec![0x01]));
        assert_eq!(trie.get(&vec![0x12, 0x56]).unwrap(), Some(vec![0x02]));
        assert_eq!(trie.get(&vec![0x17, 0x78]).unwrap(), Some(vec![0x03]));
    }

    #[test]
    fn removing_to_single_leaf_merges_extension() {
        let mut trie = Trie::new_temp();
        trie.insert(vec![0x12, 0x34], vec![0x01]).unwrap();
        let single_root = trie.hash_no_commit();
        trie.insert(vec![0x12, 0x56], vec![0x02]).unwrap();
        trie.remove(vec![0x12, 0x56]).unwrap();
        // Extension + branch collapse back into the original leaf
        assert_eq!(trie.hash_no_commit(), single_root);
        assert_eq!(trie.get(&vec![0x12, 0x34]).unwrap(), Some(vec![0x01]));
    }
}
