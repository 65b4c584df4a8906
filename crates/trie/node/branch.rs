use crate::{
    ValueRLP,
    error::TrieError,
    nibbles::Nibbles,
    node::{ExtensionNode, LeafNode, Node},
    node_hash::NodeHash,
    state::TrieState,
};
use hexary_rlp::encode::RLPEncode;

/// Branch node: sixteen children indexed by the next path nibble, plus an
/// optional value for the path ending at this node. An empty value vector
/// means no value is stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub choices: [NodeHash; 16],
    pub value: ValueRLP,
}

impl BranchNode {
    /// Empty choice array for convenience
    pub const EMPTY_CHOICES: [NodeHash; 16] = [NodeHash::Inline(([0; 31], 0)); 16];

    /// Creates a new branch node given its children
    pub const fn new(choices: [NodeHash; 16]) -> Self {
        Self {
            choices,
            value: Vec::new(),
        }
    }

    /// Creates a new branch node given its children and value
    pub const fn new_with_value(choices: [NodeHash; 16], value: ValueRLP) -> Self {
        Self { choices, value }
    }

    /// Updates the node's value
    pub fn update(&mut self, new_value: ValueRLP) {
        self.value = new_value;
    }

    /// Retrieves a value from the subtrie originating from this node given its path
    pub fn get(&self, state: &TrieState, mut path: Nibbles) -> Result<Option<ValueRLP>, TrieError> {
        // If path is at the end, return the branch's value (if present).
        // Otherwise, check the corresponding choice and delegate accordingly if present.
        match path.next_choice() {
            Some(choice) if self.choices[choice].is_valid() => {
                let child_node = state
                    .get_node(self.choices[choice])?
                    .ok_or(TrieError::InconsistentTree)?;
                child_node.get(state, path)
            }
            Some(_) => Ok(None),
            None => Ok((!self.value.is_empty()).then(|| self.value.clone())),
        }
    }

    /// Inserts a value into the subtrie originating from this node and returns the new root of the subtrie
    pub fn insert(
        mut self,
        state: &mut TrieState,
        mut path: Nibbles,
        value: ValueRLP,
    ) -> Result<Node, TrieError> {
        // If path is at the end, insert or replace its own value.
        // Otherwise, check the corresponding choice and insert or delegate accordingly.
        match path.next_choice() {
            Some(choice) => {
                if self.choices[choice].is_valid() {
                    let child_node = state
                        .get_node(self.choices[choice])?
                        .ok_or(TrieError::InconsistentTree)?;
                    let child_node = child_node.insert(state, path, value)?;
                    self.choices[choice] = child_node.insert_self(state)?;
                } else {
                    let new_leaf = LeafNode::new(path, value);
                    self.choices[choice] = Node::from(new_leaf).insert_self(state)?;
                }
            }
            None => {
                self.update(value);
            }
        };

        Ok(self.into())
    }

    /// Removes a value from the subtrie originating from this node given its path
    /// Returns the new root of the subtrie (if any) and the removed value if it existed in the subtrie
    pub fn remove(
        mut self,
        state: &mut TrieState,
        mut path: Nibbles,
    ) -> Result<(Option<Node>, Option<ValueRLP>), TrieError> {
        /* Possible flow paths:
            Step 1: Removal
                Branch { [ ... ], Value } -> Branch { [ ... ], None } (remove own value)
                Branch { [ childA, ... ], Value } -> Branch { [ childA', ... ], Value } (remove from child)

            Step 2: Restructure
                Branch { [], Value } -> Leaf { Value } (no children left)
                Branch { [ child ], None } -> Extension { child } (one child left, child is a branch)
                Branch { [ Extension ], None } -> Extension (one child left, merge prefixes)
                Branch { [ Leaf ], None } -> Leaf (one child left, merge paths)
        */

        // Step 1: Remove value
        let value = match path.next_choice() {
            Some(choice) if self.choices[choice].is_valid() => {
                let child_node = state
                    .get_node(self.choices[choice])?
                    .ok_or(TrieError::InconsistentTree)?;
                let (child_node, old_value) = child_node.remove(state, path)?;
                self.choices[choice] = match child_node {
                    Some(child_node) => child_node.insert_self(state)?,
                    None => NodeHash::default(),
                };
                old_value
            }
            Some(_) => None,
            None => (!self.value.is_empty()).then(|| std::mem::take(&mut self.value)),
        };

        // Step 2: Restructure self
        let children: Vec<usize> = (0..16)
            .filter(|choice| self.choices[*choice].is_valid())
            .collect();
        let new_node = match (children.len(), self.value.is_empty()) {
            // The branch still holds its own value: it stays a branch even
            // with a single child left
            (_, false) if !children.is_empty() => Some(self.into()),
            // No children and no value, the branch is gone
            (0, true) => None,
            // No children left, convert to a leaf holding the remaining value
            (0, false) => Some(LeafNode::new(Nibbles::from_hex(vec![16]), self.value).into()),
            // One child and no value: the branch collapses into its child
            (1, true) => {
                let choice_index = children[0];
                let child_hash = self.choices[choice_index];
                let child = state
                    .get_node(child_hash)?
                    .ok_or(TrieError::InconsistentTree)?;
                let node: Node = match child {
                    // A branch child can't absorb the nibble, so it hangs
                    // from a one-nibble extension instead
                    Node::Branch(_) => {
                        ExtensionNode::new(Nibbles::from_hex(vec![choice_index as u8]), child_hash)
                            .into()
                    }
                    Node::Extension(mut extension_node) => {
                        extension_node.prefix.prepend(choice_index as u8);
                        extension_node.into()
                    }
                    Node::Leaf(mut leaf_node) => {
                        leaf_node.partial.prepend(choice_index as u8);
                        leaf_node.into()
                    }
                };
                Some(node)
            }
            _ => Some(self.into()),
        };

        Ok((new_node, value))
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
        // Continue to the child derived from the path (if present)
        if let Some(choice) = path.next_choice() {
            if self.choices[choice].is_valid() {
                let child_node = state
                    .get_node(self.choices[choice])?
                    .ok_or(TrieError::InconsistentTree)?;
                child_node.get_path(state, path, node_path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trie;

    #[test]
    fn branch_value_lives_at_path_end() {
        let mut trie = Trie::new_temp();
        // 0x16 and 0x16 0x34 share the full first path, so the shorter
        // key's value ends up stored in a branch
        trie.insert(vec![0x16], vec![0x01]).unwrap();
        trie.insert(vec![0x16, 0x34], vec![0x02]).unwrap();
        assert_eq!(trie.get(&vec![0x16]).unwrap(), Some(vec![0x01]));
        assert_eq!(trie.get(&vec![0x16, 0x34]).unwrap(), Some(vec![0x02]));
    }

    #[test]
    fn removing_second_to_last_child_collapses_branch() {
        let mut trie = Trie::new_temp();
        trie.insert(vec![0x12], vec![0x12]).unwrap();
        let single_root = trie.hash_no_commit();
        trie.insert(vec![0x23], vec![0x23]).unwrap();
        trie.remove(vec![0x23]).unwrap();
        // The branch created by the second insert must collapse back
        assert_eq!(trie.hash_no_commit(), single_root);
        assert_eq!(trie.get(&vec![0x12]).unwrap(), Some(vec![0x12]));
    }

    #[test]
    fn removing_branch_value_keeps_children() {
        let mut trie = Trie::new_temp();
        trie.insert(vec![0x16], vec![0x01]).unwrap();
        trie.insert(vec![0x16, 0x34], vec![0x02]).unwrap();
        assert_eq!(trie.remove(vec![0x16]).unwrap(), Some(vec![0x01]));
        assert_eq!(trie.get(&vec![0x16]).unwrap(), None);
        assert_eq!(trie.get(&vec![0x16, 0x34]).unwrap(), Some(vec![0x02]));
    }
}
