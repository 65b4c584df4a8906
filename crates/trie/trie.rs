pub mod db;
pub mod error;
mod nibbles;
mod node;
mod node_hash;
mod proof;
mod rlp;
mod state;
mod trie_iter;

use ethereum_types::H256;
use hexary_rlp::constants::RLP_NULL;
use sha3::{Digest, Keccak256};

pub use self::db::{InMemoryTrieDB, TrieDB};
pub use self::nibbles::Nibbles;
pub use self::node::{BranchNode, ExtensionNode, LeafNode, Node};
pub use self::node_hash::NodeHash;
pub use self::proof::verify_proof;
pub use self::state::TrieState;
pub use self::trie_iter::TrieIterator;

pub use self::error::TrieError;

use lazy_static::lazy_static;

lazy_static! {
    // Hash value for an empty trie, equal to keccak(RLP_NULL)
    pub static ref EMPTY_TRIE_HASH: H256 = H256::from_slice(
        Keccak256::new()
            .chain_update([RLP_NULL])
            .finalize()
            .as_slice(),
    );
}

/// RLP-encoded trie path
pub type PathRLP = Vec<u8>;
/// RLP-encoded trie value
pub type ValueRLP = Vec<u8>;
/// RLP-encoded trie node
pub type NodeRLP = Vec<u8>;

/// Merkle Patricia Trie over a pluggable node store.
///
/// Mutations build new nodes along the touched path and leave the old
/// ones in place, so a root taken before a mutation keeps describing the
/// old content for as long as its nodes are retained by the store.
pub struct Trie {
    /// Reference to the current root node
    root: Option<NodeHash>,
    /// Contains the trie's nodes
    pub(crate) state: TrieState,
}

impl Trie {
    /// Creates a new Trie from a clean DB
    pub fn new(db: Box<dyn TrieDB>) -> Self {
        Self {
            state: TrieState::new(db),
            root: None,
        }
    }

    /// Creates a trie from an already-initialized DB and sets root as the root node of the trie
    pub fn open(db: Box<dyn TrieDB>, root: H256) -> Self {
        let root = (root != *EMPTY_TRIE_HASH).then_some(root.into());
        Self {
            state: TrieState::new(db),
            root,
        }
    }

    /// Retrieve a value from the trie given its path.
    /// A missing path is an `Ok(None)`, not an error.
    pub fn get(&self, path: &PathRLP) -> Result<Option<ValueRLP>, TrieError> {
        if let Some(root) = &self.root {
            let root_node = self
                .state
                .get_node(*root)?
                .ok_or(TrieError::InconsistentTree)?;
            root_node.get(&self.state, Nibbles::from_bytes(path))
        } else {
            Ok(None)
        }
    }

    /// Insert a value into the trie, overwriting a previous value under the same path.
    pub fn insert(&mut self, path: PathRLP, value: ValueRLP) -> Result<(), TrieError> {
        let root = self.root.take();
        if let Some(root_node) = root
            .map(|root| self.state.get_node(root))
            .transpose()?
            .flatten()
        {
            // If the trie is not empty, call the root node's insertion logic
            let root_node = root_node.insert(&mut self.state, Nibbles::from_bytes(&path), value)?;
            self.root = Some(root_node.insert_self(&mut self.state)?)
        } else {
            // If the trie is empty, just add a leaf.
            let new_leaf = Node::from(LeafNode::new(Nibbles::from_bytes(&path), value));
            self.root = Some(new_leaf.insert_self(&mut self.state)?)
        }
        Ok(())
    }

    /// Remove a value from the trie given its path.
    /// Returns the value if it was succesfully removed or None if it wasn't part of the trie
    pub fn remove(&mut self, path: PathRLP) -> Result<Option<ValueRLP>, TrieError> {
        let root = self.root.take();
        if let Some(root) = root {
            let root_node = self
                .state
                .get_node(root)?
                .ok_or(TrieError::InconsistentTree)?;
            let (root_node, old_value) =
                root_node.remove(&mut self.state, Nibbles::from_bytes(&path))?;
            self.root = root_node
                .map(|root| root.insert_self(&mut self.state))
                .transpose()?;
            Ok(old_value)
        } else {
            Ok(None)
        }
    }

    /// Return the hash of the trie's root node.
    /// Returns keccak(RLP_NULL) if the trie is empty
    /// Also commits changes to the DB
    pub fn hash(&mut self) -> Result<H256, TrieError> {
        self.commit()?;
        Ok(self
            .root
            .as_ref()
            .map(|root| root.finalize())
            .unwrap_or(*EMPTY_TRIE_HASH))
    }

    /// Return the hash of the trie's root node.
    /// Returns keccak(RLP_NULL) if the trie is empty
    pub fn hash_no_commit(&self) -> H256 {
        self.root
            .as_ref()
            .map(|root| root.finalize())
            .unwrap_or(*EMPTY_TRIE_HASH)
    }

    /// Writes the nodes reachable from the current root to the DB
    pub fn commit(&mut self) -> Result<(), TrieError> {
        if let Some(ref root) = self.root {
            self.state.commit(root)?;
        }
        Ok(())
    }

    /// Obtain a merkle proof for the given path.
    /// The proof will contain all the encoded nodes traversed until reaching the node where the path is stored (including this last node).
    /// The proof will still be constructed even if the path is not stored in the trie, proving its absence.
    pub fn get_proof(&self, path: &PathRLP) -> Result<Vec<NodeRLP>, TrieError> {
        // Will store all the encoded nodes traversed until reaching the node containing the path
        let mut node_path = Vec::new();
        let Some(root) = &self.root else {
            return Ok(node_path);
        };
        // An inlined root is not reachable through a parent's encoding, add it explicitly
        if let NodeHash::Inline(_) = root {
            node_path.push(root.as_ref().to_vec());
        }
        if let Some(root_node) = self.state.get_node(*root)? {
            root_node.get_path(&self.state, Nibbles::from_bytes(path), &mut node_path)?;
        }
        Ok(node_path)
    }

    /// Builds an in-memory trie from the given elements and returns its hash
    pub fn compute_hash_from_unsorted_iter(
        iter: impl Iterator<Item = (PathRLP, ValueRLP)>,
    ) -> H256 {
        let mut trie = Trie::stateless();
        for (path, value) in iter {
            // Unwraping here won't panic as our in_memory trie DB won't fail
            trie.insert(path, value).unwrap();
        }
        trie.hash_no_commit()
    }

    /// Creates a new stateless trie. This trie won't be able to store any nodes so all data will be lost after calculating the hash
    /// Only use it for computing a hash from an iterator
    pub(crate) fn stateless() -> Trie {
        // We will only be using the trie's cache so we don't need a working DB
        struct NullTrieDB;

        impl TrieDB for NullTrieDB {
            fn get(&self, _key: NodeHash) -> Result<Option<Vec<u8>>, TrieError> {
                Ok(None)
            }

            fn put_batch(&self, _key_values: Vec<(NodeHash, Vec<u8>)>) -> Result<(), TrieError> {
                Ok(())
            }
        }

        Trie::new(Box::new(NullTrieDB))
    }

    #[cfg(test)]
    /// Creates a new Trie based on a temporary InMemory DB
    pub(crate) fn new_temp() -> Self {
        use std::collections::HashMap;
        use std::sync::Arc;
        use std::sync::Mutex;

        let hmap: HashMap<NodeHash, Vec<u8>> = HashMap::new();
        let map = Arc::new(Mutex::new(hmap));
        let db = InMemoryTrieDB::new(map);
        Trie::new(Box::new(db))
    }
}

impl IntoIterator for Trie {
    type Item = (Nibbles, Node);

    type IntoIter = TrieIterator;

    fn into_iter(self) -> Self::IntoIter {
        TrieIterator::new(self)
    }
}
