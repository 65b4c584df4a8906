use std::collections::HashMap;

use hexary_rlp::{decode::RLPDecode, encode::RLPEncode};

use crate::{db::TrieDB, error::TrieError, node::Node, node_hash::NodeHash};

/// In-flight view of the trie's nodes: a write-back cache in front of the
/// backing store, mapping node hashes to nodes. Stored nodes are
/// content-addressed and never mutated in place, so roots that predate a
/// mutation stay readable as long as their nodes are retained.
pub struct TrieState {
    db: Box<dyn TrieDB>,
    cache: HashMap<NodeHash, Node>,
}

impl TrieState {
    /// Creates a TrieState referring to a db.
    pub fn new(db: Box<dyn TrieDB>) -> TrieState {
        TrieState {
            db,
            cache: Default::default(),
        }
    }

    /// Retrieves a node based on its hash
    pub fn get_node(&self, hash: NodeHash) -> Result<Option<Node>, TrieError> {
        // Decode the node on the spot if it is inlined
        if matches!(hash, NodeHash::Inline(_)) {
            return Ok(Some(Node::decode(hash.as_ref())?));
        }
        if let Some(node) = self.cache.get(&hash) {
            return Ok(Some(node.clone()));
        };
        self.db
            .get(hash)?
            .map(|rlp| Node::decode(&rlp).map_err(TrieError::RLPDecode))
            .transpose()
    }

    /// Inserts a node
    pub fn insert_node(&mut self, node: Node, hash: NodeHash) {
        // Don't insert the node if it is already inlined on the parent
        if matches!(hash, NodeHash::Hashed(_)) {
            self.cache.insert(hash, node);
        }
    }

    /// Commits cache changes to the DB and clears it.
    /// Only writes nodes reachable from the given root.
    pub fn commit(&mut self, root: &NodeHash) -> Result<(), TrieError> {
        self.commit_node(root)?;
        self.cache.clear();
        Ok(())
    }

    // Writes a node and its children into the DB
    fn commit_node(&mut self, node_hash: &NodeHash) -> Result<(), TrieError> {
        let mut to_commit = vec![];
        let mut stack = vec![*node_hash];

        while let Some(current_hash) = stack.pop() {
            let Some(node) = self.cache.remove(&current_hash) else {
                continue;
            };

            let encoded_node = node.encode_to_vec();
            match node {
                Node::Branch(n) => {
                    for child in n.choices.into_iter() {
                        if child.is_valid() {
                            stack.push(child);
                        }
                    }
                }
                Node::Extension(n) => {
                    stack.push(n.child);
                }
                Node::Leaf(_) => {}
            }

            to_commit.push((current_hash, encoded_node));
        }

        tracing::trace!(nodes = to_commit.len(), "flushing trie nodes to the store");
        self.db.put_batch(to_commit)?;

        Ok(())
    }
}
