//! Read-only view of a chain handed to derivation closures.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use super::EnvChain;
use super::value::FieldValue;
use crate::error::EnvChainError;

/// The fields of a chain as seen from inside a derivation.
///
/// Lookups are live: every `get` evaluates the sibling field at call time.
/// Operation names never resolve. The context also tracks which fields are
/// being evaluated, across nested groups, so that self-referencing fields and
/// groups that contain their own chain fail with
/// [`EnvChainError::CircularReference`].
pub struct Context<'a> {
    chain: &'a EnvChain,
    evaluating: Rc<RefCell<Vec<(EnvChain, String)>>>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(chain: &'a EnvChain) -> Self {
        Self {
            chain,
            evaluating: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Context for a nested chain that shares this context's evaluation path.
    pub(crate) fn nested<'b>(&self, chain: &'b EnvChain) -> Context<'b> {
        Context {
            chain,
            evaluating: Rc::clone(&self.evaluating),
        }
    }

    /// Current value of a sibling field, or `None` when it is undeclared or unset.
    pub fn get(&self, name: &str) -> Result<Option<FieldValue>, EnvChainError> {
        self.chain.resolve(name, self)
    }

    /// String form of a sibling's scalar value.
    pub fn get_str(&self, name: &str) -> Result<Option<String>, EnvChainError> {
        Ok(self
            .get(name)?
            .and_then(|value| value.to_scalar_string()))
    }

    /// Plain value of a sibling, rendering groups.
    pub fn value(&self, name: &str) -> Result<Option<Value>, EnvChainError> {
        self.chain.resolve_value(name, self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chain.contains(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.chain.names()
    }

    /// Record that `name` of this context's chain is being evaluated.
    pub(crate) fn enter(&self, name: &str) -> Result<(), EnvChainError> {
        let mut evaluating = self.evaluating.borrow_mut();
        if evaluating
            .iter()
            .any(|(chain, n)| n == name && chain.ptr_eq(self.chain))
        {
            let mut chain: Vec<String> = evaluating.iter().map(|(_, n)| n.clone()).collect();
            chain.push(name.to_string());
            return Err(EnvChainError::CircularReference { chain });
        }
        evaluating.push((self.chain.clone(), name.to_string()));
        Ok(())
    }

    pub(crate) fn leave(&self) {
        self.evaluating.borrow_mut().pop();
    }
}
