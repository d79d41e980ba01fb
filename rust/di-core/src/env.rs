//! Binding environments.
//!
//! An [`Env`] is a chain of reference-counted frames. Reads walk the chain
//! outward; writes always land in the innermost frame. A function value
//! "captures a copy" of its declaration environment by cloning the `Rc`
//! handle, and a call "runs in a copy" by pushing a child frame on top of
//! the captured one — so a function body sees later bindings of captured
//! names (recursion relies on this) while its own writes never leak back
//! into the caller.

use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Env {
    frame: Rc<RefCell<Frame>>,
}

#[derive(Debug, Default)]
struct Frame {
    vars: IndexMap<String, Value>,
    parent: Option<Env>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh frame whose parent is this environment.
    pub fn child(&self) -> Env {
        Env {
            frame: Rc::new(RefCell::new(Frame {
                vars: IndexMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Look a name up, walking the frame chain outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.frame.borrow();
        if let Some(value) = frame.vars.get(name) {
            return Some(value.clone());
        }
        frame.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        let frame = self.frame.borrow();
        frame.vars.contains_key(name)
            || frame
                .parent
                .as_ref()
                .is_some_and(|parent| parent.contains(name))
    }

    /// Bind a name in the innermost frame, shadowing any outer binding.
    pub fn set(&self, name: &str, value: Value) {
        self.frame.borrow_mut().vars.insert(name.to_string(), value);
    }

    /// Names currently bound in the innermost frame. A scope records this on
    /// entry and flushes against it on exit.
    pub fn snapshot(&self) -> HashSet<String> {
        self.frame.borrow().vars.keys().cloned().collect()
    }

    /// Drop innermost-frame bindings that are not in `snapshot`, i.e. the
    /// names introduced since it was taken. Surviving entries keep their
    /// current values and insertion order.
    pub fn flush(&self, snapshot: &HashSet<String>) {
        self.frame
            .borrow_mut()
            .vars
            .retain(|name, _| snapshot.contains(name));
    }

    /// Drop every binding of the innermost frame.
    pub fn clear(&self) {
        self.frame.borrow_mut().vars.clear();
    }

    /// Materialize the visible bindings, outermost frame first with inner
    /// frames overriding in place. This is the payload of a class instance:
    /// entries keep the order in which they were first introduced.
    pub fn flatten(&self) -> IndexMap<String, Value> {
        let frame = self.frame.borrow();
        let mut out = match &frame.parent {
            Some(parent) => parent.flatten(),
            None => IndexMap::new(),
        };
        for (name, value) in &frame.vars {
            out.insert(name.clone(), value.clone());
        }
        out
    }
}
