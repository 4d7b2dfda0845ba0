//! Transition engine.
//!
//! A transition runs in three phases:
//! 1. exit from the active leaf up to the source (the state whose handler
//!    asked for the transition, possibly an ancestor of the leaf);
//! 2. classify source vs. target, exiting up to their least common ancestor
//!    while building the target's entry path;
//! 3. enter the path outermost first, then let the initializer descend from
//!    the target.
//!
//! The least common ancestor itself is never exited or entered.

use super::error::{HsmError, TopologyError};
use super::machine::StateMachine;
use crate::core::{Event, Response, State, TransitionKind, TransitionRecord};
use crate::hierarchy::StateIdx;
use chrono::Utc;
use tracing::{debug, trace};

struct Resolution {
    kind: TransitionKind,
    lca: StateIdx,
    // Target first, then its ancestors up to (not including) the LCA.
    path: Vec<StateIdx>,
}

impl<S: State, C> StateMachine<S, C> {
    pub(super) fn transition(&mut self, target: StateIdx) -> Result<(), HsmError> {
        let source = self.source.unwrap_or(self.current);
        if target.is_top() {
            return Err(TopologyError::TopTarget {
                from: self.name_of(source).to_string(),
            }
            .into());
        }

        let mut exited = Vec::new();
        let mut state = self.current;
        while state != source {
            self.exit(state, &mut exited)?;
            state = self.superstate_of(state).ok_or_else(|| TopologyError::SourceNotActive {
                state: self.name_of(source).to_string(),
                leaf: self.name_of(self.current).to_string(),
            })?;
        }

        let resolution = self.exit_to_lca(source, target, &mut exited)?;

        let mut entered = Vec::new();
        for &state in resolution.path.iter().rev() {
            self.enter(state, &mut entered)?;
        }
        self.current = target;
        self.drill(&Event::INIT, &mut entered)?;

        debug!(
            machine = %self.id,
            from = self.name_of(source),
            to = self.name_of(target),
            lca = self.name_of(resolution.lca),
            kind = %resolution.kind,
            exited = exited.len(),
            entered = entered.len(),
            "transition complete"
        );
        self.record(source, target, &resolution, exited, entered);
        Ok(())
    }

    fn exit_to_lca(
        &mut self,
        source: StateIdx,
        target: StateIdx,
        exited: &mut Vec<S>,
    ) -> Result<Resolution, HsmError> {
        let mut path = vec![target];

        if source == target {
            self.exit(source, exited)?;
            return Ok(Resolution {
                kind: TransitionKind::SelfTransition,
                lca: self.superstate_of(source).unwrap_or(StateIdx::TOP),
                path,
            });
        }

        let target_parent = self
            .superstate_of(target)
            .ok_or_else(|| self.no_common_ancestor(source, target))?;
        if source == target_parent {
            return Ok(Resolution {
                kind: TransitionKind::ParentToChild,
                lca: source,
                path,
            });
        }

        let source_parent = self
            .superstate_of(source)
            .ok_or_else(|| self.no_common_ancestor(source, target))?;
        if source_parent == target_parent {
            self.exit(source, exited)?;
            return Ok(Resolution {
                kind: TransitionKind::Sibling,
                lca: source_parent,
                path,
            });
        }

        if source_parent == target {
            self.exit(source, exited)?;
            path.clear();
            return Ok(Resolution {
                kind: TransitionKind::ChildToParent,
                lca: target,
                path,
            });
        }

        // Build the target's full ancestor chain, stopping early if the
        // source is on it. The chain ends with the top state.
        let mut ancestor = target_parent;
        loop {
            if ancestor == source {
                return Ok(Resolution {
                    kind: TransitionKind::AncestorToDescendant,
                    lca: source,
                    path,
                });
            }
            path.push(ancestor);
            match self.superstate_of(ancestor) {
                Some(next) => ancestor = next,
                None => break,
            }
        }

        self.exit(source, exited)?;
        if let Some(k) = path.iter().position(|&p| p == source_parent) {
            path.truncate(k);
            return Ok(Resolution {
                kind: TransitionKind::SourceParentOnTargetPath,
                lca: source_parent,
                path,
            });
        }

        // source_parent is not on the chain, so it is never the top state.
        let mut ancestor = source_parent;
        loop {
            self.exit(ancestor, exited)?;
            ancestor = self
                .superstate_of(ancestor)
                .ok_or_else(|| self.no_common_ancestor(source, target))?;
            if let Some(k) = path.iter().position(|&p| p == ancestor) {
                path.truncate(k);
                return Ok(Resolution {
                    kind: TransitionKind::General,
                    lca: ancestor,
                    path,
                });
            }
        }
    }

    pub(super) fn enter(&mut self, state: StateIdx, entered: &mut Vec<S>) -> Result<(), HsmError> {
        trace!(machine = %self.id, state = self.name_of(state), "entry");
        self.notify(state, &Event::ENTRY)?;
        entered.extend(self.registry.hierarchy().state(state).cloned());
        Ok(())
    }

    pub(super) fn exit(&mut self, state: StateIdx, exited: &mut Vec<S>) -> Result<(), HsmError> {
        trace!(machine = %self.id, state = self.name_of(state), "exit");
        self.notify(state, &Event::EXIT)?;
        exited.extend(self.registry.hierarchy().state(state).cloned());
        Ok(())
    }

    // Entry and Exit may only be handled or bubbled.
    fn notify(&mut self, state: StateIdx, event: &Event) -> Result<(), HsmError> {
        match self.registry.invoke(state, &mut self.context, event)? {
            Response::Handled | Response::Bubble => Ok(()),
            response => Err(self.invalid_response(state, event, &response)),
        }
    }

    pub(super) fn superstate_of(&self, state: StateIdx) -> Option<StateIdx> {
        self.registry.hierarchy().parent(state)
    }

    pub(super) fn invalid_response(
        &self,
        state: StateIdx,
        event: &Event,
        response: &Response<S>,
    ) -> HsmError {
        HsmError::InvalidResponse {
            state: self.name_of(state).to_string(),
            signal: event.signal().to_string(),
            response: response.label(),
        }
    }

    fn no_common_ancestor(&self, source: StateIdx, target: StateIdx) -> HsmError {
        TopologyError::NoCommonAncestor {
            from: self.name_of(source).to_string(),
            to: self.name_of(target).to_string(),
        }
        .into()
    }

    fn record(
        &mut self,
        source: StateIdx,
        target: StateIdx,
        resolution: &Resolution,
        exited: Vec<S>,
        entered: Vec<S>,
    ) {
        let hierarchy = self.registry.hierarchy();
        let (Some(source), Some(target)) = (hierarchy.state(source), hierarchy.state(target))
        else {
            return;
        };
        let record = TransitionRecord {
            source: source.clone(),
            target: target.clone(),
            lca: hierarchy.state(resolution.lca).cloned(),
            kind: resolution.kind,
            exited,
            entered,
            timestamp: Utc::now(),
        };
        self.history.push_bounded(record, self.history_limit);
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::MachineBuilder;
    use crate::core::{Event, Response, Signal, State, TransitionKind};
    use crate::engine::{Dispatch, HsmError, Lifecycle, StateMachine, TopologyError};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    // TOP
    // ├── A
    // │   ├── A1
    // │   │   └── A11
    // │   └── A2
    // └── B
    //     └── B1
    //         └── B11
    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Node {
        A,
        A1,
        A11,
        A2,
        B,
        B1,
        B11,
        Top,
    }

    impl State for Node {
        fn name(&self) -> &str {
            match self {
                Self::A => "A",
                Self::A1 => "A1",
                Self::A11 => "A11",
                Self::A2 => "A2",
                Self::B => "B",
                Self::B1 => "B1",
                Self::B11 => "B11",
                Self::Top => "TOP",
            }
        }
    }

    fn by_name(name: &str) -> Node {
        match name {
            "A" => Node::A,
            "A1" => Node::A1,
            "A11" => Node::A11,
            "A2" => Node::A2,
            "B" => Node::B,
            "B1" => Node::B1,
            "B11" => Node::B11,
            _ => Node::Top,
        }
    }

    fn go(from: Node, to: Node) -> Event {
        Event::new("go").with_payload(json!({ "from": from.name(), "to": to.name() }))
    }

    // Logs entry/exit/init and takes `go` only when it names this state as
    // the source, so ancestors can pick up bubbled events.
    fn recorder(
        me: Node,
        initial: Option<Node>,
    ) -> impl Fn(&mut Vec<String>, &Event) -> Response<Node> + Send + Sync + 'static {
        move |log: &mut Vec<String>, event: &Event| {
            let name = me.name();
            match event.signal() {
                Signal::Entry => {
                    log.push(format!("enter {name}"));
                    Response::Handled
                }
                Signal::Exit => {
                    log.push(format!("exit {name}"));
                    Response::Handled
                }
                Signal::Init => match &initial {
                    Some(child) => {
                        log.push(format!("init {name}"));
                        Response::Initial(child.clone())
                    }
                    None => Response::Handled,
                },
                Signal::User(_) => {
                    let payload = event.payload().cloned().unwrap_or_default();
                    if event.is("go") && payload["from"].as_str() == Some(name) {
                        Response::Transition(by_name(payload["to"].as_str().unwrap_or_default()))
                    } else {
                        Response::Bubble
                    }
                }
                Signal::Empty => Response::Bubble,
            }
        }
    }

    fn tree(initial: Node, inits: &[(Node, Node)]) -> StateMachine<Node, Vec<String>> {
        let init_of = |state: &Node| {
            inits
                .iter()
                .find(|(parent, _)| parent == state)
                .map(|(_, child)| child.clone())
        };
        MachineBuilder::new()
            .state(Node::A, recorder(Node::A, init_of(&Node::A)))
            .substate(Node::A1, Node::A, recorder(Node::A1, init_of(&Node::A1)))
            .substate(Node::A11, Node::A1, recorder(Node::A11, None))
            .substate(Node::A2, Node::A, recorder(Node::A2, None))
            .state(Node::B, recorder(Node::B, init_of(&Node::B)))
            .substate(Node::B1, Node::B, recorder(Node::B1, init_of(&Node::B1)))
            .substate(Node::B11, Node::B1, recorder(Node::B11, None))
            .initial(initial)
            .build(Vec::new())
            .unwrap()
    }

    fn started(initial: Node) -> StateMachine<Node, Vec<String>> {
        let mut machine = tree(initial, &[]);
        machine.init(None).unwrap();
        machine.context_mut().clear();
        machine
    }

    fn step(machine: &mut StateMachine<Node, Vec<String>>, from: Node, to: Node) -> Vec<String> {
        machine.context_mut().clear();
        assert_eq!(machine.dispatch(go(from, to)), Ok(Dispatch::Transitioned));
        machine.context().clone()
    }

    fn last_kind(machine: &StateMachine<Node, Vec<String>>) -> TransitionKind {
        machine.history().records().last().unwrap().kind
    }

    #[test]
    fn documented_walkthrough() {
        let mut machine = tree(Node::A1, &[]);
        machine.init(None).unwrap();
        assert_eq!(machine.context(), &vec!["enter A", "enter A1"]);
        assert_eq!(machine.current_state(), Some(&Node::A1));

        assert_eq!(step(&mut machine, Node::A1, Node::A2), vec!["exit A1", "enter A2"]);
        assert_eq!(last_kind(&machine), TransitionKind::Sibling);
        assert_eq!(machine.current_state(), Some(&Node::A2));

        assert_eq!(step(&mut machine, Node::A2, Node::A), vec!["exit A2"]);
        assert_eq!(last_kind(&machine), TransitionKind::ChildToParent);
        assert_eq!(machine.current_state(), Some(&Node::A));

        assert_eq!(step(&mut machine, Node::A, Node::A), vec!["exit A", "enter A"]);
        assert_eq!(last_kind(&machine), TransitionKind::SelfTransition);
        assert_eq!(machine.current_state(), Some(&Node::A));
    }

    #[test]
    fn self_transition_on_leaf_touches_only_the_leaf() {
        let mut machine = started(Node::B11);

        assert_eq!(step(&mut machine, Node::B11, Node::B11), vec!["exit B11", "enter B11"]);
        let record = machine.history().records().last().unwrap();
        assert_eq!(record.lca, Some(Node::B1));
    }

    #[test]
    fn parent_to_child_enters_only_the_child() {
        let mut machine = started(Node::A);

        assert_eq!(step(&mut machine, Node::A, Node::A2), vec!["enter A2"]);
        assert_eq!(last_kind(&machine), TransitionKind::ParentToChild);
    }

    #[test]
    fn sibling_transition_leaves_parent_alone() {
        let mut machine = started(Node::A);
        step(&mut machine, Node::A, Node::B);

        assert_eq!(step(&mut machine, Node::B, Node::A), vec!["exit B", "enter A"]);
        assert_eq!(last_kind(&machine), TransitionKind::Sibling);
        assert_eq!(machine.history().records().last().unwrap().lca, None);
    }

    #[test]
    fn ancestor_to_descendant_enters_the_path() {
        let mut machine = started(Node::A);

        assert_eq!(step(&mut machine, Node::A, Node::A11), vec!["enter A1", "enter A11"]);
        assert_eq!(last_kind(&machine), TransitionKind::AncestorToDescendant);
        assert_eq!(machine.history().records().last().unwrap().lca, Some(Node::A));
    }

    #[test]
    fn source_parent_on_target_path() {
        let mut machine = started(Node::A2);

        assert_eq!(
            step(&mut machine, Node::A2, Node::A11),
            vec!["exit A2", "enter A1", "enter A11"]
        );
        assert_eq!(last_kind(&machine), TransitionKind::SourceParentOnTargetPath);
    }

    #[test]
    fn general_case_crosses_the_top() {
        let mut machine = started(Node::A11);

        assert_eq!(
            step(&mut machine, Node::A11, Node::B11),
            vec!["exit A11", "exit A1", "exit A", "enter B", "enter B1", "enter B11"]
        );
        let record = machine.history().records().last().unwrap();
        assert_eq!(record.kind, TransitionKind::General);
        assert_eq!(record.lca, None);
        assert_eq!(record.exited, vec![Node::A11, Node::A1, Node::A]);
        assert_eq!(record.entered, vec![Node::B, Node::B1, Node::B11]);
    }

    #[test]
    fn general_case_to_distant_ancestor_does_not_reenter_it() {
        let mut machine = started(Node::A11);

        assert_eq!(step(&mut machine, Node::A11, Node::A), vec!["exit A11", "exit A1"]);
        assert_eq!(last_kind(&machine), TransitionKind::General);
        assert_eq!(machine.current_state(), Some(&Node::A));
    }

    #[test]
    fn ancestor_source_exits_the_leaf_first() {
        let mut machine = started(Node::A11);

        // A11 bubbles `go` to A1, which transitions to its sibling A2.
        assert_eq!(
            step(&mut machine, Node::A1, Node::A2),
            vec!["exit A11", "exit A1", "enter A2"]
        );
        let record = machine.history().records().last().unwrap();
        assert_eq!(record.source, Node::A1);
        assert_eq!(record.kind, TransitionKind::Sibling);
        assert_eq!(record.exited, vec![Node::A11, Node::A1]);
    }

    #[test]
    fn landing_on_composite_state_descends_through_init() {
        let mut machine = tree(Node::B, &[(Node::A, Node::A1), (Node::A1, Node::A11)]);
        machine.init(None).unwrap();
        machine.context_mut().clear();

        assert_eq!(
            step(&mut machine, Node::B, Node::A),
            vec!["exit B", "enter A", "init A", "enter A1", "init A1", "enter A11"]
        );
        assert_eq!(machine.current_state(), Some(&Node::A11));
        let record = machine.history().records().last().unwrap();
        assert_eq!(record.target, Node::A);
        assert_eq!(record.landed(), &Node::A11);
    }

    #[test]
    fn top_is_not_a_valid_target() {
        let mut machine = started(Node::A);

        let error = machine.dispatch(go(Node::A, Node::Top)).unwrap_err();
        assert_eq!(
            error,
            HsmError::InvalidTransition(TopologyError::TopTarget {
                from: "A".to_string()
            })
        );
        assert_eq!(machine.lifecycle(), Lifecycle::Faulted);
        assert!(machine.context().is_empty());
    }

    #[test]
    fn entry_handler_cannot_transition() {
        let mut machine = MachineBuilder::new()
            .state(Node::A, recorder(Node::A, None))
            .state(Node::B, |_: &mut Vec<String>, event: &Event| match event.signal() {
                Signal::Entry => Response::Transition(Node::A),
                _ => Response::Handled,
            })
            .initial(Node::A)
            .build(Vec::new())
            .unwrap();
        machine.init(None).unwrap();

        let error = machine.dispatch(go(Node::A, Node::B)).unwrap_err();
        assert_eq!(
            error,
            HsmError::InvalidResponse {
                state: "B".to_string(),
                signal: "ENTRY".to_string(),
                response: "transition",
            }
        );
        assert_eq!(machine.lifecycle(), Lifecycle::Faulted);
    }

    #[test]
    fn history_records_every_transition() {
        let mut machine = started(Node::A1);
        step(&mut machine, Node::A1, Node::A2);
        step(&mut machine, Node::A2, Node::B11);

        let path: Vec<&Node> = machine.history().get_path();
        assert_eq!(path, vec![&Node::A1, &Node::A2, &Node::B11]);
    }

    #[test]
    fn history_limit_zero_disables_recording() {
        let mut machine = MachineBuilder::new()
            .state(Node::A, recorder(Node::A, None))
            .state(Node::B, recorder(Node::B, None))
            .initial(Node::A)
            .history_limit(0)
            .build(Vec::new())
            .unwrap();
        machine.init(None).unwrap();

        assert_eq!(machine.dispatch(go(Node::A, Node::B)), Ok(Dispatch::Transitioned));
        assert!(machine.history().is_empty());
    }
}
