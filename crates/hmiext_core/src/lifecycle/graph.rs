use super::{plan_transition, ApplicationState, TransitionEvent, ALL_STATES};

/// Lifecycle transition graph derived from the core transition table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionGraph {
    pub states: Vec<ApplicationState>,
    pub edges: Vec<TransitionEdge>,
}

/// Directed primary edge with the callbacks it fires in a session that has not launched yet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionEdge {
    pub from: ApplicationState,
    pub to: ApplicationState,
    pub events: Vec<TransitionEvent>,
}

impl TransitionGraph {
    pub fn edge(&self, from: ApplicationState, to: ApplicationState) -> Option<&TransitionEdge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }
}

/// Build the canonical lifecycle transition graph (every ordered pair of distinct states).
pub fn transition_graph() -> TransitionGraph {
    let mut edges = Vec::new();

    for from in ALL_STATES {
        for to in ALL_STATES {
            if from == to {
                continue;
            }
            edges.push(TransitionEdge {
                from,
                to,
                events: plan_transition(from, to, false),
            });
        }
    }

    TransitionGraph {
        states: ALL_STATES.to_vec(),
        edges,
    }
}
