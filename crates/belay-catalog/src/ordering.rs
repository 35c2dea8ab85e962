//! List reconstruction
//!
//! Sibling order is not stored anywhere except in the siblings themselves:
//! exactly one carries `first`, and each names its successor in `next`.
//! [`reconstruct_order`] turns an unordered sibling set back into the chain
//! and reports every way the links can be broken.

use std::collections::HashMap;

use belay_core::{HasOrder, Identified, Resource, ResourceId};
use tracing::warn;

use crate::error::{CatalogError, InvalidOrdering};

/// Order `siblings` head-to-tail by following `next` from the single `first`
///
/// Runs in O(n) using an id index. An empty set is a valid, empty chain.
pub fn reconstruct_order<T: HasOrder>(
    parent_id: &ResourceId,
    siblings: Vec<T>,
) -> Result<Vec<T>, InvalidOrdering> {
    if siblings.is_empty() {
        return Ok(siblings);
    }

    let firsts: Vec<usize> = siblings
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_first())
        .map(|(i, _)| i)
        .collect();

    let head = match firsts.as_slice() {
        [head] => *head,
        [] => {
            return Err(InvalidOrdering::NoFirst {
                parent_id: parent_id.clone(),
            });
        }
        many => {
            return Err(InvalidOrdering::MultipleFirst {
                parent_id: parent_id.clone(),
                ids: many.iter().map(|&i| siblings[i].id().clone()).collect(),
            });
        }
    };

    let index: HashMap<&ResourceId, usize> = siblings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id(), i))
        .collect();

    let mut visited = vec![false; siblings.len()];
    let mut order = Vec::with_capacity(siblings.len());
    let mut current = Some(head);

    while let Some(i) = current {
        if visited[i] {
            return Err(InvalidOrdering::Loop {
                parent_id: parent_id.clone(),
                id: siblings[i].id().clone(),
            });
        }
        visited[i] = true;
        order.push(i);

        current = match siblings[i].next() {
            None => None,
            Some(next) => match index.get(next) {
                Some(&j) => Some(j),
                None => {
                    return Err(InvalidOrdering::DanglingNext {
                        parent_id: parent_id.clone(),
                        id: siblings[i].id().clone(),
                        next: next.clone(),
                    });
                }
            },
        };
    }

    if order.len() < siblings.len() {
        let mut ids: Vec<ResourceId> = siblings
            .iter()
            .zip(&visited)
            .filter(|(_, seen)| !**seen)
            .map(|(s, _)| s.id().clone())
            .collect();
        ids.sort();
        return Err(InvalidOrdering::Orphans {
            parent_id: parent_id.clone(),
            ids,
        });
    }

    let mut slots: Vec<Option<T>> = siblings.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// A resource viewed through its chain link
///
/// Only resources whose level is orderable can be wrapped.
#[derive(Debug, Clone)]
pub struct Linked(Resource);

impl Linked {
    pub fn new(resource: Resource) -> Option<Self> {
        resource.link().is_some().then_some(Self(resource))
    }

    pub fn into_inner(self) -> Resource {
        self.0
    }
}

impl Identified for Linked {
    fn id(&self) -> &ResourceId {
        self.0.id()
    }
}

impl HasOrder for Linked {
    fn is_first(&self) -> bool {
        self.0.link().is_some_and(|l| l.first)
    }

    fn next(&self) -> Option<&ResourceId> {
        self.0.link().and_then(|l| l.next.as_ref())
    }
}

/// Order a fetched sibling set of any orderable level
///
/// Resources of a non-orderable level are a contract violation and are
/// reported as a model error for that level.
pub fn order_resources(
    parent_id: &ResourceId,
    resources: Vec<Resource>,
) -> Result<Vec<Resource>, CatalogError> {
    let mut linked = Vec::with_capacity(resources.len());
    for resource in resources {
        let kind = resource.kind();
        match Linked::new(resource) {
            Some(l) => linked.push(l),
            None => return Err(belay_core::ModelError::MissingLink { kind }.into()),
        }
    }

    let ordered = reconstruct_order(parent_id, linked).inspect_err(|e| {
        warn!(parent = %parent_id, error = %e, "Sibling chain is inconsistent");
    })?;
    Ok(ordered.into_iter().map(Linked::into_inner).collect())
}
